#![allow(dead_code)]
use anyhow::{format_err, Context, Result};
use clap::Parser;
use configparser::ini::Ini;
use solana_client::rpc_client::RpcClient;
use solana_sdk::{
    instruction::Instruction,
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
    transaction::Transaction,
};
use spl_token::solana_program::program_pack::Pack;
use std::collections::BTreeSet;
use std::str::FromStr;

use token_farm::accountant::RewardAccountant;
use token_farm::states::{Pool, StakerAccount};

mod indexer;
mod instructions;
use indexer::entities::to_hex;
use indexer::{parse_logs, EntityStore, Indexer, JsonFileStore, PoolEntity};
use instructions::farm_instructions::*;
use instructions::rpc::*;
use instructions::utils::*;

#[derive(Clone, Debug, PartialEq)]
pub struct ClientConfig {
    http_url: String,
    ws_url: String,
    payer_path: String,
    admin_path: String,
    token_farm_program: Pubkey,
    store_path: String,
}

fn required(config: &Ini, key: &str) -> Result<String> {
    match config.get("Global", key) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(format_err!("{} must not be empty", key)),
    }
}

fn load_cfg(client_config: &str) -> Result<ClientConfig> {
    let mut config = Ini::new();
    config
        .load(client_config)
        .map_err(|e| format_err!("failed to load {}: {}", client_config, e))?;

    let token_farm_program = required(&config, "token_farm_program")?;
    let token_farm_program = Pubkey::from_str(&token_farm_program)
        .with_context(|| format!("invalid token_farm_program {}", token_farm_program))?;

    Ok(ClientConfig {
        http_url: required(&config, "http_url")?,
        ws_url: required(&config, "ws_url")?,
        payer_path: required(&config, "payer_path")?,
        admin_path: required(&config, "admin_path")?,
        token_farm_program,
        store_path: config
            .get("Global", "store_path")
            .filter(|path| !path.is_empty())
            .unwrap_or_else(|| "farm_index.json".to_string()),
    })
}

fn read_keypair_file(s: &str) -> Result<Keypair> {
    solana_sdk::signature::read_keypair_file(s)
        .map_err(|_| format_err!("failed to read keypair from {}", s))
}

#[derive(Debug, Parser)]
pub struct Opts {
    #[arg(long, default_value = "client_config.ini")]
    pub config: String,
    #[clap(subcommand)]
    pub command: TokenFarmCommands,
}

#[derive(Debug, Parser)]
pub enum TokenFarmCommands {
    InitializePool {
        #[arg(long)]
        stake_mint: Pubkey,
        #[arg(long)]
        reward_mint: Pubkey,
        /// Defaults to the admin keypair.
        #[arg(long)]
        admin: Option<Pubkey>,
        /// Seconds; 0 selects seven days.
        #[arg(long, default_value_t = 0)]
        rewards_duration: u64,
    },
    Stake {
        #[arg(long)]
        stake_mint: Pubkey,
        #[arg(long)]
        amount: u64,
    },
    Withdraw {
        #[arg(long)]
        stake_mint: Pubkey,
        #[arg(long)]
        amount: u64,
    },
    NotifyRewardAmount {
        #[arg(long)]
        stake_mint: Pubkey,
        #[arg(long)]
        amount: u64,
    },
    GetReward {
        #[arg(long)]
        stake_mint: Pubkey,
    },
    Exit {
        #[arg(long)]
        stake_mint: Pubkey,
    },
    /// param 0: transfer admin to --new-admin; param 1: rewards duration.
    UpdateConfig {
        #[arg(long)]
        stake_mint: Pubkey,
        #[arg(long)]
        param: u8,
        #[arg(long, default_value_t = 0)]
        value: u64,
        #[arg(long)]
        new_admin: Option<Pubkey>,
    },
    Recover {
        #[arg(long)]
        stake_mint: Pubkey,
        /// Program-owned token account to drain.
        #[arg(long)]
        source: Pubkey,
        #[arg(long)]
        amount: u64,
    },
    Earned {
        #[arg(long)]
        stake_mint: Pubkey,
        /// Defaults to the payer.
        #[arg(long)]
        user: Option<Pubkey>,
    },
    ShowPool {
        #[arg(long)]
        stake_mint: Pubkey,
    },
    /// Mirrors program events into the entity store at `store_path`.
    Index {},
}

fn load_pool(rpc_client: &RpcClient, program_id: &Pubkey, stake_mint: &Pubkey) -> Result<(PoolKeys, Pool)> {
    let pool_address = get_pool_address(program_id, stake_mint);
    let account = get_account(rpc_client, &pool_address)?
        .ok_or_else(|| format_err!("pool {} not found", pool_address))?;
    let pool: Pool = deserialize_anchor_account(&account)?;
    let mint_account = get_account(rpc_client, stake_mint)?
        .ok_or_else(|| format_err!("mint {} not found", stake_mint))?;
    let keys = PoolKeys::new(program_id, &pool, mint_account.owner);
    Ok((keys, pool))
}

fn send(rpc_client: &RpcClient, instructions: &[Instruction], signers: &[&Keypair]) -> Result<()> {
    let payer = signers
        .first()
        .ok_or_else(|| format_err!("no signer"))?;
    let mut unique: Vec<&Keypair> = Vec::new();
    for signer in signers {
        if !unique.iter().any(|k| k.pubkey() == signer.pubkey()) {
            unique.push(*signer);
        }
    }
    let recent_hash = rpc_client.get_latest_blockhash()?;
    let txn = Transaction::new_signed_with_payer(
        instructions,
        Some(&payer.pubkey()),
        &unique,
        recent_hash,
    );
    let signature = send_txn(rpc_client, &txn, true)?;
    println!("{}", signature);
    Ok(())
}

fn main() -> Result<()> {
    let opts = Opts::parse();
    let config = load_cfg(&opts.config)?;
    let payer = read_keypair_file(&config.payer_path)?;
    let admin = read_keypair_file(&config.admin_path)?;
    let program_id = config.token_farm_program;
    // solana rpc client
    let rpc_client = RpcClient::new(config.http_url.to_string());

    match opts.command {
        TokenFarmCommands::InitializePool {
            stake_mint,
            reward_mint,
            admin: pool_admin,
            rewards_duration,
        } => {
            let mint_account = get_account(&rpc_client, &stake_mint)?
                .ok_or_else(|| format_err!("mint {} not found", stake_mint))?;
            let ixs = initialize_pool_instr(
                &config,
                stake_mint,
                reward_mint,
                mint_account.owner,
                pool_admin.unwrap_or_else(|| admin.pubkey()),
                rewards_duration,
            )?;
            send(&rpc_client, &ixs, &[&payer])?;
            println!("pool {}", get_pool_address(&program_id, &stake_mint));
        }
        TokenFarmCommands::Stake { stake_mint, amount } => {
            let (keys, _) = load_pool(&rpc_client, &program_id, &stake_mint)?;
            let ixs = stake_instr(&config, &keys, payer.pubkey(), amount)?;
            send(&rpc_client, &ixs, &[&payer])?;
        }
        TokenFarmCommands::Withdraw { stake_mint, amount } => {
            let (keys, _) = load_pool(&rpc_client, &program_id, &stake_mint)?;
            let ixs = withdraw_instr(&config, &keys, payer.pubkey(), amount)?;
            send(&rpc_client, &ixs, &[&payer])?;
        }
        TokenFarmCommands::NotifyRewardAmount { stake_mint, amount } => {
            let (keys, _) = load_pool(&rpc_client, &program_id, &stake_mint)?;
            let ixs = notify_reward_amount_instr(&config, &keys, admin.pubkey(), amount)?;
            send(&rpc_client, &ixs, &[&payer, &admin])?;
        }
        TokenFarmCommands::GetReward { stake_mint } => {
            let (keys, _) = load_pool(&rpc_client, &program_id, &stake_mint)?;
            let ixs = get_reward_instr(&config, &keys, payer.pubkey())?;
            send(&rpc_client, &ixs, &[&payer])?;
        }
        TokenFarmCommands::Exit { stake_mint } => {
            let (keys, _) = load_pool(&rpc_client, &program_id, &stake_mint)?;
            let ixs = exit_instr(&config, &keys, payer.pubkey())?;
            send(&rpc_client, &ixs, &[&payer])?;
        }
        TokenFarmCommands::UpdateConfig {
            stake_mint,
            param,
            value,
            new_admin,
        } => {
            let (keys, _) = load_pool(&rpc_client, &program_id, &stake_mint)?;
            let ixs =
                update_config_instr(&config, &keys, admin.pubkey(), param, value, new_admin)?;
            send(&rpc_client, &ixs, &[&payer, &admin])?;
        }
        TokenFarmCommands::Recover {
            stake_mint,
            source,
            amount,
        } => {
            let (keys, _) = load_pool(&rpc_client, &program_id, &stake_mint)?;
            let source_account = get_account(&rpc_client, &source)?
                .ok_or_else(|| format_err!("token account {} not found", source))?;
            let source_state = spl_token::state::Account::unpack_from_slice(
                source_account
                    .data
                    .get(..spl_token::state::Account::LEN)
                    .ok_or_else(|| format_err!("{} is not a token account", source))?,
            )?;
            let ixs = recover_instr(
                &config,
                &keys,
                admin.pubkey(),
                source,
                source_state.mint,
                amount,
            )?;
            send(&rpc_client, &ixs, &[&payer, &admin])?;
        }
        TokenFarmCommands::Earned { stake_mint, user } => {
            let (keys, mut pool) = load_pool(&rpc_client, &program_id, &stake_mint)?;
            let user = user.unwrap_or_else(|| payer.pubkey());
            let staker_address = get_staker_account_address(&program_id, &keys.pool, &user);
            let staker: StakerAccount = match get_account(&rpc_client, &staker_address)? {
                Some(account) => deserialize_anchor_account(&account)?,
                None => StakerAccount::default(),
            };
            let now = get_cluster_time(&rpc_client)?;
            let earned = RewardAccountant::new(&mut pool, now)
                .earned(&staker)
                .map_err(|e| format_err!("{:?}", e))?;
            println!("staked: {}", staker.staked_amount);
            println!("earned: {}", earned);
        }
        TokenFarmCommands::ShowPool { stake_mint } => {
            let (keys, mut pool) = load_pool(&rpc_client, &program_id, &stake_mint)?;
            let now = get_cluster_time(&rpc_client)?;
            println!("pool: {}", keys.pool);
            println!("{:#?}", pool);
            let accountant = RewardAccountant::new(&mut pool, now);
            println!(
                "last_time_reward_applicable: {}",
                accountant.last_time_reward_applicable()
            );
            println!(
                "reward_per_token: {}",
                accountant
                    .reward_per_token()
                    .map_err(|e| format_err!("{:?}", e))?
            );
            println!(
                "reward_for_duration: {}",
                accountant
                    .reward_for_duration()
                    .map_err(|e| format_err!("{:?}", e))?
            );
        }
        TokenFarmCommands::Index {} => {
            let mut indexer = Indexer::new(JsonFileStore::open(&config.store_path)?);
            let until = indexer
                .cursor()?
                .map(|cursor| {
                    Signature::from_str(&cursor)
                        .with_context(|| format!("invalid cursor {} in {}", cursor, config.store_path))
                })
                .transpose()?;
            let signatures = get_signatures_for_address(&rpc_client, &program_id, until)?;
            let mut pools = BTreeSet::new();
            for signature in signatures {
                let logs = get_transaction_logs(&rpc_client, &signature)?.unwrap_or_default();
                let events = parse_logs(&program_id, &logs);
                let applied = indexer.handle_transaction(&signature.to_string(), &events)?;
                if applied > 0 {
                    println!("{}: {} event(s)", signature, applied);
                    pools.extend(events.iter().map(|event| event.pool()));
                }
            }
            for pool in pools {
                if let Some(entity) = indexer.store().load::<PoolEntity>(&to_hex(&pool))? {
                    println!(
                        "pool {}: staked {}, reward balance {}, stakers {}",
                        pool,
                        entity.total_staked,
                        entity.reward_balance(),
                        entity.staker_count
                    );
                }
            }
        }
    }
    Ok(())
}
