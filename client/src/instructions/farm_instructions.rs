use anchor_client::{Client, Cluster, Program};
use anchor_lang::prelude::AccountMeta;
use anyhow::Result;
use solana_sdk::{
    instruction::Instruction, pubkey::Pubkey, signature::Keypair, system_program,
};
use std::rc::Rc;

use token_farm::accounts as farm_accounts;
use token_farm::instruction as farm_instructions;
use token_farm::states::Pool;

use crate::instructions::utils::{
    get_authority_address, get_pool_address, get_reward_vault_address,
    get_staker_account_address, get_stake_vault_address, get_user_token_address,
};

use super::super::{read_keypair_file, ClientConfig};

/// Addresses every pool-scoped instruction needs.
#[derive(Clone, Debug)]
pub struct PoolKeys {
    pub pool: Pubkey,
    pub authority: Pubkey,
    pub stake_mint: Pubkey,
    pub reward_mint: Pubkey,
    pub stake_vault: Pubkey,
    pub reward_vault: Pubkey,
    pub token_program: Pubkey,
}

impl PoolKeys {
    pub fn new(program_id: &Pubkey, pool: &Pool, token_program: Pubkey) -> Self {
        let pool_address = get_pool_address(program_id, &pool.stake_mint);
        PoolKeys {
            pool: pool_address,
            authority: get_authority_address(program_id, &pool_address),
            stake_mint: pool.stake_mint,
            reward_mint: pool.reward_mint,
            stake_vault: pool.stake_vault,
            reward_vault: pool.reward_vault,
            token_program,
        }
    }
}

fn farm_program(config: &ClientConfig) -> Result<Program<Rc<Keypair>>> {
    let payer = read_keypair_file(&config.payer_path)?;
    let url = Cluster::Custom(config.http_url.clone(), config.ws_url.clone());
    // Client.
    let client = Client::new(url, Rc::new(payer));
    Ok(client.program(config.token_farm_program)?)
}

pub fn initialize_pool_instr(
    config: &ClientConfig,
    stake_mint: Pubkey,
    reward_mint: Pubkey,
    token_program: Pubkey,
    admin: Pubkey,
    rewards_duration: u64,
) -> Result<Vec<Instruction>> {
    let program = farm_program(config)?;
    let pool = get_pool_address(&program.id(), &stake_mint);

    let instructions = program
        .request()
        .accounts(farm_accounts::InitializePool {
            owner: program.payer(),
            pool,
            authority: get_authority_address(&program.id(), &pool),
            stake_mint,
            reward_mint,
            stake_vault: get_stake_vault_address(&program.id(), &pool),
            reward_vault: get_reward_vault_address(&program.id(), &pool),
            token_program,
            system_program: system_program::id(),
        })
        .args(farm_instructions::InitializePool {
            admin,
            rewards_duration,
        })
        .instructions()?;
    Ok(instructions)
}

pub fn stake_instr(
    config: &ClientConfig,
    keys: &PoolKeys,
    owner: Pubkey,
    amount: u64,
) -> Result<Vec<Instruction>> {
    let program = farm_program(config)?;

    let instructions = program
        .request()
        .accounts(farm_accounts::Stake {
            owner,
            pool: keys.pool,
            staker_account: get_staker_account_address(&program.id(), &keys.pool, &owner),
            stake_vault: keys.stake_vault,
            stake_mint: keys.stake_mint,
            owner_stake_token: get_user_token_address(
                &owner,
                &keys.stake_mint,
                &keys.token_program,
            ),
            token_program: keys.token_program,
            system_program: system_program::id(),
        })
        .args(farm_instructions::Stake { amount })
        .instructions()?;
    Ok(instructions)
}

pub fn withdraw_instr(
    config: &ClientConfig,
    keys: &PoolKeys,
    owner: Pubkey,
    amount: u64,
) -> Result<Vec<Instruction>> {
    let program = farm_program(config)?;

    let instructions = program
        .request()
        .accounts(farm_accounts::Withdraw {
            owner,
            pool: keys.pool,
            staker_account: get_staker_account_address(&program.id(), &keys.pool, &owner),
            authority: keys.authority,
            stake_vault: keys.stake_vault,
            stake_mint: keys.stake_mint,
            owner_stake_token: get_user_token_address(
                &owner,
                &keys.stake_mint,
                &keys.token_program,
            ),
            token_program: keys.token_program,
        })
        .args(farm_instructions::Withdraw { amount })
        .instructions()?;
    Ok(instructions)
}

pub fn notify_reward_amount_instr(
    config: &ClientConfig,
    keys: &PoolKeys,
    admin: Pubkey,
    amount: u64,
) -> Result<Vec<Instruction>> {
    let program = farm_program(config)?;

    let instructions = program
        .request()
        .accounts(farm_accounts::NotifyRewardAmount {
            owner: admin,
            pool: keys.pool,
            reward_vault: keys.reward_vault,
            reward_mint: keys.reward_mint,
            owner_reward_token: get_user_token_address(
                &admin,
                &keys.reward_mint,
                &keys.token_program,
            ),
            token_program: keys.token_program,
        })
        .args(farm_instructions::NotifyRewardAmount { amount })
        .instructions()?;
    Ok(instructions)
}

pub fn get_reward_instr(
    config: &ClientConfig,
    keys: &PoolKeys,
    owner: Pubkey,
) -> Result<Vec<Instruction>> {
    let program = farm_program(config)?;

    let instructions = program
        .request()
        .accounts(farm_accounts::GetReward {
            owner,
            pool: keys.pool,
            staker_account: get_staker_account_address(&program.id(), &keys.pool, &owner),
            authority: keys.authority,
            reward_vault: keys.reward_vault,
            reward_mint: keys.reward_mint,
            owner_reward_token: get_user_token_address(
                &owner,
                &keys.reward_mint,
                &keys.token_program,
            ),
            token_program: keys.token_program,
            associated_token_program: spl_associated_token_account::id(),
            system_program: system_program::id(),
        })
        .args(farm_instructions::GetReward {})
        .instructions()?;
    Ok(instructions)
}

pub fn exit_instr(config: &ClientConfig, keys: &PoolKeys, owner: Pubkey) -> Result<Vec<Instruction>> {
    let program = farm_program(config)?;

    let instructions = program
        .request()
        .accounts(farm_accounts::Exit {
            owner,
            pool: keys.pool,
            staker_account: get_staker_account_address(&program.id(), &keys.pool, &owner),
            authority: keys.authority,
            stake_vault: keys.stake_vault,
            reward_vault: keys.reward_vault,
            stake_mint: keys.stake_mint,
            reward_mint: keys.reward_mint,
            owner_stake_token: get_user_token_address(
                &owner,
                &keys.stake_mint,
                &keys.token_program,
            ),
            owner_reward_token: get_user_token_address(
                &owner,
                &keys.reward_mint,
                &keys.token_program,
            ),
            token_program: keys.token_program,
            associated_token_program: spl_associated_token_account::id(),
            system_program: system_program::id(),
        })
        .args(farm_instructions::Exit {})
        .instructions()?;
    Ok(instructions)
}

pub fn update_config_instr(
    config: &ClientConfig,
    keys: &PoolKeys,
    admin: Pubkey,
    param: u8,
    value: u64,
    new_admin: Option<Pubkey>,
) -> Result<Vec<Instruction>> {
    let program = farm_program(config)?;

    let mut ixs = program
        .request()
        .accounts(farm_accounts::UpdateConfig {
            owner: admin,
            pool: keys.pool,
        })
        .args(farm_instructions::UpdateConfig { param, value })
        .instructions()?;

    if let (Some(new_admin), Some(ix)) = (new_admin, ixs.first_mut()) {
        ix.accounts.push(AccountMeta::new_readonly(new_admin, false));
    }
    Ok(ixs)
}

pub fn recover_instr(
    config: &ClientConfig,
    keys: &PoolKeys,
    admin: Pubkey,
    source: Pubkey,
    mint: Pubkey,
    amount: u64,
) -> Result<Vec<Instruction>> {
    let program = farm_program(config)?;

    let instructions = program
        .request()
        .accounts(farm_accounts::Recover {
            owner: admin,
            pool: keys.pool,
            authority: keys.authority,
            source,
            mint,
            destination: get_user_token_address(&admin, &mint, &keys.token_program),
            token_program: keys.token_program,
        })
        .args(farm_instructions::Recover { amount })
        .instructions()?;
    Ok(instructions)
}
