use crate::error::ErrorCode;
use crate::utils::current_timestamp;
use crate::{states::*, DEFAULT_REWARDS_DURATION, REWARD_VAULT_SEED, STAKE_VAULT_SEED};
use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};
use std::ops::DerefMut;

/// Accounts context for `initialize_pool`.
///
/// Creates the pool account for `stake_mint` together with its two
/// program-owned vaults. Both vaults are owned by the per-pool authority PDA.
#[derive(Accounts)]
pub struct InitializePool<'info> {
    /// Pays for the new accounts. Does not need to be the pool admin.
    #[account(mut)]
    pub owner: Signer<'info>,

    #[account(
        init,
        seeds = [POOL_SEED.as_bytes(), stake_mint.key().as_ref()],
        bump,
        payer = owner,
        space = Pool::LEN
    )]
    pub pool: Box<Account<'info, Pool>>,

    /// Vault authority PDA.
    ///
    /// CHECK: PDA derivation enforced via seeds. Not read as an account; used as Pubkey.
    #[account(
        seeds = [crate::AUTH_SEED.as_bytes(), pool.key().as_ref()],
        bump,
    )]
    pub authority: UncheckedAccount<'info>,

    #[account(mint::token_program = token_program)]
    pub stake_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(mint::token_program = token_program)]
    pub reward_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(
        init,
        seeds = [STAKE_VAULT_SEED.as_bytes(), pool.key().as_ref()],
        bump,
        payer = owner,
        token::mint = stake_mint,
        token::authority = authority,
        token::token_program = token_program,
    )]
    pub stake_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(
        init,
        seeds = [REWARD_VAULT_SEED.as_bytes(), pool.key().as_ref()],
        bump,
        payer = owner,
        token::mint = reward_mint,
        token::authority = authority,
        token::token_program = token_program,
    )]
    pub reward_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    pub token_program: Interface<'info, TokenInterface>,

    pub system_program: Program<'info, System>,
}

/// Initializes a pool. A `rewards_duration` of zero selects the default of
/// seven days.
pub fn initialize_pool(
    ctx: Context<InitializePool>,
    admin: Pubkey,
    rewards_duration: u64,
) -> Result<()> {
    require_keys_neq!(admin, Pubkey::default(), ErrorCode::Unauthorized);
    let rewards_duration = if rewards_duration == 0 {
        DEFAULT_REWARDS_DURATION
    } else {
        rewards_duration
    };
    let now = current_timestamp()?;

    let pool_key = ctx.accounts.pool.key();
    let pool = ctx.accounts.pool.deref_mut();
    pool.bump = ctx.bumps.pool;
    pool.authority_bump = ctx.bumps.authority;
    pool.admin = admin;
    pool.stake_mint = ctx.accounts.stake_mint.key();
    pool.reward_mint = ctx.accounts.reward_mint.key();
    pool.stake_vault = ctx.accounts.stake_vault.key();
    pool.reward_vault = ctx.accounts.reward_vault.key();
    pool.rewards_duration = rewards_duration;
    pool.last_update_time = now;
    msg!("Pool initialized");

    emit!(PoolInitialized {
        pool: pool_key,
        admin,
        stake_mint: pool.stake_mint,
        reward_mint: pool.reward_mint,
        rewards_duration,
        timestamp: now,
    });
    Ok(())
}
