use crate::accountant::RewardAccountant;
use crate::error::ErrorCode;
use crate::states::*;
use crate::utils::{current_timestamp, transfer_from_user_to_pool_vault};
use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

/// Accounts required to stake tokens into a pool.
///
/// The staker's `StakerAccount` is created on first stake.
#[derive(Accounts)]
pub struct Stake<'info> {
    /// Staker; pays for the staker account if it does not exist yet.
    #[account(mut)]
    pub owner: Signer<'info>,

    #[account(
        mut,
        seeds = [POOL_SEED.as_bytes(), pool.stake_mint.as_ref()],
        bump = pool.bump,
    )]
    pub pool: Box<Account<'info, Pool>>,

    #[account(
        init_if_needed,
        seeds = [
            STAKER_ACCOUNT_SEED.as_bytes(),
            pool.key().as_ref(),
            owner.key().as_ref()
        ],
        bump,
        payer = owner,
        space = StakerAccount::LEN
    )]
    pub staker_account: Box<Account<'info, StakerAccount>>,

    #[account(mut, address = pool.stake_vault @ ErrorCode::InvalidVault)]
    pub stake_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(address = pool.stake_mint @ ErrorCode::InvalidMint)]
    pub stake_mint: Box<InterfaceAccount<'info, Mint>>,

    /// Source of the staked tokens.
    #[account(
        mut,
        token::mint = stake_mint,
        token::authority = owner,
        token::token_program = token_program,
    )]
    pub owner_stake_token: Box<InterfaceAccount<'info, TokenAccount>>,

    pub token_program: Interface<'info, TokenInterface>,

    pub system_program: Program<'info, System>,
}

/// Stakes `amount` tokens.
///
/// The amount credited is what the vault actually received, so mints with a
/// transfer fee credit the post-fee amount.
pub fn stake(ctx: Context<Stake>, amount: u64) -> Result<()> {
    require!(amount > 0, ErrorCode::InvalidAmount);
    let now = current_timestamp()?;

    // --- Move tokens into the vault and measure what arrived ---
    let vault_before = ctx.accounts.stake_vault.amount;
    transfer_from_user_to_pool_vault(
        ctx.accounts.owner.to_account_info(),
        ctx.accounts.owner_stake_token.to_account_info(),
        ctx.accounts.stake_vault.to_account_info(),
        ctx.accounts.stake_mint.to_account_info(),
        ctx.accounts.token_program.to_account_info(),
        amount,
        ctx.accounts.stake_mint.decimals,
    )?;
    ctx.accounts.stake_vault.reload()?;
    let received = ctx
        .accounts
        .stake_vault
        .amount
        .checked_sub(vault_before)
        .ok_or(ErrorCode::MathOverflow)?;

    // --- Lazy init of the staker record ---
    let pool_key = ctx.accounts.pool.key();
    let pool = &mut ctx.accounts.pool;
    let staker_account = &mut ctx.accounts.staker_account;
    if staker_account.owner == Pubkey::default() {
        staker_account.bump = ctx.bumps.staker_account;
        staker_account.pool = pool_key;
        staker_account.owner = ctx.accounts.owner.key();
        pool.staker_count = pool
            .staker_count
            .checked_add(1)
            .ok_or(ErrorCode::MathOverflow)?;
    }

    RewardAccountant::new(pool, now).stake(staker_account, received)?;

    #[cfg(feature = "enable-log")]
    msg!(
        "staked {} (total_staked {}, reward_per_token {})",
        received,
        pool.total_staked,
        pool.reward_per_token_stored
    );

    emit!(Staked {
        pool: pool_key,
        user: ctx.accounts.owner.key(),
        amount: received,
        timestamp: now,
    });
    Ok(())
}
