use crate::accountant::RewardAccountant;
use crate::error::ErrorCode;
use crate::states::*;
use crate::utils::{current_timestamp, transfer_from_user_to_pool_vault};
use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

/// Accounts context for funding a new reward period.
///
/// Only the pool admin may call this. The reward tokens are moved from the
/// admin's token account into the reward vault in the same instruction.
#[derive(Accounts)]
pub struct NotifyRewardAmount<'info> {
    #[account(
        constraint = pool.is_admin(&owner.key()) @ ErrorCode::Unauthorized
    )]
    pub owner: Signer<'info>,

    #[account(
        mut,
        seeds = [POOL_SEED.as_bytes(), pool.stake_mint.as_ref()],
        bump = pool.bump,
    )]
    pub pool: Box<Account<'info, Pool>>,

    #[account(mut, address = pool.reward_vault @ ErrorCode::InvalidVault)]
    pub reward_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(address = pool.reward_mint @ ErrorCode::InvalidMint)]
    pub reward_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(
        mut,
        token::mint = reward_mint,
        token::authority = owner,
        token::token_program = token_program,
    )]
    pub owner_reward_token: Box<InterfaceAccount<'info, TokenAccount>>,

    pub token_program: Interface<'info, TokenInterface>,
}

/// Deposits `amount` reward tokens and starts a new period.
///
/// An unfinished period rolls its unemitted rewards into the new rate. The
/// rate is bounded by the reward vault balance after the deposit.
pub fn notify_reward_amount(ctx: Context<NotifyRewardAmount>, amount: u64) -> Result<()> {
    let now = current_timestamp()?;

    let vault_before = ctx.accounts.reward_vault.amount;
    transfer_from_user_to_pool_vault(
        ctx.accounts.owner.to_account_info(),
        ctx.accounts.owner_reward_token.to_account_info(),
        ctx.accounts.reward_vault.to_account_info(),
        ctx.accounts.reward_mint.to_account_info(),
        ctx.accounts.token_program.to_account_info(),
        amount,
        ctx.accounts.reward_mint.decimals,
    )?;
    ctx.accounts.reward_vault.reload()?;
    let reserve = ctx.accounts.reward_vault.amount;
    let received = reserve
        .checked_sub(vault_before)
        .ok_or(ErrorCode::MathOverflow)?;

    let pool_key = ctx.accounts.pool.key();
    let pool = &mut ctx.accounts.pool;
    RewardAccountant::new(pool, now).notify_reward_amount(received, reserve)?;
    msg!(
        "reward added: {}, rate {}, period ends at {}",
        received,
        pool.reward_rate,
        pool.period_finish
    );

    emit!(RewardAdded {
        pool: pool_key,
        reward: received,
        reward_rate: pool.reward_rate,
        period_finish: pool.period_finish,
        timestamp: now,
    });
    Ok(())
}
