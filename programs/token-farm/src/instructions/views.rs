use crate::accountant::RewardAccountant;
use crate::states::*;
use crate::utils::current_timestamp;
use anchor_lang::prelude::*;

#[derive(Accounts)]
pub struct Earned<'info> {
    #[account(
        seeds = [POOL_SEED.as_bytes(), pool.stake_mint.as_ref()],
        bump = pool.bump,
    )]
    pub pool: Box<Account<'info, Pool>>,

    /// CHECK: only used as a seed of the staker account.
    pub user: UncheckedAccount<'info>,

    #[account(
        seeds = [
            STAKER_ACCOUNT_SEED.as_bytes(),
            pool.key().as_ref(),
            user.key().as_ref()
        ],
        bump = staker_account.bump,
    )]
    pub staker_account: Box<Account<'info, StakerAccount>>,
}

/// Pool-only accounts shared by the pool-level views.
#[derive(Accounts)]
pub struct PoolView<'info> {
    #[account(
        seeds = [POOL_SEED.as_bytes(), pool.stake_mint.as_ref()],
        bump = pool.bump,
    )]
    pub pool: Box<Account<'info, Pool>>,
}

/// Rewards `user` could claim right now. Read-only; nothing is written back.
pub fn earned(ctx: Context<Earned>) -> Result<u64> {
    let now = current_timestamp()?;
    let mut pool = Pool::clone(&ctx.accounts.pool);
    RewardAccountant::new(&mut pool, now).earned(&ctx.accounts.staker_account)
}

/// Rewards one full period emits at the current rate.
pub fn reward_for_duration(ctx: Context<PoolView>) -> Result<u64> {
    let mut pool = Pool::clone(&ctx.accounts.pool);
    RewardAccountant::new(&mut pool, 0).reward_for_duration()
}

pub fn reward_per_token(ctx: Context<PoolView>) -> Result<u128> {
    let now = current_timestamp()?;
    let mut pool = Pool::clone(&ctx.accounts.pool);
    RewardAccountant::new(&mut pool, now).reward_per_token()
}

pub fn last_time_reward_applicable(ctx: Context<PoolView>) -> Result<u64> {
    let now = current_timestamp()?;
    let mut pool = Pool::clone(&ctx.accounts.pool);
    Ok(RewardAccountant::new(&mut pool, now).last_time_reward_applicable())
}
