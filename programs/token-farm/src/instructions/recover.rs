use crate::error::ErrorCode;
use crate::states::*;
use crate::utils::transfer_from_pool_vault_to_user;
use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

/// Accounts for moving stray tokens out of a program-owned account.
#[derive(Accounts)]
pub struct Recover<'info> {
    #[account(
        constraint = pool.is_admin(&owner.key()) @ ErrorCode::Unauthorized
    )]
    pub owner: Signer<'info>,

    #[account(
        seeds = [POOL_SEED.as_bytes(), pool.stake_mint.as_ref()],
        bump = pool.bump,
    )]
    pub pool: Box<Account<'info, Pool>>,

    /// Vault authority PDA.
    ///
    /// CHECK: PDA derivation enforced by seeds; used only as a signer.
    #[account(
        seeds = [crate::AUTH_SEED.as_bytes(), pool.key().as_ref()],
        bump = pool.authority_bump,
    )]
    pub authority: UncheckedAccount<'info>,

    /// Any token account owned by the authority except the stake vault.
    #[account(
        mut,
        constraint = source.key() != pool.stake_vault @ ErrorCode::CannotRecoverStakingToken,
        token::authority = authority,
        token::token_program = token_program,
    )]
    pub source: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(address = source.mint @ ErrorCode::InvalidMint)]
    pub mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(
        mut,
        token::mint = mint,
        token::token_program = token_program,
    )]
    pub destination: Box<InterfaceAccount<'info, TokenAccount>>,

    pub token_program: Interface<'info, TokenInterface>,
}

/// Transfers `amount` from `source` to `destination`.
///
/// From the reward vault only the surplus over outstanding rewards
/// (`total_rewards_notified - total_rewards_paid`) can be recovered.
pub fn recover(ctx: Context<Recover>, amount: u64) -> Result<()> {
    require!(amount > 0, ErrorCode::InvalidAmount);
    let pool = &ctx.accounts.pool;
    let source = &ctx.accounts.source;

    let available = if source.key() == pool.reward_vault {
        let outstanding = pool
            .total_rewards_notified
            .checked_sub(pool.total_rewards_paid)
            .ok_or(ErrorCode::MathOverflow)?;
        source.amount.saturating_sub(outstanding)
    } else {
        source.amount
    };
    require!(amount <= available, ErrorCode::InsufficientBalance);

    let pool_key = pool.key();
    transfer_from_pool_vault_to_user(
        ctx.accounts.authority.to_account_info(),
        ctx.accounts.source.to_account_info(),
        ctx.accounts.destination.to_account_info(),
        ctx.accounts.mint.to_account_info(),
        ctx.accounts.token_program.to_account_info(),
        amount,
        ctx.accounts.mint.decimals,
        &[&[
            crate::AUTH_SEED.as_bytes(),
            pool_key.as_ref(),
            &[pool.authority_bump],
        ]],
    )?;

    emit!(Recovered {
        pool: pool_key,
        token: ctx.accounts.mint.key(),
        amount,
    });
    Ok(())
}
