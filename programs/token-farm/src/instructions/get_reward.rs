use crate::accountant::RewardAccountant;
use crate::error::ErrorCode;
use crate::states::*;
use crate::utils::{current_timestamp, transfer_from_pool_vault_to_user};
use anchor_lang::prelude::*;
use anchor_spl::associated_token::AssociatedToken;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

#[derive(Accounts)]
pub struct GetReward<'info> {
    #[account(mut)]
    pub owner: Signer<'info>,

    #[account(
        mut,
        seeds = [POOL_SEED.as_bytes(), pool.stake_mint.as_ref()],
        bump = pool.bump,
    )]
    pub pool: Box<Account<'info, Pool>>,

    #[account(
        mut,
        seeds = [
            STAKER_ACCOUNT_SEED.as_bytes(),
            pool.key().as_ref(),
            owner.key().as_ref()
        ],
        bump = staker_account.bump,
    )]
    pub staker_account: Box<Account<'info, StakerAccount>>,

    /// Vault authority PDA.
    ///
    /// CHECK: PDA derivation enforced by seeds; used only as a signer.
    #[account(
        seeds = [crate::AUTH_SEED.as_bytes(), pool.key().as_ref()],
        bump = pool.authority_bump,
    )]
    pub authority: UncheckedAccount<'info>,

    #[account(mut, address = pool.reward_vault @ ErrorCode::InvalidVault)]
    pub reward_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(address = pool.reward_mint @ ErrorCode::InvalidMint)]
    pub reward_mint: Box<InterfaceAccount<'info, Mint>>,

    /// Staker's reward token ATA, created on first claim.
    #[account(
        init_if_needed,
        payer = owner,
        associated_token::mint = reward_mint,
        associated_token::authority = owner,
        associated_token::token_program = token_program,
    )]
    pub owner_reward_token: Box<InterfaceAccount<'info, TokenAccount>>,

    pub token_program: Interface<'info, TokenInterface>,

    pub associated_token_program: Program<'info, AssociatedToken>,

    pub system_program: Program<'info, System>,
}

/// Pays out all accrued rewards. A claim of zero still emits `RewardPaid`.
pub fn get_reward(ctx: Context<GetReward>) -> Result<()> {
    let now = current_timestamp()?;
    let pool_key = ctx.accounts.pool.key();

    let reward = RewardAccountant::new(&mut ctx.accounts.pool, now)
        .get_reward(&mut ctx.accounts.staker_account)?;

    transfer_from_pool_vault_to_user(
        ctx.accounts.authority.to_account_info(),
        ctx.accounts.reward_vault.to_account_info(),
        ctx.accounts.owner_reward_token.to_account_info(),
        ctx.accounts.reward_mint.to_account_info(),
        ctx.accounts.token_program.to_account_info(),
        reward,
        ctx.accounts.reward_mint.decimals,
        &[&[
            crate::AUTH_SEED.as_bytes(),
            pool_key.as_ref(),
            &[ctx.accounts.pool.authority_bump],
        ]],
    )?;

    #[cfg(feature = "enable-log")]
    msg!(
        "reward paid: {} (pool total paid {})",
        reward,
        ctx.accounts.pool.total_rewards_paid
    );

    emit!(RewardPaid {
        pool: pool_key,
        user: ctx.accounts.owner.key(),
        reward,
        timestamp: now,
    });
    Ok(())
}
