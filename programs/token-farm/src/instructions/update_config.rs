use crate::accountant::RewardAccountant;
use crate::error::ErrorCode;
use crate::states::*;
use crate::utils::current_timestamp;
use anchor_lang::prelude::*;

#[derive(Accounts)]
pub struct UpdateConfig<'info> {
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
}

/// Updates one admin-controlled pool parameter.
///
/// * `0` transfers admin rights to `remaining_accounts[0]`; `value` is ignored.
/// * `1` sets the rewards duration to `value` seconds. Only allowed once the
///   current period has finished.
pub fn update_config(ctx: Context<UpdateConfig>, param: u8, value: u64) -> Result<()> {
    let pool_key = ctx.accounts.pool.key();
    match param {
        0 => {
            let new_admin = *ctx
                .remaining_accounts
                .first()
                .ok_or(ErrorCode::MissingRemainingAccount)?
                .key;
            require_keys_neq!(new_admin, Pubkey::default());
            let previous_admin = ctx.accounts.pool.admin;
            ctx.accounts.pool.admin = new_admin;
            msg!("admin changed from {} to {}", previous_admin, new_admin);
            emit!(OwnershipTransferred {
                pool: pool_key,
                previous_admin,
                new_admin,
            });
        }
        1 => {
            let now = current_timestamp()?;
            RewardAccountant::new(&mut ctx.accounts.pool, now).set_rewards_duration(value)?;
            msg!("rewards duration set to {}", value);
            emit!(RewardsDurationUpdated {
                pool: pool_key,
                new_duration: value,
                timestamp: now,
            });
        }
        _ => return err!(ErrorCode::InvalidParam),
    }
    Ok(())
}
