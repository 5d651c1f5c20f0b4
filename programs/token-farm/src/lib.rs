use anchor_lang::prelude::*;

#[cfg(not(feature = "no-entrypoint"))]
use solana_security_txt::security_txt;

declare_id!("8UcZcK3hZN2nBK5Zj5cQm6wqQt6DxxGXQARYDQgqwp7b");

#[cfg(not(feature = "no-entrypoint"))]
security_txt! {
    name: "token-farm",
    project_url: "https://github.com/token-farm/token-farm",
    contacts: "email:security@token-farm.dev",
    policy: "https://github.com/token-farm/token-farm/blob/main/SECURITY.md"
}

pub const AUTH_SEED: &str = "authority";
pub const STAKE_VAULT_SEED: &str = "stake_vault";
pub const REWARD_VAULT_SEED: &str = "reward_vault";

/// Fixed-point scale of `reward_rate` and `reward_per_token_stored`.
pub const PRECISION: u128 = 1_000_000_000_000_000_000;

/// Seven days, in seconds.
pub const DEFAULT_REWARDS_DURATION: u64 = 7 * 24 * 60 * 60;

pub mod accountant;
pub mod error;
pub mod instructions;
pub mod states;
pub mod utils;

use instructions::*;

#[program]
pub mod token_farm {

    use super::*;

    pub fn initialize_pool(
        ctx: Context<InitializePool>,
        admin: Pubkey,
        rewards_duration: u64,
    ) -> Result<()> {
        instructions::initialize_pool(ctx, admin, rewards_duration)
    }

    pub fn stake(ctx: Context<Stake>, amount: u64) -> Result<()> {
        instructions::stake(ctx, amount)
    }

    pub fn withdraw(ctx: Context<Withdraw>, amount: u64) -> Result<()> {
        instructions::withdraw(ctx, amount)
    }

    pub fn notify_reward_amount(ctx: Context<NotifyRewardAmount>, amount: u64) -> Result<()> {
        instructions::notify_reward_amount(ctx, amount)
    }

    pub fn get_reward(ctx: Context<GetReward>) -> Result<()> {
        instructions::get_reward(ctx)
    }

    pub fn exit(ctx: Context<Exit>) -> Result<()> {
        instructions::exit(ctx)
    }

    pub fn earned(ctx: Context<Earned>) -> Result<u64> {
        instructions::earned(ctx)
    }

    pub fn reward_for_duration(ctx: Context<PoolView>) -> Result<u64> {
        instructions::reward_for_duration(ctx)
    }

    pub fn reward_per_token(ctx: Context<PoolView>) -> Result<u128> {
        instructions::reward_per_token(ctx)
    }

    pub fn last_time_reward_applicable(ctx: Context<PoolView>) -> Result<u64> {
        instructions::last_time_reward_applicable(ctx)
    }

    pub fn update_config(ctx: Context<UpdateConfig>, param: u8, value: u64) -> Result<()> {
        instructions::update_config(ctx, param, value)
    }

    pub fn recover(ctx: Context<Recover>, amount: u64) -> Result<()> {
        instructions::recover(ctx, amount)
    }
}
