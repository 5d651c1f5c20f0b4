use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use token_farm::states::{Pool, StakerAccount};

/// Stored record with a kind and a string id, unique within its kind.
pub trait Entity {
    const KIND: &'static str;

    fn id(&self) -> &str;
}

/// `0x`-prefixed lowercase hex of an address.
pub fn to_hex(key: &Pubkey) -> String {
    format!("0x{}", hex::encode(key.as_ref()))
}

pub fn staker_id(pool: &Pubkey, user: &Pubkey) -> String {
    format!("{}-{}", to_hex(pool), to_hex(user))
}

/// Mirrored pool state, keyed by the hex of the pool address.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolEntity {
    pub id: String,
    pub admin: String,
    /// Admin replaced by the latest ownership transfer; empty before any.
    #[serde(default)]
    pub previous_admin: String,
    #[serde(default)]
    pub ownership_transfers: u64,
    pub stake_mint: String,
    pub reward_mint: String,
    pub rewards_duration: u64,
    /// Stake balance: tokens currently staked in the pool.
    pub total_staked: u64,
    pub reward_rate: u128,
    pub reward_per_token_stored: u128,
    pub last_update_time: u64,
    pub period_finish: u64,
    pub staker_count: u64,
    pub total_rewards_notified: u64,
    pub total_rewards_paid: u64,
}

impl PoolEntity {
    pub fn new(
        pool: &Pubkey,
        admin: &Pubkey,
        stake_mint: &Pubkey,
        reward_mint: &Pubkey,
        rewards_duration: u64,
        now: u64,
    ) -> Self {
        PoolEntity {
            id: to_hex(pool),
            admin: admin.to_string(),
            stake_mint: stake_mint.to_string(),
            reward_mint: reward_mint.to_string(),
            rewards_duration,
            last_update_time: now,
            ..Default::default()
        }
    }

    /// Reward tokens deposited and not yet paid out.
    pub fn reward_balance(&self) -> u64 {
        self.total_rewards_notified
            .saturating_sub(self.total_rewards_paid)
    }

    /// Accounting fields as a `Pool`; addresses are left default.
    pub fn to_pool(&self) -> Pool {
        Pool {
            total_staked: self.total_staked,
            reward_rate: self.reward_rate,
            reward_per_token_stored: self.reward_per_token_stored,
            last_update_time: self.last_update_time,
            period_finish: self.period_finish,
            rewards_duration: self.rewards_duration,
            staker_count: self.staker_count,
            total_rewards_notified: self.total_rewards_notified,
            total_rewards_paid: self.total_rewards_paid,
            ..Default::default()
        }
    }

    pub fn apply_pool(&mut self, pool: &Pool) {
        self.total_staked = pool.total_staked;
        self.reward_rate = pool.reward_rate;
        self.reward_per_token_stored = pool.reward_per_token_stored;
        self.last_update_time = pool.last_update_time;
        self.period_finish = pool.period_finish;
        self.rewards_duration = pool.rewards_duration;
        self.staker_count = pool.staker_count;
        self.total_rewards_notified = pool.total_rewards_notified;
        self.total_rewards_paid = pool.total_rewards_paid;
    }
}

impl Entity for PoolEntity {
    const KIND: &'static str = "Pool";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Mirrored staker state, keyed by `<pool hex>-<user hex>`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakerEntity {
    pub id: String,
    pub address: String,
    pub staked_amount: u64,
    /// Lifetime rewards paid to this staker.
    pub rewarded_amount: u64,
    pub rewards: u64,
    pub user_reward_per_token_paid: u128,
}

impl StakerEntity {
    pub fn new(pool: &Pubkey, user: &Pubkey) -> Self {
        StakerEntity {
            id: staker_id(pool, user),
            address: user.to_string(),
            ..Default::default()
        }
    }

    pub fn to_staker_account(&self) -> StakerAccount {
        StakerAccount {
            staked_amount: self.staked_amount,
            rewards: self.rewards,
            user_reward_per_token_paid: self.user_reward_per_token_paid,
            total_rewards_paid: self.rewarded_amount,
            ..Default::default()
        }
    }

    pub fn apply_staker_account(&mut self, staker: &StakerAccount) {
        self.staked_amount = staker.staked_amount;
        self.rewards = staker.rewards;
        self.user_reward_per_token_paid = staker.user_reward_per_token_paid;
        self.rewarded_amount = staker.total_rewards_paid;
    }
}

impl Entity for StakerEntity {
    const KIND: &'static str = "Staker";

    fn id(&self) -> &str {
        &self.id
    }
}
