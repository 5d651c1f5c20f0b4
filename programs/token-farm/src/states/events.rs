use anchor_lang::prelude::*;

//
// ──────────────────────────────────────────────────────────────────────────────
// Events: Emitted for off-chain indexers/clients to mirror pool state
// ──────────────────────────────────────────────────────────────────────────────
//
// Every event that corresponds to a state transition carries the clock value
// the transition used, so an indexer can replay it exactly.

/// Emitted once when a pool is created.
#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct PoolInitialized {
    pub pool: Pubkey,
    pub admin: Pubkey,
    pub stake_mint: Pubkey,
    pub reward_mint: Pubkey,
    pub rewards_duration: u64,
    pub timestamp: u64,
}

/// Emitted when a user stakes tokens.
#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct Staked {
    pub pool: Pubkey,
    pub user: Pubkey,
    pub amount: u64,
    pub timestamp: u64,
}

/// Emitted when a user withdraws staked tokens (also by `exit`).
#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct Withdrawn {
    pub pool: Pubkey,
    pub user: Pubkey,
    pub amount: u64,
    pub timestamp: u64,
}

/// Emitted when the admin injects new rewards.
#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct RewardAdded {
    pub pool: Pubkey,
    pub reward: u64,
    /// Resulting rate, scaled by `PRECISION`.
    pub reward_rate: u128,
    pub period_finish: u64,
    pub timestamp: u64,
}

/// Emitted on every claim, including claims that pay nothing.
#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct RewardPaid {
    pub pool: Pubkey,
    pub user: Pubkey,
    pub reward: u64,
    pub timestamp: u64,
}

#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct RewardsDurationUpdated {
    pub pool: Pubkey,
    pub new_duration: u64,
    pub timestamp: u64,
}

#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct OwnershipTransferred {
    pub pool: Pubkey,
    pub previous_admin: Pubkey,
    pub new_admin: Pubkey,
}

/// Emitted when the admin recovers tokens from a program-owned account.
#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct Recovered {
    pub pool: Pubkey,
    pub token: Pubkey,
    pub amount: u64,
}
