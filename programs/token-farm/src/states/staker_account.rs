use anchor_lang::prelude::*;

//
// ──────────────────────────────────────────────────────────────────────────────
// StakerAccount
// ──────────────────────────────────────────────────────────────────────────────
//

/// PDA seed string used to derive a staker account: `STAKER_ACCOUNT_SEED + pool + owner`.
pub const STAKER_ACCOUNT_SEED: &str = "staker";

/// One participant's position in a [`crate::states::Pool`].
///
/// Created on first stake and never closed; it may return to a zero balance.
#[account]
#[derive(Default, Debug)]
pub struct StakerAccount {
    /// PDA bump for this account.
    pub bump: u8,

    /// Pool this position belongs to. Lookup only.
    pub pool: Pubkey,

    /// Owner (user) to whom this record belongs.
    pub owner: Pubkey,

    /// Tokens currently staked.
    pub staked_amount: u64,

    /// Rewards accrued but not yet claimed.
    pub rewards: u64,

    /// Snapshot of `pool.reward_per_token_stored` at the last interaction.
    pub user_reward_per_token_paid: u128,

    /// Total reward ever paid to this owner.
    pub total_rewards_paid: u64,
}

impl StakerAccount {
    /// Breakdown:
    /// - 8: account discriminator
    /// - 1: bump
    /// - 32 * 2: pool and owner
    /// - 8 * 3: three `u64` fields
    /// - 16: one `u128` field
    pub const LEN: usize = 8 + 1 + 32 * 2 + 8 * 3 + 16;

    pub fn is_staking(&self) -> bool {
        self.staked_amount > 0
    }
}
