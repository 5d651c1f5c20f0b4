use anchor_lang::prelude::*;

//
// ──────────────────────────────────────────────────────────────────────────────
// Pool Account
// ──────────────────────────────────────────────────────────────────────────────
//

/// PDA seed string used to derive a pool account: `POOL_SEED + stake_mint`.
pub const POOL_SEED: &str = "pool";

/// Shared reward-accrual state for one staking token.
///
/// Created once by `initialize_pool` and mutated by every staking and reward
/// instruction. All reward math goes through [`crate::accountant::RewardAccountant`].
#[account]
#[derive(Default, Debug)]
pub struct Pool {
    /// PDA bump for this account.
    pub bump: u8,

    /// Bump of the vault authority PDA (`AUTH_SEED + pool`).
    pub authority_bump: u8,

    /// Only signer allowed to notify rewards, change config and recover tokens.
    pub admin: Pubkey,

    /// Mint of the token being staked.
    pub stake_mint: Pubkey,

    /// Mint of the token paid out as rewards.
    pub reward_mint: Pubkey,

    /// Program-owned vault holding staked tokens.
    pub stake_vault: Pubkey,

    /// Program-owned vault holding reward tokens.
    pub reward_vault: Pubkey,

    /// Sum of every staker's `staked_amount`.
    pub total_staked: u64,

    /// Reward units emitted per second, scaled by `PRECISION`.
    pub reward_rate: u128,

    /// Accumulated reward per staked unit since inception, scaled by `PRECISION`.
    pub reward_per_token_stored: u128,

    /// UNIX timestamp (seconds) up to which `reward_per_token_stored` is settled.
    pub last_update_time: u64,

    /// UNIX timestamp (seconds) at which the current reward period ends.
    pub period_finish: u64,

    /// Length of a reward period in seconds.
    pub rewards_duration: u64,

    /// Number of distinct accounts that have ever staked.
    pub staker_count: u64,

    /// Total reward amount ever notified.
    pub total_rewards_notified: u64,

    /// Total reward amount ever paid out.
    pub total_rewards_paid: u64,
}

impl Pool {
    /// Fixed serialized size of the account (for allocation at initialization).
    ///
    /// Breakdown:
    /// - 8: account discriminator
    /// - 1 + 1: bumps
    /// - 32 * 5: five Pubkeys
    /// - 8 * 7: seven `u64` fields
    /// - 16 * 2: two `u128` fields
    pub const LEN: usize = 8 + 1 + 1 + 32 * 5 + 8 * 7 + 16 * 2;

    pub fn is_period_active(&self, now: u64) -> bool {
        now < self.period_finish
    }

    /// Gate for the admin-only instructions.
    pub fn is_admin(&self, key: &Pubkey) -> bool {
        self.admin == *key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_current_admin_passes_the_gate() {
        let admin = Pubkey::new_unique();
        let mut pool = Pool {
            admin,
            ..Default::default()
        };
        assert!(pool.is_admin(&admin));
        assert!(!pool.is_admin(&Pubkey::new_unique()));
        assert!(!pool.is_admin(&Pubkey::default()));

        let successor = Pubkey::new_unique();
        pool.admin = successor;
        assert!(pool.is_admin(&successor));
        assert!(!pool.is_admin(&admin));
    }
}
