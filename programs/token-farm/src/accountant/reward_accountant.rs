use super::fixed_point::mul_div_floor;
use crate::error::ErrorCode;
use crate::states::{Pool, StakerAccount};
use crate::PRECISION;
use anchor_lang::prelude::*;

fn overflow() -> anchor_lang::error::Error {
    error!(ErrorCode::MathOverflow)
}

/// Pool-level values produced by settling accrual up to `now`, not yet written.
struct Settlement {
    reward_per_token: u128,
    last_update_time: u64,
    /// Settled `rewards` of the staker passed to `settle`, if any.
    staker_rewards: Option<u64>,
}

/// Reward accounting for one pool at a fixed point in time.
///
/// Every mutating operation settles accrual first (the `update_reward` step),
/// validates, and only then writes to the pool and staker. A failed operation
/// leaves both untouched.
pub struct RewardAccountant<'a> {
    pool: &'a mut Pool,
    now: u64,
}

impl<'a> RewardAccountant<'a> {
    pub fn new(pool: &'a mut Pool, now: u64) -> Self {
        Self { pool, now }
    }

    pub fn pool(&self) -> &Pool {
        self.pool
    }

    pub fn now(&self) -> u64 {
        self.now
    }

    /// `min(now, period_finish)`.
    pub fn last_time_reward_applicable(&self) -> u64 {
        self.now.min(self.pool.period_finish)
    }

    /// Reward per staked unit as of `now`, scaled by `PRECISION`.
    pub fn reward_per_token(&self) -> Result<u128> {
        let pool = &*self.pool;
        if pool.total_staked == 0 {
            return Ok(pool.reward_per_token_stored);
        }
        let elapsed = self
            .last_time_reward_applicable()
            .saturating_sub(pool.last_update_time);
        let accrued = mul_div_floor(
            elapsed as u128,
            pool.reward_rate,
            pool.total_staked as u128,
        )
        .ok_or_else(overflow)?;
        pool.reward_per_token_stored
            .checked_add(accrued)
            .ok_or_else(overflow)
    }

    /// What `staker.rewards` would become after settling at `now`.
    pub fn earned(&self, staker: &StakerAccount) -> Result<u64> {
        Self::earned_at(staker, self.reward_per_token()?)
    }

    /// Projected payout of one full period at the current rate.
    pub fn reward_for_duration(&self) -> Result<u64> {
        let reward = mul_div_floor(
            self.pool.reward_rate,
            self.pool.rewards_duration as u128,
            PRECISION,
        )
        .ok_or_else(overflow)?;
        u64::try_from(reward).map_err(|_| overflow())
    }

    /// Settles pool accrual and, when given, the staker's rewards.
    pub fn update_reward(&mut self, staker: Option<&mut StakerAccount>) -> Result<()> {
        let settlement = self.settle(staker.as_deref())?;
        self.apply(settlement, staker);
        Ok(())
    }

    pub fn stake(&mut self, staker: &mut StakerAccount, amount: u64) -> Result<()> {
        require!(amount > 0, ErrorCode::InvalidAmount);
        let total_staked = self
            .pool
            .total_staked
            .checked_add(amount)
            .ok_or_else(overflow)?;
        let staked_amount = staker
            .staked_amount
            .checked_add(amount)
            .ok_or_else(overflow)?;
        let settlement = self.settle(Some(&*staker))?;

        self.apply(settlement, Some(&mut *staker));
        self.pool.total_staked = total_staked;
        staker.staked_amount = staked_amount;
        Ok(())
    }

    pub fn withdraw(&mut self, staker: &mut StakerAccount, amount: u64) -> Result<()> {
        require!(amount > 0, ErrorCode::InvalidAmount);
        require!(
            amount <= staker.staked_amount,
            ErrorCode::InsufficientBalance
        );
        let total_staked = self
            .pool
            .total_staked
            .checked_sub(amount)
            .ok_or_else(overflow)?;
        let settlement = self.settle(Some(&*staker))?;

        self.apply(settlement, Some(&mut *staker));
        self.pool.total_staked = total_staked;
        staker.staked_amount -= amount;
        Ok(())
    }

    /// Starts a new reward period of `rewards_duration` seconds distributing
    /// `amount` plus whatever the running period has not yet emitted.
    ///
    /// `reserve` is the reward-token balance available to back the new rate.
    pub fn notify_reward_amount(&mut self, amount: u64, reserve: u64) -> Result<()> {
        let duration = self.pool.rewards_duration;
        require!(duration > 0, ErrorCode::InvalidDuration);

        let scaled_amount = (amount as u128)
            .checked_mul(PRECISION)
            .ok_or_else(overflow)?;
        let distributable = if self.now >= self.pool.period_finish {
            scaled_amount
        } else {
            let remaining = self.pool.period_finish - self.now;
            let leftover = (remaining as u128)
                .checked_mul(self.pool.reward_rate)
                .ok_or_else(overflow)?;
            scaled_amount.checked_add(leftover).ok_or_else(overflow)?
        };
        let reward_rate = distributable / duration as u128;

        let max_rate =
            mul_div_floor(reserve as u128, PRECISION, duration as u128).ok_or_else(overflow)?;
        require!(
            reward_rate <= max_rate,
            ErrorCode::RewardRateExceedsReserve
        );

        let period_finish = self.now.checked_add(duration).ok_or_else(overflow)?;
        let total_rewards_notified = self
            .pool
            .total_rewards_notified
            .checked_add(amount)
            .ok_or_else(overflow)?;
        let settlement = self.settle(None)?;

        self.apply(settlement, None);
        self.pool.reward_rate = reward_rate;
        self.pool.last_update_time = self.now;
        self.pool.period_finish = period_finish;
        self.pool.total_rewards_notified = total_rewards_notified;
        Ok(())
    }

    /// Settles and zeroes the staker's rewards, returning the amount the caller
    /// must transfer. Zero is a valid outcome, not an error.
    pub fn get_reward(&mut self, staker: &mut StakerAccount) -> Result<u64> {
        let settlement = self.settle(Some(&*staker))?;
        let reward = settlement.staker_rewards.unwrap_or_default();
        let pool_paid = self
            .pool
            .total_rewards_paid
            .checked_add(reward)
            .ok_or_else(overflow)?;
        let staker_paid = staker
            .total_rewards_paid
            .checked_add(reward)
            .ok_or_else(overflow)?;

        self.apply(settlement, Some(&mut *staker));
        staker.rewards = 0;
        staker.total_rewards_paid = staker_paid;
        self.pool.total_rewards_paid = pool_paid;
        Ok(reward)
    }

    /// Withdraws the whole stake and claims, as one operation.
    ///
    /// Returns `(withdrawn, reward)`.
    pub fn exit(&mut self, staker: &mut StakerAccount) -> Result<(u64, u64)> {
        let mut pool = self.pool.clone();
        let mut account = staker.clone();
        let withdrawn = account.staked_amount;

        let mut scratch = RewardAccountant::new(&mut pool, self.now);
        scratch.withdraw(&mut account, withdrawn)?;
        let reward = scratch.get_reward(&mut account)?;

        *self.pool = pool;
        *staker = account;
        Ok((withdrawn, reward))
    }

    pub fn set_rewards_duration(&mut self, duration: u64) -> Result<()> {
        require!(duration > 0, ErrorCode::InvalidDuration);
        require!(
            !self.pool.is_period_active(self.now),
            ErrorCode::RewardPeriodActive
        );
        self.pool.rewards_duration = duration;
        Ok(())
    }

    fn earned_at(staker: &StakerAccount, reward_per_token: u128) -> Result<u64> {
        let pending_per_token = reward_per_token
            .checked_sub(staker.user_reward_per_token_paid)
            .ok_or_else(overflow)?;
        let pending = mul_div_floor(staker.staked_amount as u128, pending_per_token, PRECISION)
            .ok_or_else(overflow)?;
        let total = (staker.rewards as u128)
            .checked_add(pending)
            .ok_or_else(overflow)?;
        u64::try_from(total).map_err(|_| overflow())
    }

    fn settle(&self, staker: Option<&StakerAccount>) -> Result<Settlement> {
        let reward_per_token = self.reward_per_token()?;
        let staker_rewards = match staker {
            Some(staker) => Some(Self::earned_at(staker, reward_per_token)?),
            None => None,
        };
        // A clock reading behind the last settlement must not rewind it.
        let last_update_time = self
            .last_time_reward_applicable()
            .max(self.pool.last_update_time);
        Ok(Settlement {
            reward_per_token,
            last_update_time,
            staker_rewards,
        })
    }

    fn apply(&mut self, settlement: Settlement, staker: Option<&mut StakerAccount>) {
        self.pool.reward_per_token_stored = settlement.reward_per_token;
        self.pool.last_update_time = settlement.last_update_time;
        if let (Some(staker), Some(rewards)) = (staker, settlement.staker_rewards) {
            staker.rewards = rewards;
            staker.user_reward_per_token_paid = settlement.reward_per_token;
        }
    }
}
