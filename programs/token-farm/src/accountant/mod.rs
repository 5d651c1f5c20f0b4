//! Reward-per-token accounting, independent of the Solana runtime.

pub mod fixed_point;

pub mod reward_accountant;
pub use reward_accountant::*;
