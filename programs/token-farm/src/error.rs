use anchor_lang::prelude::*;

#[error_code]
pub enum ErrorCode {
    #[msg("Amount must be greater than zero")]
    InvalidAmount,

    #[msg("Withdraw amount exceeds staked balance")]
    InsufficientBalance,

    #[msg("Signer is not the pool admin")]
    Unauthorized,

    #[msg("Provided reward too high for the reward vault balance")]
    RewardRateExceedsReserve,

    #[msg("Previous rewards period must be complete before changing the duration")]
    RewardPeriodActive,

    #[msg("Rewards duration must be greater than zero")]
    InvalidDuration,

    #[msg("Math operation overflowed or underflowed")]
    MathOverflow,

    #[msg("Invalid timestamp conversion")]
    InvalidTimestamp,

    #[msg("Mint does not match the pool")]
    InvalidMint,

    #[msg("Invalid vault account")]
    InvalidVault,

    #[msg("Cannot recover the staking token")]
    CannotRecoverStakingToken,

    #[msg("Missing remaining account")]
    MissingRemainingAccount,

    #[msg("Invalid parameter provided")]
    InvalidParam,
}
