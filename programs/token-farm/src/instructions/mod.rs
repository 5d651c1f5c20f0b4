pub mod initialize_pool;
pub use initialize_pool::*;

pub mod stake;
pub use stake::*;

pub mod withdraw;
pub use withdraw::*;

pub mod notify_reward_amount;
pub use notify_reward_amount::*;

pub mod get_reward;
pub use get_reward::*;

pub mod exit;
pub use exit::*;

pub mod views;
pub use views::*;

pub mod update_config;
pub use update_config::*;

pub mod recover;
pub use recover::*;
