pub mod events;
pub use events::*;

pub mod pool;
pub use pool::*;

pub mod staker_account;
pub use staker_account::*;
