pub mod farm_instructions;
pub mod rpc;
pub mod utils;
