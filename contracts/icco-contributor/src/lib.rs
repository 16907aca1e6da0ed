pub mod contract;
pub mod error;
mod execute;
pub mod msg;
mod query;
pub mod state;
