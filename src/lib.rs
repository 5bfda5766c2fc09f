pub mod config;
pub mod organize;

pub use organize::*;
