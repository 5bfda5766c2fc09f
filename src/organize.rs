pub mod error;
pub mod types;
pub mod persistence;
pub mod state;
pub mod rollover;
pub mod timer;

#[cfg(test)]
mod tests;

// Re-export the main types for easy access
pub use error::*;
pub use types::*;
pub use persistence::*;
pub use state::*;
pub use rollover::*;
pub use timer::*;
