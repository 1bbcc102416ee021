pub mod alerts;
pub mod channels;
pub mod clock;
pub mod config;
pub mod directory;
pub mod error;
pub mod expiry;
pub mod gate;
pub mod jobs;
pub mod rules;
pub mod scheduler;
pub mod store;
pub mod thresholds;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::{Result, TracciaError};
