pub mod config;
pub mod error;
pub mod history;
pub mod scheduler;

pub use error::{Result, SplitterError};
