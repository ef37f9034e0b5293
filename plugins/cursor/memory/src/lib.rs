mod config;
mod cursor;
mod dataset;

pub use config::MemoryCursorConfig;
pub use cursor::{MemoryCursor, MemoryRow};
pub use dataset::Dataset;
