//! Provides a memoizing cache for single-threaded owners.

mod builder;
mod cache;

pub use {builder::CacheBuilder, cache::Cache};
