#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

cfg_if::cfg_if! {
    if #[cfg(feature = "tracing")] {
        macro_rules! trace_event {
            (debug, $($arg:tt)*) => { tracing::debug!($($arg)*) };
            (trace, $($arg:tt)*) => { tracing::trace!($($arg)*) };
        }
    } else {
        macro_rules! trace_event {
            ($level:ident, $($arg:tt)*) => {};
        }
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "foldhash")] {
        /// The hasher builder used when none is specified.
        pub type DefaultHashBuilder = foldhash::fast::RandomState;
    } else if #[cfg(feature = "std")] {
        /// The hasher builder used when none is specified.
        pub type DefaultHashBuilder = std::hash::RandomState;
    }
}

/// Error returned by key lookups that require the key to be present.
pub mod error;

/// A HashMap implementation using Robin Hood hashing.
///
/// This module provides a `HashMap` that wraps the `HashTable` and provides
/// a standard key-value map interface with configurable hashers.
pub mod hash_map;

/// The raw Robin Hood table, driven by precomputed hashes.
pub mod hash_table;

pub use error::KeyNotFound;
pub use hash_map::Entry;
pub use hash_map::HashMap;
pub use hash_table::DEFAULT_CAPACITY;
pub use hash_table::GROWTH_FACTOR;
pub use hash_table::HashTable;
pub use hash_table::MAX_LOAD_PERCENT;
pub use hash_table::REBUILD_LOAD_PERCENT;
