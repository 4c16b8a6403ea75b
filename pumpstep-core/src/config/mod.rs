//! Configuration types
//!
//! Board-agnostic configuration structures, embedded in the firmware image
//! as postcard binary data.

pub mod types;

pub use types::*;
