//! Utility functions shared across layers.
//!
//! - [`slug_generator`] - Random slug generation

pub mod slug_generator;
