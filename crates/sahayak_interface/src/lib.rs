//! Trait definitions for the Sahayak content generation library.
//!
//! The pipeline talks to a model only through [`GenerativeDriver`], so any
//! provider, test double, or wrapper (rate limiting, retries) can stand in.

mod driver;

pub use driver::GenerativeDriver;
