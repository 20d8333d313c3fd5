//! World Setup
//!
//! Population creation, resource insertion, and observer attachment.

pub mod population;

pub use population::*;
