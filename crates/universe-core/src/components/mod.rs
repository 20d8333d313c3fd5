//! ECS Components
//!
//! Entity state components and the observer model.

pub mod body;
pub mod observer;

pub use body::*;
pub use observer::*;
