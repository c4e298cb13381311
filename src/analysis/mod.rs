//! Analysis modules.

pub mod summary;

pub use summary::*;
