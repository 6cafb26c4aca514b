//! Command implementations.

pub mod inspect;
pub mod sync;
