//! Data models for the reconciliation engine.

pub mod item;
pub mod plan;
pub mod record;
pub mod summary;
