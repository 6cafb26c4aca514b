//! Core reconciliation pipeline.
//!
//! Data flows strictly downward for each NFO file:
//! scanner -> parser -> classifier -> matcher -> planner -> executor,
//! orchestrated by the session controller.

pub mod classifier;
pub mod executor;
pub mod matcher;
pub mod parser;
pub mod planner;
pub mod scanner;
pub mod session;
