//! NFO Sync Library
//!
//! A library for reconciling NFO metadata sidecar files (shows, seasons,
//! episodes, movies) with the corresponding items in a Plex media library.

pub mod cli;
pub mod core;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

pub use error::{Error, Result};
