//! External service collaborators.

pub mod library;
pub mod plex;
