//! CLI command implementations.
//!
//! # Command Modules
//!
//! - [`circle`] - Print a search-radius polygon
//! - [`config`] - Configuration management (path, show, init)
//! - [`inspect`] - Simulate a map click against the configured backend
//! - [`search`] - Autocomplete suggestions

pub mod circle;
pub mod config;
pub mod inspect;
pub mod search;
