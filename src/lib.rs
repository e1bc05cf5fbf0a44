//! Moviedeck - movie search and favorites
//!
//! This library crate exposes the core functionality for integration testing.

pub mod catalog;
pub mod config;
pub mod favorites;
pub mod session;
pub mod sort;
pub mod state;
pub mod tasks;
