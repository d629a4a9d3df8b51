//! Bookstore application library
//!
//! Hosts the book list view as a module of the bookstore framework and
//! exposes the bootstrap shared by the server binary and the CLI.

pub mod app;
pub mod modules;

/// Re-export commonly used types
pub use modules::*;
