//! Core use-case services.
//!
//! # Responsibility
//! - Give the UI shell (or CLI) one typed entry point that owns the open
//!   collection and routes load/save/render calls.
//! - Keep callers away from collection files.

pub mod context;
