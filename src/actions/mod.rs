//! Command handlers.
//!
//! Each handler takes the parsed arguments of one command, builds an
//! [`ExecutionContext`](crate::context::ExecutionContext) when it needs the
//! API, and prints the result.

pub mod config;
pub mod resources;
pub mod tasks;
pub mod transfer;
pub mod users;
pub mod utils;
