//! Client library for the Anaplan Integration API.
//!
//! Authenticate with [`auth::Authenticator`], build a [`connection::Connection`]
//! for a workspace and model, then use an [`client::AnaplanClient`] to discover
//! resources, move files in chunks and run actions to completion.
//!
//! # Modules
//!
//! - `action`: Launching, polling and reporting on imports, exports, processes and actions
//! - `auth`: Basic and certificate token exchange with the identity service
//! - `client`: The API client and its request helpers
//! - `directory`: Resource listings and name resolution
//! - `transfer`: Chunked upload and download
//! - `table`: CSV tables moved through chunked transfers
//! - `report`: Structured task outcomes
//! - `http_utils`: The HTTP transport seam
//! - `commands`, `actions`, `context`: The `anaplan` command line client

pub mod action;
pub mod actions;
pub mod auth;
pub mod client;
pub mod commands;
pub mod configuration;
pub mod connection;
pub mod context;
pub mod directory;
pub mod error;
pub mod exit_codes;
pub mod format;
pub mod http_utils;
pub mod model;
pub mod report;
pub mod table;
pub mod transfer;

pub use action::{ActionCategory, PollPolicy, RetryPolicy, RunOptions};
pub use auth::{Authenticator, NonceSigner};
pub use client::AnaplanClient;
pub use connection::{AuthToken, Connection};
pub use error::ApiError;
pub use http_utils::{ApiRequest, ApiResponse, HttpClient, Transport};
pub use report::TaskReport;
pub use table::{Table, TableOptions};
