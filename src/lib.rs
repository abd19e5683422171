//! A key-value client for Deform document collections
//!
//! Each key is stored as a JSON document `{"_id": key, "value": value}` in a
//! collection of a hosted Deform project. The client exposes two async
//! operations, [`Client::get`] and [`Client::set`], each a single HTTP round
//! trip authenticated with `Authorization: Token <token>`.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use deform_kv::Client;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), deform_kv::Error> {
//!     let client = Client::new("kvproject", "settings", "your-token")?;
//!
//!     // Store a value
//!     client.set("greeting", "Hello, World!").await?;
//!
//!     // Retrieve it
//!     let value = client.get("greeting").await?;
//!     println!("Retrieved: {}", value);
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs, rust_2018_idioms)]

pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod types;

pub use client::Client;
pub use config::{AuthToken, ClientConfig};
pub use error::{Error, Result};
pub use types::Document;
