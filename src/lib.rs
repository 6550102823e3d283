//! ICAP (RFC 3507) content adaptation server.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use icapd::handler::EchoHandler;
//! use icapd::server::{IcapListener, ServiceTable};
//! use icapd::stats::IcapStats;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let logger = icapd::log::root_logger();
//!     let mut services: ServiceTable = ServiceTable::new();
//!     services.insert("echo".to_string(), Arc::new(EchoHandler::new(logger.clone())));
//!     let listener = IcapListener::bind("127.0.0.1", 1344, services, Arc::new(IcapStats::new()), logger).await?;
//!     listener.serve(Arc::new(tokio::sync::Notify::new())).await;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod handler;
pub mod log;
pub mod opts;
pub mod protocol;
pub mod server;
pub mod stats;

pub use error::{IcapError, IcapResult};
