//! Structured logging setup and per-connection event types, grounded on
//! the connection-event logging pattern used throughout this server's
//! component tree.

use slog::{o, Drain, Logger};

/// Builds the root logger: a terminal decorator feeding an async drain, the
/// common `slog-term`/`slog-async` pairing.
pub fn root_logger() -> Logger {
    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();
    Logger::root(drain, o!("component" => "icapd"))
}

/// Routes the standard `log` facade (used by some dependencies) into the
/// given `slog` logger. The returned guard must be held for as long as the
/// bridge should stay active.
pub fn init_log_bridge(logger: &Logger) -> slog_scope::GlobalLoggerGuard {
    let guard = slog_scope::set_global_logger(logger.clone());
    let _ = slog_stdlog::init();
    guard
}

/// Events logged once per connection lifecycle.
pub enum ConnectionEvent<'a> {
    Accepted,
    RequestReceived { method: &'a str, service: &'a str },
    ResponseSent { status_code: u16 },
    Error(&'a str),
    Closed,
}

impl ConnectionEvent<'_> {
    pub fn log(&self, logger: &Logger) {
        match self {
            ConnectionEvent::Accepted => slog::info!(logger, "connection accepted"; "event" => "accepted"),
            ConnectionEvent::RequestReceived { method, service } => slog::debug!(
                logger, "request received";
                "event" => "request_received", "method" => *method, "service" => *service
            ),
            ConnectionEvent::ResponseSent { status_code } => slog::debug!(
                logger, "response sent";
                "event" => "response_sent", "status" => *status_code
            ),
            ConnectionEvent::Error(message) => {
                slog::error!(logger, "connection error"; "event" => "error", "message" => *message)
            }
            ConnectionEvent::Closed => slog::info!(logger, "connection closed"; "event" => "closed"),
        }
    }
}
