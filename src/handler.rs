//! The handler contract (component 4.G) and the default echo handler
//! (component 4.L), grounded on the reference implementation's
//! `service_handler`.

use async_trait::async_trait;
use slog::Logger;

use crate::error::IcapResult;
use crate::protocol::{AdaptationResult, IcapRequest};

/// A service registered under a name in the listener's service table.
/// Implementations must not mutate the request's headers; they hand back a
/// fresh [`AdaptationResult`].
#[async_trait]
pub trait IcapHandler: Send + Sync {
    async fn adapt(&self, request: &IcapRequest) -> IcapResult<AdaptationResult>;
}

/// Echoes encapsulated content back unchanged for REQMOD and RESPMOD, and
/// answers OPTIONS with the methods it supports. Demonstrates the handler
/// contract; real adaptation logic is supplied by the embedding application.
pub struct EchoHandler {
    logger: Logger,
}

impl EchoHandler {
    pub fn new(logger: Logger) -> Self {
        EchoHandler { logger }
    }
}

#[async_trait]
impl IcapHandler for EchoHandler {
    async fn adapt(&self, request: &IcapRequest) -> IcapResult<AdaptationResult> {
        use crate::protocol::IcapMethod;

        match request.request_line.method {
            IcapMethod::Options => {
                let mut headers = crate::protocol::HeaderMap::new();
                headers.set("methods", b"REQMOD".to_vec());
                headers.set("preview", b"0".to_vec());
                headers.set("allow", b"204".to_vec());
                Ok(AdaptationResult {
                    content: Default::default(),
                    status_code: 200,
                    headers,
                    content_was_altered: false,
                })
            }
            IcapMethod::Reqmod | IcapMethod::Respmod => {
                if let Some(header) = &request.body.request_header {
                    if let Some(first_line) = header.split(|b| *b == b'\n').next() {
                        slog::debug!(self.logger, "echoing request";
                            "first_line" => String::from_utf8_lossy(first_line).trim().to_string());
                    }
                }
                Ok(AdaptationResult::unmodified(request.body.clone()))
            }
        }
    }
}
