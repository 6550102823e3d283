//! Per-connection session loop (component 4.E): read a request, dispatch
//! to the registered handler, write a response, repeat until the client
//! asks to close or the stream ends.

use std::net::SocketAddr;
use std::sync::Arc;

use slog::Logger;
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

use crate::handler::IcapHandler;
use crate::log::ConnectionEvent;
use crate::protocol::{build_response, read_request, AdaptationResult};
use crate::stats::IcapStats;

pub type ServiceTable = std::collections::HashMap<String, Arc<dyn IcapHandler>>;

pub async fn handle_connection(
    stream: TcpStream,
    _peer_addr: SocketAddr,
    services: Arc<ServiceTable>,
    stats: Arc<IcapStats>,
    logger: Logger,
) {
    ConnectionEvent::Accepted.log(&logger);
    stats.connection_opened();

    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);

    loop {
        let request = match read_request(&mut reader).await {
            Ok(Some(req)) => req,
            Ok(None) => break,
            Err(err) => {
                ConnectionEvent::Error(&err.to_string()).log(&logger);
                break;
            }
        };

        ConnectionEvent::RequestReceived {
            method: request.request_line.method.as_str(),
            service: &request.request_line.service_name,
        }
        .log(&logger);
        stats.request_started(request.request_line.method);

        let wants_close = request.headers.requests_connection_close();

        let handler = services.get(&request.request_line.service_name).cloned();
        let result = match handler {
            None => AdaptationResult {
                content: Default::default(),
                status_code: 404,
                headers: Default::default(),
                content_was_altered: false,
            },
            Some(handler) => match handler.adapt(&request).await {
                Ok(mut result) => {
                    if !result.content_was_altered
                        && (request.headers.allows_204() || request.headers.has_preview())
                    {
                        result.status_code = 204;
                    }
                    result
                }
                Err(err) => {
                    ConnectionEvent::Error(&err.to_string()).log(&logger);
                    AdaptationResult {
                        content: Default::default(),
                        status_code: 500,
                        headers: Default::default(),
                        content_was_altered: false,
                    }
                }
            },
        };

        let method = request.request_line.method;
        let response_bytes = match build_response(method, &result, true) {
            Ok(bytes) => bytes,
            Err(err) => {
                ConnectionEvent::Error(&err.to_string()).log(&logger);
                break;
            }
        };

        if let Err(err) = write_half.write_all(&response_bytes).await {
            ConnectionEvent::Error(&err.to_string()).log(&logger);
            continue;
        }
        if let Err(err) = write_half.flush().await {
            ConnectionEvent::Error(&err.to_string()).log(&logger);
            continue;
        }

        stats.response_sent(result.status_code);
        ConnectionEvent::ResponseSent {
            status_code: result.status_code,
        }
        .log(&logger);

        if wants_close {
            break;
        }
    }

    stats.connection_closed();
    ConnectionEvent::Closed.log(&logger);
}
