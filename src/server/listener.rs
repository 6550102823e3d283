//! Accepts connections and fans each out to a session-loop task
//! (component 4.F).

use std::sync::Arc;

use slog::{o, Logger};
use tokio::net::TcpListener;

use crate::error::IcapResult;
use crate::server::connection::{handle_connection, ServiceTable};
use crate::stats::IcapStats;

pub struct IcapListener {
    listener: TcpListener,
    services: Arc<ServiceTable>,
    stats: Arc<IcapStats>,
    logger: Logger,
}

impl IcapListener {
    pub async fn bind(
        host: &str,
        port: u16,
        services: ServiceTable,
        stats: Arc<IcapStats>,
        logger: Logger,
    ) -> IcapResult<Self> {
        let listener = TcpListener::bind((host, port)).await?;
        Ok(IcapListener {
            listener,
            services: Arc::new(services),
            stats,
            logger,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts connections until `shutdown` fires, spawning one session
    /// task per connection. Already-accepted connections are allowed to
    /// run their keep-alive loop to completion; only the accept loop
    /// itself observes the shutdown signal.
    pub async fn serve(self, shutdown: Arc<tokio::sync::Notify>) {
        slog::info!(self.logger, "listening"; "event" => "listening");
        loop {
            tokio::select! {
                accepted = self.listener.accept() => {
                    let (stream, peer_addr) = match accepted {
                        Ok(pair) => pair,
                        Err(err) => {
                            slog::error!(self.logger, "accept failed"; "event" => "accept_error", "message" => %err);
                            continue;
                        }
                    };
                    let services = self.services.clone();
                    let stats = self.stats.clone();
                    let conn_logger = self.logger.new(o!("peer" => peer_addr.to_string()));
                    tokio::spawn(handle_connection(stream, peer_addr, services, stats, conn_logger));
                }
                _ = shutdown.notified() => {
                    slog::info!(self.logger, "shutting down"; "event" => "shutdown");
                    break;
                }
            }
        }
    }
}
