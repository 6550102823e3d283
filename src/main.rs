use std::sync::Arc;

use icapd::handler::EchoHandler;
use icapd::opts::ProcArgs;
use icapd::server::{IcapListener, ServiceTable};
use icapd::stats::IcapStats;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = ProcArgs::parse_args();
    let logger = icapd::log::root_logger();
    let _log_bridge = icapd::log::init_log_bridge(&logger);

    let mut services: ServiceTable = ServiceTable::new();
    services.insert(
        args.service_name.clone(),
        Arc::new(EchoHandler::new(logger.clone())),
    );

    let stats = Arc::new(IcapStats::new());
    let listener = IcapListener::bind(&args.host, args.port, services, stats, logger.clone()).await?;
    slog::info!(logger, "registered service"; "event" => "service_registered", "name" => %args.service_name);

    let shutdown = Arc::new(tokio::sync::Notify::new());
    let ctrlc_shutdown = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrlc_shutdown.notify_one();
        }
    });

    listener.serve(shutdown).await;
    Ok(())
}
