//! Command-line surface (component 4.H): a positional service name bound
//! to the default echo handler, plus `--host`/`--port`.

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "icapd", about = "ICAP content adaptation server")]
pub struct ProcArgs {
    /// Service name the default echo handler is registered under.
    pub service_name: String,

    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    #[arg(long, default_value_t = 1344)]
    pub port: u16,
}

impl ProcArgs {
    pub fn parse_args() -> Self {
        ProcArgs::parse()
    }
}
