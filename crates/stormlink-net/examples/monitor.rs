//! Live monitor: connect to an ISP and print every state change.
//!
//! ```sh
//! cargo run --example monitor -- 192.168.1.40:14999
//! RUST_LOG=stormlink_net=debug cargo run --example monitor
//! ```

use std::net::SocketAddr;
use std::process::ExitCode;

use tracing::info;
use tracing_subscriber::EnvFilter;

use stormlink_net::{ClientConfig, IspEvent, connect};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let mut config = ClientConfig::default();
    if let Some(arg) = std::env::args().nth(1) {
        match arg.parse::<SocketAddr>() {
            Ok(addr) => config.addr = addr,
            Err(e) => {
                eprintln!("invalid address {arg:?}: {e}");
                return ExitCode::FAILURE;
            }
        }
    }

    let (isp, mut events) = match connect(config).await {
        Ok(pair) => pair,
        Err(e) => {
            eprintln!("connect failed: {e}");
            return ExitCode::FAILURE;
        }
    };

    while let Some(event) = events.recv().await {
        match event {
            IspEvent::Updated(message) => {
                info!(
                    %message,
                    power = isp.power(),
                    volume = isp.volume(),
                    mute = isp.mute(),
                    input = %isp.input_name(),
                    state = %isp.processor_state_text(),
                    "update"
                );
            }
            IspEvent::Disconnected => {
                info!("device closed the connection");
                break;
            }
        }
    }

    ExitCode::SUCCESS
}
