use std::sync::Arc;

use clap::CommandFactory;
use clap::Parser;
use clap_complete::generate;

use uicast_common::color_init;
use uicast_common::Colors;
use uicast_host::start_host;
use uicast_host::HostConfig;
use uicast_runtime::HeadlessRuntime;
use uicast_runtime::PassthroughEncoder;

mod commands;

use commands::Cli;
use commands::Commands;

fn main() {
    let cli = Cli::parse();
    color_init(cli.no_color);

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "uicast", &mut std::io::stdout());
        }
        Commands::Start {
            socket,
            frame_socket,
            stream_mode,
            device_type,
        } => {
            init_tracing();
            let mut config = HostConfig::from_env();
            if let Some(path) = socket {
                config = config.with_socket_path(path);
            }
            if let Some(path) = frame_socket {
                config = config.with_frame_socket_path(path);
            }
            if let Some(mode) = stream_mode {
                config = config.with_stream_mode(mode.into());
            }
            if let Some(device_type) = device_type {
                config = config.with_device_type(device_type);
            }

            let runtime = Arc::new(HeadlessRuntime::new());
            let encoder = Arc::new(PassthroughEncoder);
            if let Err(e) = start_host(config, runtime, encoder) {
                eprintln!("{} {}", Colors::error("Error:"), e);
                eprintln!("{} {}", Colors::dim("Suggestion:"), e.suggestion());
                std::process::exit(e.exit_code());
            }
        }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
