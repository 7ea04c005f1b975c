use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use chat_relay::{ChatInstance, ChatLog, Config, Registry, Server};

/// Single-room TCP chat relay
#[derive(Parser, Debug)]
#[command(name = "chat-relay", version, about)]
struct Args {
    /// Path to the JSON config file
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("chat_relay=info".parse()?),
        )
        .init();

    let config = Config::load(&args.config);
    let log = ChatLog::open_or_discard(&config.log_file_path).await;
    let chat = Arc::new(ChatInstance::new(Registry::new(), log, config.name_policy));

    let server = Server::bind(&config.listen_addr(), chat).await?;

    info!(
        addr = %config.listen_addr(),
        log = %config.log_file_path.display(),
        "Chat server listening"
    );

    tokio::select! {
        _ = server.run() => {}
        result = wait_for_shutdown_signal() => {
            result?;
            info!("Shutdown signal received");
        }
    }

    Ok(())
}

async fn wait_for_shutdown_signal() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut sigterm = signal(SignalKind::terminate())?;
        tokio::select! {
            _ = sigterm.recv() => {}
            result = tokio::signal::ctrl_c() => result?,
        }
    }

    #[cfg(not(unix))]
    tokio::signal::ctrl_c().await?;

    Ok(())
}
