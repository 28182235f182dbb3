use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::signal;
use tracing::{error, info};

use rfsd::backing_store::BackingStore;
use rfsd::config::Config;
use rfsd::meta::MetaStore;
use rfsd::service::Filesystem;
use rfsd::signup::{HttpSignupSink, NoopSignupSink, SignupSink};

/// Server side of a remote POSIX-like filesystem.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "rfsd.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let config = Config::load(&args.config)?;
    info!(backing_root = %config.backing_root.display(), database_path = %config.database_path.display(), "loading rfsd config");

    tokio::fs::create_dir_all(&config.backing_root).await?;
    let meta = MetaStore::open(&config.database_path).await?;
    let backing = BackingStore::new(config.backing_root.clone());

    let signup: Arc<dyn SignupSink> = match &config.auth_base_url {
        Some(url) => Arc::new(HttpSignupSink::new(url.clone())),
        None => Arc::new(NoopSignupSink),
    };
    let fs = Filesystem::with_signup(meta, backing, signup);

    let app = rfsd::http::router(fs);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %config.bind_addr, "rfsd listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            error!(error = %e, "server error");
            e
        })?;

    info!("rfsd stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
