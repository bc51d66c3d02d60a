use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use webdir::config::Config;
use webdir::server;

/// Serve a directory tree read-only over HTTP on port 8080.
#[derive(Parser, Debug)]
#[command(name = "webdir", version, about)]
struct Args {
    /// Directory to serve
    root: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let args = Args::parse();
    if !args.root.is_dir() {
        tracing::warn!(
            root = %args.root.display(),
            "root is not a directory, every request will get 404"
        );
    }

    let cfg = Arc::new(Config::new(args.root));

    tokio::select! {
        res = server::listener::run(Arc::clone(&cfg)) => {
            if let Err(e) = &res {
                tracing::error!("{:#}", e);
            }
            res?;
        }

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
