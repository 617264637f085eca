use std::sync::Arc;

use taskdesk::config::ServerConfig;
use taskdesk::http;
use taskdesk::static_files::StaticDir;
use taskdesk::store::{Database, LibSqlBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = ServerConfig::from_env();

    let db: Arc<dyn Database> = Arc::new(LibSqlBackend::new_local(&config.db_path).await?);

    eprintln!("taskdesk v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Database:    {}", config.db_path.display());
    eprintln!("   Static root: {}", config.static_dir.display());
    eprintln!("   Web app:     http://localhost:{}/", config.port);
    eprintln!("   Todo API:    http://localhost:{}/api/todos", config.port);
    eprintln!("   Auth API:    http://localhost:{}/api/auth/login", config.port);
    eprintln!("   Press Ctrl+C to stop.\n");

    let assets = StaticDir {
        root: config.static_dir.clone(),
        index: config.index_file.clone(),
    };
    let app = http::app(db, assets);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    tracing::info!(port = config.port, "HTTP server started");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c().await.ok();
    eprintln!("\nShutting down");
}
