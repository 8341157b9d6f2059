use std::path::PathBuf;

use clap::Parser;

use pilot_http::config::{load_config, ServerConfig};
use pilot_http::lifecycle::signals::spawn_signal_listener;
use pilot_http::observability::init_logging;
use pilot_http::{Application, HttpResponse, Shutdown};

#[derive(Parser)]
#[command(name = "pilot-http")]
#[command(about = "Minimal HTTP/1.1 server", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address (e.g. 127.0.0.1:8080)
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    init_logging(&config.observability)?;
    tracing::info!("pilot-http v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        workers = config.workers.count,
        read_deadline_secs = config.limits.read_deadline_secs,
        "Configuration loaded"
    );

    let mut app: Application<()> = Application::new(config, ());
    let routes = app.routes_mut();
    routes.get("/health", |_| Box::pin(async { Some(HttpResponse::text("OK")) }));
    routes.get("/echo/:value", |req| {
        Box::pin(async move { req.param("value").map(HttpResponse::text) })
    });

    let shutdown = Shutdown::new();
    spawn_signal_listener(shutdown.clone());

    app.start(shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
