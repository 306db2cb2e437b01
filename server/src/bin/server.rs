use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};

use axum::http::Method;
use camino::{Utf8Path as Path, Utf8PathBuf as PathBuf};
use clap::Parser;
use eyre::{self, Context, Result};
use picstash::{
    app_state::{AppState, SharedState},
    routes,
};
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::MakeRequestUuid,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
    ServiceBuilderExt,
};
use tracing::info;
use tracing_error::ErrorLayer;
use tracing_subscriber::{prelude::*, EnvFilter};

use picstash_core::{
    config,
    core::{
        asset_manager::AssetManager,
        storage::{LocalFileStorage, Storage},
    },
    deadpool_diesel, interact,
    model::repository::db::{self, DbPool},
};

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    #[arg(short, long)]
    config: String,
    #[arg(long)]
    skip_startup_check: bool,
    #[cfg(feature = "opentelemetry")]
    #[arg(long)]
    otel_endpoint: Option<String>,
}

async fn db_setup(db_path: &Path) -> Result<DbPool> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .wrap_err_with(|| format!("error creating database directory {}", parent))?;
        }
    }
    let pool = db::open_db_pool(db_path.as_str())?;
    let conn = pool.get().await?;
    interact!(conn, db::migrate).await??;
    Ok(pool)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "1")
    }
    if std::env::var("RUST_SPANTRACE").is_err() {
        std::env::set_var("RUST_SPANTRACE", "1");
    }
    color_eyre::install()?;
    let tracing = tracing_subscriber::registry()
        .with(EnvFilter::from_env("PICSTASH_LOG"))
        .with(ErrorLayer::default())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr));
    #[cfg(feature = "opentelemetry")]
    {
        use opentelemetry_otlp::WithExportConfig;
        let telemetry = args
            .otel_endpoint
            .as_ref()
            .map(|otel_endpoint| {
                opentelemetry_otlp::new_pipeline()
                    .tracing()
                    .with_exporter(
                        opentelemetry_otlp::new_exporter()
                            .tonic()
                            .with_endpoint(otel_endpoint),
                    )
                    .with_trace_config(opentelemetry_sdk::trace::config().with_resource(
                        opentelemetry_sdk::Resource::new(vec![opentelemetry::KeyValue::new(
                            opentelemetry_semantic_conventions::resource::SERVICE_NAME,
                            "picstash",
                        )]),
                    ))
                    .install_batch(opentelemetry_sdk::runtime::Tokio)
                    .wrap_err("error setting up OpenTelemetry exporter")
            })
            .transpose()?
            .map(|tracer| tracing_opentelemetry::layer().with_tracer(tracer));
        tracing.with(telemetry).init();
    }
    #[cfg(not(feature = "opentelemetry"))]
    {
        tracing.init();
    }

    let config_path = PathBuf::from(args.config);
    let config = config::read_config(&config_path).await?;

    info!("Starting up...");
    tokio::fs::create_dir_all(&config.images.dir)
        .await
        .wrap_err_with(|| format!("error creating image directory {}", config.images.dir))?;
    let storage: Storage = LocalFileStorage::new(config.images.dir.clone()).into();

    if !args.skip_startup_check {
        tracing::info!("Running self check");
        if picstash_core::startup_self_check::run_self_check(&storage)
            .await
            .is_err()
        {
            eyre::bail!("Self check failed");
        }
        tracing::info!("Self check successful");
    } else {
        tracing::info!("Skipping self check");
    }

    let addr: IpAddr = config
        .server
        .address
        .as_ref()
        .map(|a| a.parse().wrap_err("error parsing listening address"))
        .transpose()?
        .unwrap_or(IpAddr::from([127, 0, 0, 1]));
    let port = config.server.port;

    let pool = db_setup(&config.database_path).await?;
    let manager = AssetManager::new(pool, storage, config.store_params());
    let shared_state: SharedState = Arc::new(AppState { manager });
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_origin(Any);
    let app = routes::app(shared_state, config.images.dir.clone())
        .layer(
            ServiceBuilder::new()
                .set_x_request_id(MakeRequestUuid)
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().include_headers(true))
                        .on_response(DefaultOnResponse::new().include_headers(true)),
                )
                .propagate_x_request_id(),
        )
        .layer(cors);
    let listener = tokio::net::TcpListener::bind(SocketAddr::new(addr, port))
        .await
        .wrap_err("Error binding socket")?;
    info!("Listening on {}", SocketAddr::new(addr, port));
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .wrap_err("error running server")?;
    info!("Shutting down...");

    Ok(())
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => {}
        Err(err) => {
            eprintln!("Unable to listen for shutdown signal: {}", err);
            // we also shut down in case of error
            std::process::exit(1);
        }
    }
}
