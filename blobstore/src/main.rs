use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use blobstore::api;
use blobstore::config::Config;
use blobstore::utils::cli::Args;
use blobstore::utils::state::AppState;
use clap::Parser;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "blobstore=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = validate_config(&args);

    let state = Arc::new(AppState::from_config(config).await?);
    tracing::info!(
        storage = %state.config.storage_typ,
        max_upload_bytes = state.config.max_upload_bytes,
        "blobstore initialized"
    );

    let app = api::create_router(state);

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", args.host, args.port)).await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutting down...");
}

fn validate_config(args: &Args) -> Config {
    let mut validation_errors = Vec::new();

    if args.max_upload_bytes == 0 {
        validation_errors.push("BLOBSTORE_MAX_UPLOAD_BYTES must be greater than zero".to_string());
    }

    let accepted_mimetypes: Vec<String> = args
        .accepted_mimetypes
        .iter()
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
        .collect();
    if accepted_mimetypes.is_empty() {
        validation_errors.push("BLOBSTORE_ACCEPTED_MIMETYPES must name at least one content type".to_string());
    }

    if args.backend_timeout_secs == 0 {
        validation_errors.push("BLOBSTORE_BACKEND_TIMEOUT_SECS must be greater than zero".to_string());
    }

    let storage_typ = args.storage.to_ascii_uppercase();
    match storage_typ.as_str() {
        "SQLITE" => {
            if let Some(parent) = sqlite_file_path(&args.database_url).and_then(Path::parent) {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    validation_errors.push(format!(
                        "The directory for the database `{}` does not exist",
                        parent.display(),
                    ));
                }
            }
        }
        "MEMORY" => {
            tracing::warn!("BLOBSTORE_STORAGE is MEMORY; files will not survive a restart");
        }
        other => validation_errors.push(format!(
            "BLOBSTORE_STORAGE `{other}` is not one of SQLITE, MEMORY"
        )),
    }

    let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
        tracing::warn!("JWT_SECRET is not set. Use default value: `secret`");
        "secret".into()
    });

    if !validation_errors.is_empty() {
        eprintln!("{}", validation_errors.join("\n"));
        std::process::exit(1);
    }

    Config {
        host: args.host.clone(),
        port: args.port,
        storage_typ,
        db_url: args.database_url.clone(),
        db_max_connections: args.database_max_connections,
        max_upload_bytes: args.max_upload_bytes,
        accepted_mimetypes,
        backend_timeout: Duration::from_secs(args.backend_timeout_secs),
        jwt_secret,
    }
}

/// The on-disk path of a `sqlite:` url, if it names a file.
fn sqlite_file_path(url: &str) -> Option<&Path> {
    let rest = url.strip_prefix("sqlite://").or_else(|| url.strip_prefix("sqlite:"))?;
    let path = rest.split('?').next()?;
    if path.is_empty() || path.starts_with(":memory:") {
        return None;
    }
    Some(Path::new(path))
}
