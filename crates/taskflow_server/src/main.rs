//! TaskFlow server entry point.

use anyhow::Context;
use log::{error, info};
use taskflow_core::db::open_db;
use taskflow_server::{build_router, AppState, ServerConfig};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::load().context("failed to load configuration")?;
    taskflow_core::init_logging(&config.log_spec()?).context("failed to initialize logging")?;

    let conn = open_db(&config.database_path).with_context(|| {
        format!(
            "failed to open database `{}`",
            config.database_path.display()
        )
    })?;
    let state = AppState::new(conn, config.session_ttl()?);

    let purged = state
        .with_auth(|auth| auth.purge_expired_sessions())
        .await?;
    info!("event=session_purge module=server status=ok removed={purged}");

    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("event=server_start module=server status=ok addr={addr}");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("event=server_stop module=server status=ok");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("event=server_signal module=server status=error error={err}");
        std::future::pending::<()>().await;
    }
}
