use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use eta_dashboard::{config::DashboardConfig, model, server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "eta_dashboard=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = DashboardConfig::from_env().context("invalid dashboard configuration")?;

    // Load before binding; the handle is never reloaded.
    let mdl = model::load(&cfg.model_path, cfg.meta_path.as_deref())
        .with_context(|| format!("failed to load model {}", cfg.model_path.display()))?;

    let app = server::router(server::AppState::new(mdl, cfg.log_predictions));

    let addr = cfg.socket_addr();
    tracing::info!("listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
