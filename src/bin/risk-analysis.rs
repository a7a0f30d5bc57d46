use actix_web::{web, App, HttpServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crypto_risk_agents::api;
use crypto_risk_agents::app::RiskAnalysisState;
use crypto_risk_agents::model::Config;

const DEFAULT_PORT: u16 = 5000;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present (ignore if missing)
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env(DEFAULT_PORT);
    let bind_addr = config.bind_addr();

    let state = match RiskAnalysisState::from_config(&config) {
        Ok(state) => web::Data::new(state),
        Err(e) => {
            tracing::error!(error = %e, "Risk analysis service cannot start");
            std::process::exit(1);
        }
    };

    tracing::info!("Starting token risk analysis server on {}", bind_addr);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(api::risk::configure)
            .configure(api::openapi::configure_risk)
    })
    .bind(&bind_addr)?
    .run()
    .await
}
