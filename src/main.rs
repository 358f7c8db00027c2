mod actor_framework;
mod api;
mod app_system;
mod clients;
mod domain;
mod inventory;
mod notifications;
mod order_actor;
mod order_number;
mod pricing;
mod product_actor;
mod queries;
mod user_actor;

#[cfg(test)]
mod integration_tests;
#[cfg(test)]
mod mock_framework;

use tokio::net::TcpListener;
use tracing::{error, info};

use crate::app_system::{setup_tracing, AppConfig, OrderSystem, SystemError};

#[tokio::main]
async fn main() -> Result<(), SystemError> {
    dotenv::dotenv().ok();

    // Setup tracing once for the entire application
    setup_tracing();

    let config = AppConfig::from_env();
    info!(port = config.http_port, "Starting Velvet Hair order service");

    let system = OrderSystem::new(&config);
    system.ensure_admin(&config.admin_email).await?;
    if config.seed_demo_data {
        system.seed_demo_data().await?;
    }

    let app = api::router(system.api_state());
    let listener = TcpListener::bind(("0.0.0.0", config.http_port)).await?;
    info!(addr = %listener.local_addr()?, "Listening");

    let served = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await;
    if let Err(e) = &served {
        error!(error = %e, "Server stopped with an error");
    }

    // Shutdown system gracefully
    system.shutdown().await?;
    served?;

    info!("Application completed successfully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
