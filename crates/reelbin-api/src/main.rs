mod api_doc;
mod auth;
mod error;
mod handlers;
mod services;
mod setup;
mod state;
mod telemetry;

use reelbin_core::Config;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Load configuration
    let config = Config::from_env()?;

    telemetry::init_telemetry()?;

    config.validate()?;

    // Initialize the application (database, provider clients, routes)
    let (_state, router) = setup::initialize_app(config.clone()).await?;

    // Start the server
    setup::server::start_server(&config, router).await?;

    Ok(())
}
