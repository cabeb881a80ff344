use log::*;
use migration::{Migrator, MigratorTrait};
use service::{config::Config, logging::Logger, AppState};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let config = Config::new();
    if let Err(e) = Logger::init_logger(&config) {
        eprintln!("Failed to initialize logging: {e}");
    }

    info!("Starting up EduGen Platform API [{}]...", config.runtime_env());

    if !config.jwt_secret_is_acceptable() {
        error!("JWT_SECRET must be set to a non-default value in production");
        std::process::exit(1);
    }

    let db = match service::init_database(&config).await {
        Ok(db) => Arc::new(db),
        Err(e) => {
            error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = Migrator::up(db.as_ref(), None).await {
        error!("Failed to apply database migrations: {e}");
        std::process::exit(1);
    }

    let app_state = AppState::new(config, &db);

    if let Err(e) = web::init_server(app_state).await {
        error!("Server stopped: {e}");
        std::process::exit(1);
    }
}
