#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Binary entry point for the turnout prediction API server.
//!
//! Loads both model artifacts and the cleaned dataset at startup; a
//! missing artifact is a clean fatal error with a pointer to training,
//! not a panic mid-request.

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use std::path::PathBuf;
use turnout_server::AppState;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let models_dir = std::env::var("MODELS_DIR").unwrap_or_else(|_| "models".to_string());
    let cleaned_data = std::env::var("CLEANED_DATA")
        .unwrap_or_else(|_| "data/cleaned_elections.csv".to_string());

    let state = match AppState::load(&PathBuf::from(models_dir), &PathBuf::from(cleaned_data)) {
        Ok(state) => web::Data::new(state),
        Err(e) => {
            log::error!("Failed to load server state: {e}");
            std::process::exit(1);
        }
    };

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(turnout_server::configure)
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
