include!("../../lib.rs");
use std::net::SocketAddr;
use lambda_http::{run, Error};
use tracing::info;
use crate::utils::logs::setup_tracing;
use crate::catalog::controller::build_router;
use crate::catalog::factory::create_catalog_service;
use crate::core::controller::AppState;
use crate::core::domain::{Configuration, Runtime};

// See https://docs.aws.amazon.com/lambda/latest/dg/lambda-rust.html
// https://docs.aws.amazon.com/lambda/latest/dg/rust-http-events.html

#[tokio::main]
async fn main() -> Result<(), Error> {
    setup_tracing();

    let config = Configuration::from_env()?;
    let catalog = create_catalog_service(&config).await;
    let state = AppState::new(config.clone(), catalog);
    info!(env = config.env.as_str(), store = ?config.store, runtime = ?config.runtime, "starting books service");

    match config.runtime {
        Runtime::Lambda => {
            run(build_router::<lambda_http::Body>(state)).await
        }
        Runtime::Http => {
            let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
            info!("Server is running at http://localhost:{}", config.port);
            axum::Server::bind(&addr)
                .serve(build_router::<axum::body::Body>(state).into_make_service())
                .with_graceful_shutdown(shutdown_signal())
                .await?;
            Ok(())
        }
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutting down books service");
    }
}
