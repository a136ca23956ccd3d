use crate::{
    config::Config,
    error::Result,
    handlers::root,
    ml::RecommendationEngine,
    routes::api_routes,
    services::{sample_games, RecommendationService},
};
use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use log::{info, warn};
use std::net::TcpListener;
use std::sync::Arc;

pub struct Application {
    port: u16,
    host: String,
    config: Config,
}

impl Application {
    /// Create a new application instance
    pub fn new(config: &Config) -> Self {
        Self {
            port: config.port,
            host: config.host.clone(),
            config: config.clone(),
        }
    }

    /// Build and run the server
    pub async fn run(&self) -> Result<()> {
        let bind_address = format!("{}:{}", self.host, self.port);
        let listener = TcpListener::bind(&bind_address)
            .with_context(|| format!("Failed to bind {}", bind_address))?;
        info!("Starting server at http://{}:{}", self.host, self.port);

        self.run_with_listener(listener).await
    }

    /// Run the server with a specific TCP listener
    /// This is useful for testing where we want to use a random port
    pub async fn run_with_listener(&self, listener: TcpListener) -> Result<()> {
        let recommendation_service = web::Data::new(build_service(&self.config)?);

        HttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header();

            App::new()
                .wrap(cors)
                .wrap(Logger::default())
                .app_data(recommendation_service.clone())
                .service(root)
                .service(api_routes())
        })
        .listen(listener)?
        .run()
        .await?;

        Ok(())
    }
}

/// Creates the shared engine and, when configured, trains it on the sample
/// catalog so the service can answer right away.
pub fn build_service(config: &Config) -> Result<RecommendationService> {
    let engine = Arc::new(RecommendationEngine::new(config.n_neighbors));

    if config.seed_sample_catalog {
        let games = sample_games();
        info!("Seeding model with {} sample games", games.len());
        engine
            .train(games, None)
            .context("Failed to train on the sample catalog")?;
    } else {
        warn!("No catalog loaded, the model stays untrained until /api/admin/train is called");
    }

    Ok(RecommendationService::new(engine))
}
