use actix_web::{web, Scope};

use crate::handlers::{
    admin_config, games_config, health_check, model_info, recommendations_config,
};

/// Configure all routes for the API
pub fn api_routes() -> Scope {
    web::scope("/api")
        .service(health_check)
        .service(model_info)
        .configure(recommendations_config)
        .configure(games_config)
        .configure(admin_config)
}
