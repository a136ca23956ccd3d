pub mod admin;
pub mod games;
pub mod health;
pub mod model;
pub mod recommendations;

pub use admin::admin_config;
pub use games::games_config;
pub use health::{health_check, root};
pub use model::model_info;
pub use recommendations::recommendations_config;
