use crate::error::Result;
use serde::Deserialize;

/// Runtime settings, read from `APP_*` environment variables on top of defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Neighbor count reported by the model info endpoint.
    pub n_neighbors: usize,
    /// Train on the built-in sample catalog at startup.
    pub seed_sample_catalog: bool,
}

impl Config {
    pub fn load() -> Result<Self> {
        let settings = config::Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", 8000)?
            .set_default("n_neighbors", 5)?
            .set_default("seed_sample_catalog", true)?
            .add_source(config::Environment::with_prefix("APP").try_parsing(true))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            n_neighbors: 5,
            seed_sample_catalog: true,
        }
    }
}
