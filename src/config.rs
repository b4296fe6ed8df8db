use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: String,
    pub jwt_secret: String,
    pub adzuna_app_id: Option<String>,
    pub adzuna_app_key: Option<String>,
    pub adzuna_base_url: String,
    pub france_travail_client_id: Option<String>,
    pub france_travail_client_secret: Option<String>,
    pub france_travail_base_url: String,
    pub france_travail_token_url: String,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

const ADZUNA_BASE_URL: &str = "https://api.adzuna.com/v1/api/jobs/fr/search/1";
const FRANCE_TRAVAIL_BASE_URL: &str =
    "https://api.francetravail.io/partenaire/offresdemploi/v2/offres/search";
const FRANCE_TRAVAIL_TOKEN_URL: &str =
    "https://entreprise.francetravail.fr/connexion/oauth2/access_token?realm=%2Fpartenaire";

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_address: get_env("SERVER_ADDRESS")?,
            database_url: get_env("DATABASE_URL")?,
            jwt_secret: get_env("JWT_SECRET")?,
            adzuna_app_id: env::var("ADZUNA_APP_ID").ok(),
            adzuna_app_key: env::var("ADZUNA_APP_KEY").ok(),
            adzuna_base_url: env::var("ADZUNA_BASE_URL")
                .unwrap_or_else(|_| ADZUNA_BASE_URL.to_string()),
            france_travail_client_id: env::var("FRANCE_TRAVAIL_CLIENT_ID").ok(),
            france_travail_client_secret: env::var("FRANCE_TRAVAIL_CLIENT_SECRET").ok(),
            france_travail_base_url: env::var("FRANCE_TRAVAIL_BASE_URL")
                .unwrap_or_else(|_| FRANCE_TRAVAIL_BASE_URL.to_string()),
            france_travail_token_url: env::var("FRANCE_TRAVAIL_TOKEN_URL")
                .unwrap_or_else(|_| FRANCE_TRAVAIL_TOKEN_URL.to_string()),
        })
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}
