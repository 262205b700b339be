use serde::{Deserialize, Serialize};

use std::{env, fs, path::Path};

const DEFAULT_PORT: u16 = 5000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
    pub database_dsn: String,
    pub jwt_secret: String,
    #[serde(default)]
    pub environment: Environment,
}

const fn default_port() -> u16 {
    DEFAULT_PORT
}

pub fn parse_config(contents: &str) -> Result<Config, Box<dyn std::error::Error>> {
    let config: Config = serde_yaml::from_str(contents)?;

    if config.jwt_secret.is_empty() {
        return Err("jwt_secret must not be empty".into());
    }

    Ok(config)
}

/// Placeholder secret shipped in `config.example.yaml`.
const EXAMPLE_SECRET: &str = "change-me";

/// A config file found on disk, with its contents.
#[derive(Debug)]
enum ConfigFile {
    Chosen(String),
    Example(String),
}

fn env_lookup(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.is_empty())
}

/// Applies `PORT`, `PG_DSN`, `JWT_SECRET` and `APP_ENV` on top of `config`
/// when they are set.
fn apply_env_overrides(
    mut config: Config,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Config, Box<dyn std::error::Error>> {
    if let Some(port) = lookup("PORT") {
        config.port = port
            .parse::<u16>()
            .map_err(|e| format!("Failed to parse PORT: {e}"))?;
    }
    if let Some(database_dsn) = lookup("PG_DSN") {
        config.database_dsn = database_dsn;
    }
    if let Some(jwt_secret) = lookup("JWT_SECRET") {
        config.jwt_secret = jwt_secret;
    }
    if let Some(environment) = lookup("APP_ENV") {
        config.environment = Environment::parse(&environment);
    }

    Ok(config)
}

fn load_from_env(
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Config, Box<dyn std::error::Error>> {
    let base = Config {
        port: DEFAULT_PORT,
        database_dsn: lookup("PG_DSN").ok_or("PG_DSN environment variable is required")?,
        jwt_secret: lookup("JWT_SECRET").ok_or("JWT_SECRET environment variable is required")?,
        environment: Environment::default(),
    };

    apply_env_overrides(base, lookup)
}

fn assemble(
    file: Option<ConfigFile>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Config, Box<dyn std::error::Error>> {
    let production =
        lookup("APP_ENV").is_some_and(|value| Environment::parse(&value).is_production());

    match file {
        Some(ConfigFile::Chosen(contents)) => apply_env_overrides(parse_config(&contents)?, lookup),
        Some(ConfigFile::Example(_)) if production => {
            tracing::warn!("Ignoring 'config.example.yaml' in production");
            load_from_env(lookup)
        }
        Some(ConfigFile::Example(contents)) => {
            let config = apply_env_overrides(parse_config(&contents)?, lookup)?;

            if config.environment.is_production() {
                return Err("config.example.yaml must not be used in production".into());
            }
            if config.jwt_secret == EXAMPLE_SECRET {
                return Err(
                    "jwt_secret is still the example placeholder; set JWT_SECRET or provide config.yaml"
                        .into(),
                );
            }

            Ok(config)
        }
        None => load_from_env(lookup),
    }
}

fn find_config_file() -> Result<Option<ConfigFile>, Box<dyn std::error::Error>> {
    // Retrieve env variable
    let config_path = env::var("NOTES_API_CONFIG").unwrap_or_else(|_| "config.yaml".to_string());

    // Try env path
    if Path::new(&config_path).exists() {
        return Ok(Some(ConfigFile::Chosen(fs::read_to_string(&config_path)?)));
    }

    // Fallback to config.yaml
    if Path::new("config.yaml").exists() {
        tracing::warn!(
            "Config file '{}' not found, falling back to 'config.yaml'",
            config_path
        );
        return Ok(Some(ConfigFile::Chosen(fs::read_to_string("config.yaml")?)));
    }

    // Fallback to config.example.yaml
    if Path::new("config.example.yaml").exists() {
        tracing::warn!(
            "Config file '{}' and 'config.yaml' not found, falling back to 'config.example.yaml'\
             \n This file should not be used and should be replaced with actual data",
            config_path
        );
        return Ok(Some(ConfigFile::Example(fs::read_to_string(
            "config.example.yaml",
        )?)));
    }

    tracing::info!("No config file found, loading configuration from environment variables");
    Ok(None)
}

/// Reads the config file, if any, then applies environment variables on top.
pub fn load_config() -> Result<Config, Box<dyn std::error::Error>> {
    let file = find_config_file()?;

    assemble(file, env_lookup).map_err(|e| {
        format!(
            "Configuration is incomplete. Tried: NOTES_API_CONFIG, 'config.yaml', \
             'config.example.yaml', and environment variables. Error: {e}"
        )
        .into()
    })
}
