use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_DATABASE_URL: &str = "sqlite:///tmp/holocron.db?mode=rwc";
pub const DEFAULT_PORT: u16 = 3000;

#[derive(Deserialize, Serialize, Default, Debug, Clone, PartialEq)]
pub struct Configuration {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub seed: Seed,
}

impl Configuration {
    /// Reads `path` as TOML. A missing file yields the defaults so the server
    /// can start with nothing but environment variables.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::info!(
                "No configuration file at {}, using defaults",
                path.display()
            );
            return Ok(Self::default());
        }
        let config = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let cfg: Self = toml::from_str(&config)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(cfg)
    }

    /// Command line / environment values win over the file.
    pub fn with_overrides(mut self, database_url: Option<String>, port: Option<u16>) -> Self {
        if let Some(url) = database_url {
            self.database.url = url;
        }
        if let Some(port) = port {
            self.server.port = port;
        }
        self
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct DatabaseConfig {
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        DatabaseConfig {
            url: DEFAULT_DATABASE_URL.to_string(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ServerSection {
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        ServerSection { port: DEFAULT_PORT }
    }
}

/// Records inserted the first time the schema is created.
#[derive(Deserialize, Serialize, Default, Debug, Clone, PartialEq)]
pub struct Seed {
    #[serde(default)]
    pub planets: Vec<SeedPlanet>,
    #[serde(default)]
    pub people: Vec<SeedPerson>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct SeedPlanet {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct SeedPerson {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub eyes_color: Option<String>,
    #[serde(default)]
    pub hair_color: Option<String>,
}
