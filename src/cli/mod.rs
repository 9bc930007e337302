use crate::data::configuration::Configuration;
use crate::data::dbconnector::{DBConnection, SQLConnector};
use crate::server::{self, AppContext};
use anyhow::Context;
use clap::Parser;
use log::{debug, info};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Port to listen on (default 3000)
    #[arg(short, long, env = "PORT")]
    pub port: Option<u16>,
    /// Database URL, e.g. sqlite:///tmp/holocron.db?mode=rwc
    #[arg(short, long, env = "DATABASE_URL")]
    pub database_url: Option<String>,
    #[arg(short, long, default_value = "configuration.toml")]
    pub configuration_path: PathBuf,
}

impl Args {
    /// File values overlaid with whatever came from the command line or
    /// environment.
    pub fn configuration(&self) -> anyhow::Result<Configuration> {
        let config = Configuration::load(&self.configuration_path)?;
        Ok(config.with_overrides(self.database_url.clone(), self.port))
    }
}

pub async fn run() -> anyhow::Result<()> {
    let args = Args::parse();
    debug!("Configuration path: {}", args.configuration_path.display());

    let config = args.configuration()?;
    debug!("Loaded configuration: {config:?}");

    // Check the database connection
    let mut db_connector = SQLConnector::new(&config.database.url);
    db_connector.connect().await?;
    db_connector.check().await.context("database did not answer ping")?;
    if db_connector.is_initialized().await? {
        info!("Database is initialized");
    } else {
        info!("Database is not initialized, performing initialization");
        db_connector.initialize(&config).await?;
    }

    let context = AppContext::new(db_connector.connection()?.clone());
    server::run(context, config.server.port).await?;

    db_connector.close().await?;
    Ok(())
}
