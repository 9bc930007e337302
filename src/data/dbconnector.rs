use crate::data::configuration::Configuration;
use crate::data::migrations::Migrator;
use crate::entity::helpers::{new_person, new_planet};
use crate::entity::{people, planet};
use anyhow::Context;
use log::{debug, info};
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, EntityTrait,
    PaginatorTrait, Statement, TransactionTrait,
};
use sea_orm_migration::MigratorTrait;
use std::time::Duration;

#[allow(async_fn_in_trait)]
pub trait DBConnection {
    async fn connect(&mut self) -> Result<(), anyhow::Error>;
    async fn check(&self) -> Result<(), anyhow::Error>;
    async fn is_initialized(&self) -> Result<bool, anyhow::Error>;
    async fn initialize(&self, config: &Configuration) -> Result<(), anyhow::Error>;
    async fn close(&self) -> Result<(), anyhow::Error>;
}

pub struct SQLConnector {
    url: String,
    database_connection: Option<DatabaseConnection>,
}

impl SQLConnector {
    pub fn new(url: &str) -> Self {
        SQLConnector {
            url: url.to_string(),
            database_connection: None,
        }
    }

    /// The pool, once `connect` has succeeded.
    pub fn connection(&self) -> anyhow::Result<&DatabaseConnection> {
        self.database_connection
            .as_ref()
            .context("database is not connected")
    }

    fn is_memory(&self) -> bool {
        self.url.contains(":memory:") || self.url.contains("mode=memory")
    }

    async fn seed(&self, config: &Configuration) -> anyhow::Result<()> {
        let db = self.connection()?;
        let txn = db.begin().await?;

        if planet::Entity::find().count(&txn).await? == 0 && !config.seed.planets.is_empty() {
            let rows = config
                .seed
                .planets
                .iter()
                .map(|p| new_planet(&p.name, p.description.clone()));
            planet::Entity::insert_many(rows)
                .exec(&txn)
                .await
                .context("failed to seed planets")?;
            info!("Seeded {} planets", config.seed.planets.len());
        }

        if people::Entity::find().count(&txn).await? == 0 && !config.seed.people.is_empty() {
            let rows = config.seed.people.iter().map(|p| {
                new_person(
                    &p.name,
                    p.description.clone(),
                    p.eyes_color.clone(),
                    p.hair_color.clone(),
                )
            });
            people::Entity::insert_many(rows)
                .exec(&txn)
                .await
                .context("failed to seed people")?;
            info!("Seeded {} people", config.seed.people.len());
        }

        txn.commit().await?;
        Ok(())
    }
}

async fn foreign_keys_enabled(db: &DatabaseConnection) -> anyhow::Result<bool> {
    let row = db
        .query_one(Statement::from_string(
            DatabaseBackend::Sqlite,
            "PRAGMA foreign_keys",
        ))
        .await
        .context("failed to read foreign key setting")?
        .context("PRAGMA foreign_keys returned no row")?;
    Ok(row.try_get_by_index::<i32>(0)? == 1)
}

impl DBConnection for SQLConnector {
    async fn connect(&mut self) -> Result<(), anyhow::Error> {
        debug!("Connecting to {}", self.url);
        let mut opt = ConnectOptions::new(self.url.clone());
        opt.connect_timeout(Duration::from_secs(8))
            .acquire_timeout(Duration::from_secs(8))
            .sqlx_logging(true)
            .sqlx_logging_level(log::LevelFilter::Debug);
        // Every pooled connection to an in-memory SQLite database would get
        // its own empty database.
        if self.is_memory() {
            opt.max_connections(1).min_connections(1);
        } else {
            opt.max_connections(10);
        }

        let db = Database::connect(opt)
            .await
            .with_context(|| format!("failed to connect to {}", self.url))?;

        // sqlx turns foreign_keys on for every pooled SQLite connection, and
        // the favorite cascades depend on it.
        if db.get_database_backend() == DatabaseBackend::Sqlite {
            anyhow::ensure!(
                foreign_keys_enabled(&db).await?,
                "SQLite connection has foreign key enforcement disabled"
            );
        }

        self.database_connection = Some(db);
        Ok(())
    }

    async fn check(&self) -> Result<(), anyhow::Error> {
        self.connection()?.ping().await?;
        Ok(())
    }

    async fn is_initialized(&self) -> Result<bool, anyhow::Error> {
        let pending = Migrator::get_pending_migrations(self.connection()?)
            .await
            .context("failed to read migration status")?;
        Ok(pending.is_empty())
    }

    async fn initialize(&self, config: &Configuration) -> Result<(), anyhow::Error> {
        Migrator::up(self.connection()?, None)
            .await
            .context("failed to run migrations")?;
        info!("Database migrations completed");
        self.seed(config).await
    }

    async fn close(&self) -> Result<(), anyhow::Error> {
        if let Some(ref db) = self.database_connection {
            let db = db.clone();
            db.close().await?;
        }
        Ok(())
    }
}
