//! Subcommand implementations

use std::path::Path;

use ordo_core::config::EngineConfig;
use ordo_engine::OrderingEngine;
use ordo_store::{Family, SqliteStore};

pub mod inspect;
pub mod parent;
pub mod record;

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// The engine every subcommand runs against
pub struct Context {
    pub engine: OrderingEngine<SqliteStore>,
}

impl Context {
    pub fn open(
        db: &Path,
        config: Option<&Path>,
        family: &str,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let config = match config {
            Some(path) => EngineConfig::load(path)?,
            None => EngineConfig::default(),
        };
        let family: Family = family.parse()?;

        if let Some(dir) = db.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }

        let store = SqliteStore::open(db, family, &config)?;
        let engine = OrderingEngine::new(store, config)?;
        Ok(Self { engine })
    }
}
