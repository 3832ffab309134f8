//! Wraps [`NexusConfig`] in a `parking_lot::RwLock`, loaded once at startup
//! and read by every subsystem thereafter through a simple `start()`/`get()`
//! contract.

use crate::app::config::NexusConfig;
use anyhow::Error;
use parking_lot::{RwLock, RwLockReadGuard};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

pub struct ConfigManager {
    path: PathBuf,
    cfg: RwLock<NexusConfig>,
    started: AtomicBool,
}

impl ConfigManager {
    pub fn new(cfg_path: PathBuf) -> ConfigManager {
        ConfigManager {
            path: cfg_path,
            cfg: RwLock::new(NexusConfig::default()),
            started: AtomicBool::new(false),
        }
    }

    fn reload(&self) -> Result<(), Error> {
        let cfg = NexusConfig::load(&self.path)?;
        cfg.logging.validate()?;
        *self.cfg.write() = cfg;
        Ok(())
    }

    pub fn start(&self) -> Result<(), Error> {
        self.reload()?;
        self.started.store(true, Ordering::Release);
        Ok(())
    }

    pub fn get(&self) -> RwLockReadGuard<'_, NexusConfig> {
        if !self.started.load(Ordering::Acquire) {
            panic!("ConfigManager not started yet but fetching config");
        }
        self.cfg.read()
    }
}
