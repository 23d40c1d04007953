use std::{io::ErrorKind, path::PathBuf};

use anyhow::Context;
use darkroom_common::RuntimeConfig;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct ConfigStore {
    runtime_path: PathBuf,
}

impl ConfigStore {
    pub fn new() -> Self {
        let data_dir = std::env::var("DARKROOM_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./.darkroom"));
        Self::in_dir(data_dir)
    }

    pub fn in_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            runtime_path: data_dir.into().join("runtime.json"),
        }
    }

    pub async fn load_runtime_config(&self) -> anyhow::Result<RuntimeConfig> {
        match tokio::fs::read(&self.runtime_path).await {
            Ok(raw) => RuntimeConfig::from_json(&raw)
                .with_context(|| format!("invalid {}", self.runtime_path.display())),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(RuntimeConfig::default()),
            Err(err) => Err(err)
                .with_context(|| format!("failed to read {}", self.runtime_path.display())),
        }
    }

    /// Stored config with environment overrides applied. Never fails: an
    /// unreadable file falls back to defaults.
    pub async fn effective_config(&self) -> RuntimeConfig {
        let mut runtime = self.load_runtime_config().await.unwrap_or_else(|err| {
            warn!("failed to load runtime config from store: {err:#}");
            RuntimeConfig::default()
        });
        if let Ok(dir) = std::env::var("DARKROOM_W1_DIR") {
            info!("1-wire devices dir overridden: {dir}");
            runtime.pins.w1_devices_dir = dir;
        }
        runtime
    }
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new()
    }
}
