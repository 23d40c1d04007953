mod app;
mod error;
mod hal;
mod heater;
#[cfg(not(feature = "rpi"))]
mod host;
mod indicators;
mod panel;
#[cfg(feature = "rpi")]
mod rpi;
mod sampler;
mod settings;
mod stage_timer;
mod stages;
mod store;
mod tasks;
#[cfg(test)]
mod testkit;

use crate::{error::Shutdown, store::ConfigStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = ConfigStore::new().effective_config().await;
    let shutdown = Shutdown::new();

    #[cfg(not(feature = "rpi"))]
    let hardware = host::open(&config, &shutdown)?;
    #[cfg(feature = "rpi")]
    let hardware = rpi::open(&config, &shutdown)?;

    app::run(hardware, config, shutdown).await
}
