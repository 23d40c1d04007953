use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
    thread,
    time::Duration,
};

use darkroom_common::{sensor::parse_w1_slave, SensorError, TemperatureCell};
use tracing::{debug, info, warn};

use crate::{
    error::Shutdown,
    hal::{Clock, TemperatureProbe},
    tasks::{sleep_observing, TaskRegistry},
};

const CRC_RETRIES: usize = 5;
const CRC_RETRY_DELAY: Duration = Duration::from_millis(200);

pub fn spawn_sampler(
    tasks: &TaskRegistry,
    mut probe: Box<dyn TemperatureProbe>,
    cell: TemperatureCell,
    clock: Arc<dyn Clock>,
    shutdown: Shutdown,
    interval_ms: u64,
) -> std::io::Result<()> {
    tasks.spawn("temperature-sampler", move || {
        let mut last_error: Option<SensorError> = None;
        loop {
            if shutdown.is_requested() {
                break;
            }

            match probe.read_celsius() {
                Ok(reading) => {
                    if last_error.take().is_some() {
                        info!("temperature probe recovered: {reading:.1} C");
                    }
                    cell.publish(Some(reading));
                }
                Err(err) => {
                    if last_error.as_ref() != Some(&err) {
                        warn!("temperature probe unavailable: {err:#}");
                    } else {
                        debug!("temperature probe still unavailable: {err}");
                    }
                    last_error = Some(err);
                    cell.publish(None);
                }
            }

            if !sleep_observing(clock.as_ref(), &shutdown, interval_ms) {
                break;
            }
        }
        debug!("temperature sampler stopped");
    })
}

pub struct W1Probe {
    devices_dir: PathBuf,
    device: Option<PathBuf>,
    shutdown: Shutdown,
}

impl W1Probe {
    pub fn new(devices_dir: impl Into<PathBuf>, shutdown: Shutdown) -> Self {
        Self {
            devices_dir: devices_dir.into(),
            device: None,
            shutdown,
        }
    }

    pub fn is_present(devices_dir: &Path) -> bool {
        find_device(devices_dir).is_ok()
    }

    fn report_path(&mut self) -> Result<PathBuf, SensorError> {
        if let Some(device) = &self.device {
            if device.exists() {
                return Ok(device.join("w1_slave"));
            }
        }
        let device = find_device(&self.devices_dir)?;
        info!("using 1-wire probe {}", device.display());
        let report = device.join("w1_slave");
        self.device = Some(device);
        Ok(report)
    }
}

impl TemperatureProbe for W1Probe {
    fn read_celsius(&mut self) -> Result<f32, SensorError> {
        let path = self.report_path()?;
        let mut attempts = 0;
        loop {
            let report =
                fs::read_to_string(&path).map_err(|err| SensorError::Io(err.to_string()))?;
            match parse_w1_slave(&report) {
                Err(SensorError::CrcMismatch)
                    if attempts < CRC_RETRIES && !self.shutdown.is_requested() =>
                {
                    attempts += 1;
                    thread::sleep(CRC_RETRY_DELAY);
                }
                other => return other,
            }
        }
    }
}

fn find_device(devices_dir: &Path) -> Result<PathBuf, SensorError> {
    let entries = match fs::read_dir(devices_dir) {
        Ok(entries) => entries,
        Err(_) => return Err(SensorError::NotFound),
    };
    let mut devices: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .filter(|entry| entry.file_name().to_string_lossy().starts_with("28"))
        .map(|entry| entry.path())
        .collect();
    devices.sort();
    devices.into_iter().next().ok_or(SensorError::NotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{hal::SystemClock, testkit::FixedProbe};

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "darkroom-w1-{name}-{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn w1_probe_reads_first_thermometer() {
        let dir = scratch_dir("read");
        fs::create_dir_all(dir.join("w1_bus_master1")).unwrap();
        let device = dir.join("28-000005e2fdc3");
        fs::create_dir_all(&device).unwrap();
        fs::write(
            device.join("w1_slave"),
            "72 01 4b 46 7f ff 0e 10 57 : crc=57 YES\n72 01 4b 46 7f ff 0e 10 57 t=23125\n",
        )
        .unwrap();

        let mut probe = W1Probe::new(&dir, Shutdown::new());
        assert!(W1Probe::is_present(&dir));
        assert_eq!(probe.read_celsius(), Ok(23.125));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn w1_probe_without_sensor_is_not_found() {
        let dir = scratch_dir("empty");
        let mut probe = W1Probe::new(&dir, Shutdown::new());
        assert_eq!(probe.read_celsius(), Err(SensorError::NotFound));
        assert!(!W1Probe::is_present(&dir));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn persistent_crc_failure_gives_up() {
        let dir = scratch_dir("crc");
        let device = dir.join("28-0000");
        fs::create_dir_all(&device).unwrap();
        fs::write(device.join("w1_slave"), "00 : crc=00 NO\n00 t=1000\n").unwrap();

        let shutdown = Shutdown::new();
        shutdown.request();
        let mut probe = W1Probe::new(&dir, shutdown);
        assert_eq!(probe.read_celsius(), Err(SensorError::CrcMismatch));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn sampler_publishes_and_clears_readings() {
        let tasks = TaskRegistry::new();
        let cell = TemperatureCell::new();
        let shutdown = Shutdown::new();
        spawn_sampler(
            &tasks,
            Box::new(FixedProbe(Ok(19.5))),
            cell.clone(),
            Arc::new(SystemClock),
            shutdown.clone(),
            100,
        )
        .unwrap();

        thread::sleep(Duration::from_millis(150));
        assert_eq!(cell.current_reading(), Some(19.5));
        shutdown.request();
        assert!(tasks.join_all(Duration::from_secs(1)).is_empty());

        let missing = Shutdown::new();
        spawn_sampler(
            &tasks,
            Box::new(FixedProbe(Err(SensorError::NotFound))),
            cell.clone(),
            Arc::new(SystemClock),
            missing.clone(),
            100,
        )
        .unwrap();
        thread::sleep(Duration::from_millis(150));
        assert_eq!(cell.current_reading(), None);
        missing.request();
        assert!(tasks.join_all(Duration::from_secs(1)).is_empty());
    }
}
