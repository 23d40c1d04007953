use std::sync::{Arc, Mutex, PoisonError};

use darkroom_common::{HeaterAction, HeaterConfig, HeaterEngine, TemperatureCell};
use tracing::{debug, info, warn};

use crate::{
    error::Shutdown,
    hal::{Clock, Relay},
    tasks::{sleep_observing, TaskRegistry},
};

pub type SharedRelay = Arc<Mutex<Box<dyn Relay>>>;

pub fn shared_relay(relay: Box<dyn Relay>) -> SharedRelay {
    Arc::new(Mutex::new(relay))
}

pub fn spawn_heater_loop(
    tasks: &TaskRegistry,
    relay: SharedRelay,
    cell: TemperatureCell,
    config: HeaterConfig,
    clock: Arc<dyn Clock>,
    shutdown: Shutdown,
) -> std::io::Result<()> {
    let interval_ms = config.interval_ms;
    tasks.spawn("heater", move || {
        let mut engine = HeaterEngine::new(config);
        loop {
            if shutdown.is_requested() {
                break;
            }
            let reading = cell.current_reading();
            if let Some(action) = engine.update(reading) {
                match reading {
                    Some(temp) => info!("heater {action:?} at {temp:.1} C"),
                    None => info!("heater {action:?}: no temperature reading"),
                }
                apply(&relay, action);
            }
            if !sleep_observing(clock.as_ref(), &shutdown, interval_ms) {
                break;
            }
        }
        if let Some(action) = engine.force_off() {
            apply(&relay, action);
        }
        debug!("heater loop stopped");
    })
}

pub fn force_off(relay: &SharedRelay) {
    apply(relay, HeaterAction::DeEnergize);
}

pub fn release(relay: &SharedRelay) {
    let mut relay = relay.lock().unwrap_or_else(PoisonError::into_inner);
    if let Err(err) = relay.release() {
        warn!("failed to release heater relay: {err:#}");
    }
}

fn apply(relay: &SharedRelay, action: HeaterAction) {
    let energized = action == HeaterAction::Energize;
    let mut relay = relay.lock().unwrap_or_else(PoisonError::into_inner);
    if let Err(err) = relay.set_energized(energized) {
        warn!("failed to switch heater relay: {err:#}");
    }
}

#[cfg(test)]
mod tests {
    use std::{thread, time::Duration};

    use super::*;
    use crate::{hal::SystemClock, testkit::RecordingRelay};

    fn start(
        cell: &TemperatureCell,
        config: HeaterConfig,
    ) -> (RecordingRelay, TaskRegistry, Shutdown) {
        let recorder = RecordingRelay::new();
        let tasks = TaskRegistry::new();
        let shutdown = Shutdown::new();
        spawn_heater_loop(
            &tasks,
            shared_relay(Box::new(recorder.clone())),
            cell.clone(),
            config,
            Arc::new(SystemClock),
            shutdown.clone(),
        )
        .unwrap();
        (recorder, tasks, shutdown)
    }

    fn fast() -> HeaterConfig {
        HeaterConfig {
            interval_ms: 100,
            ..HeaterConfig::default()
        }
    }

    #[test]
    fn cold_bath_energizes_then_teardown_switches_off() {
        let cell = TemperatureCell::new();
        cell.publish(Some(18.0));
        let (relay, tasks, shutdown) = start(&cell, fast());

        thread::sleep(Duration::from_millis(150));
        assert_eq!(relay.states(), vec![true]);

        shutdown.request();
        assert!(tasks.join_all(Duration::from_secs(1)).is_empty());
        assert_eq!(relay.states(), vec![true, false]);
    }

    #[test]
    fn lost_reading_de_energizes() {
        let cell = TemperatureCell::new();
        cell.publish(Some(19.0));
        let (relay, tasks, shutdown) = start(&cell, fast());

        thread::sleep(Duration::from_millis(150));
        cell.publish(None);
        thread::sleep(Duration::from_millis(250));
        assert_eq!(relay.states(), vec![true, false]);

        shutdown.request();
        assert!(tasks.join_all(Duration::from_secs(1)).is_empty());
        assert_eq!(relay.states(), vec![true, false]);
    }

    #[test]
    fn warm_bath_never_switches() {
        let cell = TemperatureCell::new();
        cell.publish(Some(20.5));
        let (relay, tasks, shutdown) = start(&cell, fast());

        thread::sleep(Duration::from_millis(250));
        shutdown.request();
        assert!(tasks.join_all(Duration::from_secs(1)).is_empty());
        assert!(relay.states().is_empty());
    }
}
