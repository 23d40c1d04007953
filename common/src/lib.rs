pub mod config;
pub mod develop;
pub mod encoder;
pub mod heater;
pub mod indicator;
pub mod screen;
pub mod sensor;
pub mod sequencer;
pub mod signals;
pub mod timer;
pub mod types;

pub use config::{
    DevelopConfig, HeaterConfig, PinConfig, ProcessConfig, RuntimeConfig, TimingConfig,
};
pub use develop::{DevelopDial, DevelopSettings, DialStep, PushPullOption};
pub use heater::{HeaterAction, HeaterEngine};
pub use sensor::SensorError;
pub use sequencer::{Progress, SequenceError, StageSequencer};
pub use signals::{CycleToken, PauseState, SignalSnapshot, TemperatureCell};
pub use timer::{LongPress, TimerEvent, TimerPhase, TimerSession};
pub use types::{Button, Stage};
