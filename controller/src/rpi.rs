use std::{
    sync::{
        atomic::{AtomicBool, AtomicI32, Ordering},
        Arc, Mutex, PoisonError,
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use anyhow::Context;
use darkroom_common::{encoder::QuadratureDecoder, screen, Button, PinConfig, RuntimeConfig};
use rppal::{
    gpio::{Gpio, InputPin, OutputPin},
    i2c::I2c,
};
use tracing::{debug, info, warn};

use crate::{
    error::{HardwareError, Shutdown},
    hal::{Display, Hardware, Input, Led, LedBank, Relay},
    sampler::W1Probe,
};

const PWM_FREQUENCY_HZ: f64 = 200.0;
const ENCODER_POLL: Duration = Duration::from_millis(1);

pub fn open(config: &RuntimeConfig, shutdown: &Shutdown) -> anyhow::Result<Hardware> {
    let pins = &config.pins;
    let gpio = Gpio::new().context("failed to open GPIO")?;

    let input = GpioInput::open(&gpio, pins).context("failed to set up buttons and encoder")?;
    let leds = LedBank {
        blue: Arc::new(PwmLed::open(&gpio, pins.blue_led).context("blue led")?),
        yellow: Arc::new(GpioLed::open(&gpio, pins.yellow_led).context("yellow led")?),
        green: Arc::new(GpioLed::open(&gpio, pins.green_led).context("green led")?),
    };
    let relay = GpioRelay::open(&gpio, pins.heater_relay).context("heater relay")?;
    let display = Lcd::open(pins.lcd_i2c_address).context("failed to set up LCD")?;

    info!("raspberry pi hardware ready");
    Ok(Hardware {
        display: Box::new(display),
        input: Box::new(input),
        leds,
        relay: Box::new(relay),
        probe: Box::new(W1Probe::new(&pins.w1_devices_dir, shutdown.clone())),
    })
}

fn gpio_err(err: rppal::gpio::Error) -> HardwareError {
    HardwareError::Gpio(err.to_string())
}

fn i2c_err(err: rppal::i2c::Error) -> HardwareError {
    HardwareError::Bus(err.to_string())
}

struct GpioInput {
    buttons: [InputPin; 4],
    knob: InputPin,
    steps: Arc<AtomicI32>,
    stop: Arc<AtomicBool>,
    decoder: Option<JoinHandle<()>>,
}

impl GpioInput {
    fn open(gpio: &Gpio, pins: &PinConfig) -> Result<Self, HardwareError> {
        let pullup = |pin: u8| -> Result<InputPin, HardwareError> {
            Ok(gpio.get(pin).map_err(gpio_err)?.into_input_pullup())
        };
        let [one, two, three, four] = pins.buttons;
        let buttons = [pullup(one)?, pullup(two)?, pullup(three)?, pullup(four)?];
        let knob = pullup(pins.encoder_button)?;
        let a = pullup(pins.encoder_a)?;
        let b = pullup(pins.encoder_b)?;

        let steps = Arc::new(AtomicI32::new(0));
        let stop = Arc::new(AtomicBool::new(false));
        let decoder = {
            let steps = steps.clone();
            let stop = stop.clone();
            thread::Builder::new()
                .name("encoder".to_string())
                .spawn(move || {
                    let mut decoder = QuadratureDecoder::new(a.is_high(), b.is_high());
                    while !stop.load(Ordering::Relaxed) {
                        let step = decoder.update(a.is_high(), b.is_high());
                        if step != 0 {
                            steps.fetch_add(step, Ordering::Relaxed);
                        }
                        thread::sleep(ENCODER_POLL);
                    }
                })?
        };

        Ok(Self {
            buttons,
            knob,
            steps,
            stop,
            decoder: Some(decoder),
        })
    }
}

impl Input for GpioInput {
    fn button_pressed(&mut self, button: Button) -> bool {
        self.buttons[button.index()].is_low()
    }

    fn encoder_delta(&mut self) -> i32 {
        self.steps.swap(0, Ordering::Relaxed)
    }

    fn encoder_pressed(&mut self) -> bool {
        self.knob.is_low()
    }

    fn release(&mut self) -> Result<(), HardwareError> {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(decoder) = self.decoder.take() {
            if decoder.join().is_err() {
                return Err(HardwareError::Gpio("encoder thread panicked".to_string()));
            }
        }
        Ok(())
    }
}

struct GpioLed {
    pin: Mutex<OutputPin>,
}

impl GpioLed {
    fn open(gpio: &Gpio, pin: u8) -> Result<Self, HardwareError> {
        let pin = gpio.get(pin).map_err(gpio_err)?.into_output_low();
        Ok(Self {
            pin: Mutex::new(pin),
        })
    }
}

impl Led for GpioLed {
    fn set_level(&self, level: f32) {
        let mut pin = self.pin.lock().unwrap_or_else(PoisonError::into_inner);
        if level > 0.0 {
            pin.set_high();
        } else {
            pin.set_low();
        }
    }

    fn release(&self) -> Result<(), HardwareError> {
        self.pin
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .set_low();
        Ok(())
    }
}

struct PwmLed {
    pin: Mutex<OutputPin>,
}

impl PwmLed {
    fn open(gpio: &Gpio, pin: u8) -> Result<Self, HardwareError> {
        let pin = gpio.get(pin).map_err(gpio_err)?.into_output_low();
        Ok(Self {
            pin: Mutex::new(pin),
        })
    }
}

impl Led for PwmLed {
    fn set_level(&self, level: f32) {
        let mut pin = self.pin.lock().unwrap_or_else(PoisonError::into_inner);
        let level = f64::from(level.clamp(0.0, 1.0));
        let result = if level <= 0.0 {
            pin.clear_pwm().map(|()| pin.set_low())
        } else {
            pin.set_pwm_frequency(PWM_FREQUENCY_HZ, level)
        };
        if let Err(err) = result {
            debug!("blue led pwm update failed: {err}");
        }
    }

    fn release(&self) -> Result<(), HardwareError> {
        let mut pin = self.pin.lock().unwrap_or_else(PoisonError::into_inner);
        pin.clear_pwm().map_err(gpio_err)?;
        pin.set_low();
        Ok(())
    }
}

struct GpioRelay {
    pin: OutputPin,
}

impl GpioRelay {
    fn open(gpio: &Gpio, pin: u8) -> Result<Self, HardwareError> {
        Ok(Self {
            pin: gpio.get(pin).map_err(gpio_err)?.into_output_low(),
        })
    }
}

impl Relay for GpioRelay {
    fn set_energized(&mut self, energized: bool) -> Result<(), HardwareError> {
        if energized {
            self.pin.set_high();
        } else {
            self.pin.set_low();
        }
        Ok(())
    }

    fn release(&mut self) -> Result<(), HardwareError> {
        self.pin.set_low();
        Ok(())
    }
}

const LCD_BACKLIGHT: u8 = 0x08;
const LCD_ENABLE: u8 = 0x04;
const LCD_REGISTER_SELECT: u8 = 0x01;
const LCD_CLEAR: u8 = 0x01;
const LCD_ROW_ADDRESSES: [u8; screen::LCD_ROWS] = [0x80, 0xC0, 0x94, 0xD4];

struct Lcd {
    bus: I2c,
}

impl Lcd {
    fn open(address: u16) -> Result<Self, HardwareError> {
        let mut bus = I2c::new().map_err(i2c_err)?;
        bus.set_slave_address(address).map_err(i2c_err)?;
        let mut lcd = Self { bus };

        for nibble in [0x30, 0x30, 0x30, 0x20] {
            lcd.write_nibble(nibble)?;
            thread::sleep(Duration::from_millis(5));
        }
        // 4-bit, two lines, 5x8 font; display on, cursor off; left to right.
        for command in [0x28, 0x0C, LCD_CLEAR, 0x06] {
            lcd.command(command)?;
        }
        thread::sleep(Duration::from_millis(2));
        Ok(lcd)
    }

    fn write_nibble(&mut self, nibble: u8) -> Result<(), HardwareError> {
        let data = nibble | LCD_BACKLIGHT;
        self.bus.write(&[data]).map_err(i2c_err)?;
        self.bus.write(&[data | LCD_ENABLE]).map_err(i2c_err)?;
        thread::sleep(Duration::from_micros(500));
        self.bus.write(&[data & !LCD_ENABLE]).map_err(i2c_err)?;
        thread::sleep(Duration::from_micros(100));
        Ok(())
    }

    fn send(&mut self, byte: u8, mode: u8) -> Result<(), HardwareError> {
        self.write_nibble(mode | (byte & 0xF0))?;
        self.write_nibble(mode | ((byte << 4) & 0xF0))
    }

    fn command(&mut self, command: u8) -> Result<(), HardwareError> {
        self.send(command, 0)
    }
}

impl Display for Lcd {
    fn write_line(&mut self, line: u8, text: &str) -> Result<(), HardwareError> {
        let address = usize::from(line)
            .checked_sub(1)
            .and_then(|index| LCD_ROW_ADDRESSES.get(index))
            .copied()
            .ok_or_else(|| HardwareError::Bus(format!("no display line {line}")))?;
        self.command(address)?;
        for ch in screen::fit_line(text).chars() {
            let byte = if ch.is_ascii() { ch as u8 } else { b'?' };
            self.send(byte, LCD_REGISTER_SELECT)?;
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<(), HardwareError> {
        self.command(LCD_CLEAR)?;
        thread::sleep(Duration::from_millis(2));
        Ok(())
    }

    fn release(&mut self) -> Result<(), HardwareError> {
        self.clear()?;
        if let Err(err) = self.command(0x08) {
            warn!("failed to switch LCD off: {err:#}");
        }
        // Backlight off.
        self.bus.write(&[0x00]).map_err(i2c_err)?;
        Ok(())
    }
}
