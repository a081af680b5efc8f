//! Register-level model of the ADXL345 3-axis accelerometer.
//!
//! The model answers raw bus transactions the way the silicon does: a write
//! sets the register pointer (and optionally writes data), a read returns
//! bytes from the pointed register and auto-increments the pointer. Samples
//! are injected through a [SampleFeeder] and read back through the six
//! DATAX0..DATAZ1 registers.

mod conf;
mod error;
mod feed;
mod fifo;
mod register;
mod sample;

pub mod bus;
pub mod loader;
pub mod master;

use std::collections::VecDeque;

pub use accelerometer::{vector::I16x3, RawAccelerometer};

pub use conf::*;
pub use error::Error;
pub use feed::SampleFeeder;
pub use fifo::{Refill, SampleQueue};
pub use register::{Register, REGISTER_COUNT};
pub use sample::{encode, Sample, SAMPLE_BYTES};

use bus::{I2cBus, I2cPeripheral};

/// Value of the DEVID register
pub const DEVICE_ID: u8 = 0xE5;

/// ADXL345 model
#[derive(Debug)]
pub struct Adxl345 {
    config: Config,
    register: u8,
    data_format: DataFormat,
    raw_data: VecDeque<u8>,
    samples: SampleQueue,
}

impl Default for Adxl345 {
    fn default() -> Self {
        Adxl345::new()
    }
}

impl Adxl345 {
    pub fn new() -> Self {
        Adxl345::with_config(Config::default())
    }

    /// Takes a config object to initialize the model
    pub fn with_config(config: Config) -> Self {
        Adxl345 {
            config,
            register: 0,
            data_format: DataFormat::default(),
            raw_data: VecDeque::with_capacity(SAMPLE_BYTES),
            samples: SampleQueue::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Control-plane handle sharing this device's sample queue
    pub fn feeder(&self) -> SampleFeeder {
        SampleFeeder::new(self.samples.clone())
    }

    /// Current register pointer, as last written or incremented
    pub fn register(&self) -> u8 {
        self.register
    }

    pub fn data_format(&self) -> DataFormat {
        self.data_format
    }

    /// FIFO depth as reported over the bus
    pub fn fifo_status(&self) -> u8 {
        self.samples
            .depth()
            .min(self.config.max_fifo_depth)
            .min(u8::MAX as usize) as u8
    }

    /// Attach the model to a simulated bus at the configured address
    pub fn into_bus(self) -> I2cBus<Adxl345> {
        let address = self.config.i2c_address;
        I2cBus::new(self, address)
    }

    /// Return to power-on defaults. Queued samples, streaming and the
    /// buffered sample source are dropped as well.
    pub fn reset(&mut self) {
        self.register = 0;
        self.data_format = DataFormat::default();
        self.raw_data.clear();
        self.samples.clear();
    }

    /// Handle a bus write. `data[0]` becomes the register pointer; any further
    /// bytes are written to that register. An address-only write to DATAX0
    /// latches the next queued sample into the data registers.
    pub fn write(&mut self, data: &[u8]) {
        let Some((&register, payload)) = data.split_first() else {
            log::warn!("Write with no data");
            return;
        };

        log::trace!("Write with {} bytes of data", data.len());
        self.register = register;
        log::trace!("Setting register pointer to {register:#04x}");

        if !payload.is_empty() {
            self.handle_register_write(register, payload);
        } else if Register::from_addr(register) == Some(Register::DATA_X0) {
            self.latch_sample();
        }
    }

    /// Handle a bus read of `count` bytes from the current register.
    ///
    /// DEVID and FIFO_STATUS answer with a single byte, the data registers with
    /// `count` bytes (zero once the latched sample is drained) and every other
    /// register with nothing. The pointer then advances by one, wrapping at 0x40.
    pub fn read(&mut self, count: usize) -> Vec<u8> {
        let register = Register::from_addr(self.register);
        log::trace!("Reading {count} bytes from register {:#04x} - {register:?}", self.register);

        let result = match register {
            Some(Register::DEVID) => vec![DEVICE_ID],
            Some(r) if r.is_axis_data() => (0..count)
                .map(|_| self.raw_data.pop_front().unwrap_or(0))
                .collect(),
            Some(Register::FIFO_STATUS) => vec![self.fifo_status()],
            _ => {
                log::warn!(
                    "Reading from an unsupported or not-yet-implemented register: {:#04x} - {register:?}",
                    self.register
                );
                Vec::new()
            }
        };

        self.register = ((self.register as u16 + 1) % REGISTER_COUNT as u16) as u8;
        log::trace!("Auto-incrementing to register {:#04x}", self.register);
        log::trace!("Read result: {result:02x?}");
        result
    }

    fn handle_register_write(&mut self, register: u8, data: &[u8]) {
        log::trace!("Writing {data:02x?} to register {register:#04x}");

        match Register::from_addr(register) {
            Some(Register::DATA_FORMAT) => {
                self.data_format = DataFormat::from_register(data[0]);
                log::debug!("Data format set to {:?}", self.data_format);
            }
            r => {
                log::warn!(
                    "Writing to an unsupported or not-yet-implemented register: {register:#04x} - {r:?}"
                );
            }
        }
    }

    // The burst is rebuilt before a refill triggered by this pop runs
    fn latch_sample(&mut self) {
        let raw_data = &mut self.raw_data;
        let format = self.data_format;
        let latched = self.samples.pop_with(|sample| {
            log::trace!("Latching sample {sample}");
            raw_data.clear();
            raw_data.extend(sample.encode(format));
        });

        if latched.is_none() {
            log::warn!("Reading from DATA_X0 register, but there are no samples");
        }
    }
}

impl I2cPeripheral for Adxl345 {
    fn write(&mut self, data: &[u8]) {
        Adxl345::write(self, data)
    }

    fn read(&mut self, count: usize) -> Vec<u8> {
        Adxl345::read(self, count)
    }

    fn reset(&mut self) {
        Adxl345::reset(self)
    }
}
