//! Simulated I2C transport.
//!
//! [I2cBus] binds a register-level peripheral model to a 7-bit address and
//! exposes it through the `embedded-hal` blocking I2C traits, so a driver
//! written for real hardware can talk to the model unchanged.

use embedded_hal::blocking::i2c::{Read, Write, WriteRead};
use thiserror::Error;

/// A peripheral that answers raw bus transactions
pub trait I2cPeripheral {
    /// Handle a write transaction. `data[0]` is the register address.
    fn write(&mut self, data: &[u8]);

    /// Handle a read transaction of `count` bytes. The peripheral may answer
    /// with fewer bytes than requested.
    fn read(&mut self, count: usize) -> Vec<u8>;

    /// Return to power-on state
    fn reset(&mut self);
}

impl<P: I2cPeripheral + ?Sized> I2cPeripheral for &mut P {
    fn write(&mut self, data: &[u8]) {
        (**self).write(data)
    }

    fn read(&mut self, count: usize) -> Vec<u8> {
        (**self).read(count)
    }

    fn reset(&mut self) {
        (**self).reset()
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BusError {
    #[error("no device acknowledged address {0:#04x}")]
    NoAcknowledge(u8),
}

/// Single-peripheral I2C bus
pub struct I2cBus<P> {
    address: u8,
    peripheral: P,
}

impl<P: I2cPeripheral> I2cBus<P> {
    pub fn new(peripheral: P, address: u8) -> Self {
        I2cBus {
            address,
            peripheral,
        }
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn peripheral(&self) -> &P {
        &self.peripheral
    }

    pub fn peripheral_mut(&mut self) -> &mut P {
        &mut self.peripheral
    }

    /// Destroy the bus and give back the peripheral
    pub fn release(self) -> P {
        self.peripheral
    }

    fn select(&self, address: u8) -> Result<(), BusError> {
        if address != self.address {
            log::debug!("No device at address {address:#04x}");
            return Err(BusError::NoAcknowledge(address));
        }
        Ok(())
    }

    // The master clocks out `buffer.len()` bytes no matter how many the
    // peripheral drives; the rest read as zero.
    fn fill(&mut self, buffer: &mut [u8]) {
        let data = self.peripheral.read(buffer.len());
        let n = data.len().min(buffer.len());
        buffer[..n].copy_from_slice(&data[..n]);
        buffer[n..].iter_mut().for_each(|b| *b = 0);
    }
}

impl<P: I2cPeripheral> Write for I2cBus<P> {
    type Error = BusError;

    fn write(&mut self, address: u8, bytes: &[u8]) -> Result<(), Self::Error> {
        self.select(address)?;
        self.peripheral.write(bytes);
        Ok(())
    }
}

impl<P: I2cPeripheral> Read for I2cBus<P> {
    type Error = BusError;

    fn read(&mut self, address: u8, buffer: &mut [u8]) -> Result<(), Self::Error> {
        self.select(address)?;
        self.fill(buffer);
        Ok(())
    }
}

impl<P: I2cPeripheral> WriteRead for I2cBus<P> {
    type Error = BusError;

    fn write_read(&mut self, address: u8, bytes: &[u8], buffer: &mut [u8]) -> Result<(), Self::Error> {
        self.select(address)?;
        self.peripheral.write(bytes);
        self.fill(buffer);
        Ok(())
    }
}
