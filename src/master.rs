//! Bus-master side driver used to read the model back the way firmware would.

use core::fmt::Debug;

use accelerometer::{vector::I16x3, Error, RawAccelerometer};
use embedded_hal::blocking::i2c::{Write, WriteRead};

use crate::conf::{DataFormat, Range};
use crate::register::Register;
use crate::sample::SAMPLE_BYTES;

/// FIFO_STATUS entries field
const FIFO_ENTRIES_MASK: u8 = 0b0011_1111;

/// ADXL345 driver talking over any `embedded-hal` I2C bus
pub struct Adxl345Master<I2C> {
    i2c: I2C,
    address: u8,
    data_format: DataFormat,
}

impl<I2C, E> Adxl345Master<I2C>
where
    I2C: WriteRead<Error = E> + Write<Error = E>,
    E: Debug,
{
    pub fn new(i2c: I2C, address: u8) -> Self {
        Adxl345Master {
            i2c,
            address,
            data_format: DataFormat::default(),
        }
    }

    /// Get the device ID
    pub fn device_id(&mut self) -> Result<u8, E> {
        let mut buffer = [0u8; 1];
        self.read_reg(Register::DEVID.addr(), &mut buffer)?;
        Ok(buffer[0])
    }

    pub fn set_data_format(&mut self, full_resolution: bool, range: Range) -> Result<(), E> {
        let format = DataFormat::new(full_resolution, range);
        self.write_reg(Register::DATA_FORMAT.addr(), format.val())?;
        self.data_format = format;
        Ok(())
    }

    pub fn data_format(&self) -> DataFormat {
        self.data_format
    }

    /// Number of samples the device reports as waiting
    pub fn fifo_entries(&mut self) -> Result<u8, E> {
        let mut buffer = [0u8; 1];
        self.read_reg(Register::FIFO_STATUS.addr(), &mut buffer)?;
        Ok(buffer[0] & FIFO_ENTRIES_MASK)
    }

    /// Destroy the driver and return the bus
    pub fn release(self) -> I2C {
        self.i2c
    }

    fn write_reg(&mut self, reg: u8, value: u8) -> Result<(), E> {
        self.i2c.write(self.address, &[reg, value])
    }

    fn read_reg(&mut self, reg: u8, buffer: &mut [u8]) -> Result<(), E> {
        self.i2c.write_read(self.address, &[reg], buffer)
    }
}

impl<I2C, E> RawAccelerometer<I16x3> for Adxl345Master<I2C>
where
    I2C: WriteRead<Error = E> + Write<Error = E>,
    E: Debug,
{
    type Error = E;

    /// Latch the next sample and decode its three little-endian axis words
    fn accel_raw(&mut self) -> Result<I16x3, Error<E>> {
        // The address-only write to DATA_X0 latches one sample; the six bytes
        // that follow in the same transaction are that sample's burst
        let mut bytes = [0u8; SAMPLE_BYTES];
        self.read_reg(Register::DATA_X0.addr(), &mut bytes)?;

        let x = i16::from_le_bytes([bytes[0], bytes[1]]);
        let y = i16::from_le_bytes([bytes[2], bytes[3]]);
        let z = i16::from_le_bytes([bytes[4], bytes[5]]);
        Ok(I16x3 { x, y, z })
    }
}
