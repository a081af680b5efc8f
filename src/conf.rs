#![allow(non_camel_case_types)]

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Measurement full-scale range, bits 0-1 of DATA_FORMAT
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Range {
    _2G = 0b00,
    _4G = 0b01,
    _8G = 0b10,
    _16G = 0b11,
}

impl Range {
    pub fn val(self) -> u8 {
        self as u8
    }

    /// Decode the range code from the low 2 bits of `bits`
    pub fn from_bits(bits: u8) -> Range {
        match bits & 0b11 {
            0b00 => Range::_2G,
            0b01 => Range::_4G,
            0b10 => Range::_8G,
            _ => Range::_16G,
        }
    }
}

impl Default for Range {
    fn default() -> Self {
        Range::_2G
    }
}

/// Device configuration held by the DATA_FORMAT register
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DataFormat {
    pub range: Range,
    pub full_resolution: bool,
}

impl DataFormat {
    pub fn new(full_resolution: bool, range: Range) -> Self {
        DataFormat {
            range,
            full_resolution,
        }
    }

    /// Interpret a byte written to DATA_FORMAT. Any bit at or above bit 3
    /// selects full resolution.
    pub fn from_register(val: u8) -> Self {
        DataFormat {
            range: Range::from_bits(val),
            full_resolution: (val >> 3) != 0,
        }
    }

    /// Register value a bus master writes to select this format
    pub fn val(self) -> u8 {
        ((self.full_resolution as u8) << 3) + self.range.val()
    }

    /// Right shift applied to raw axis values before they are put on the bus
    pub fn shift(self) -> u8 {
        if self.full_resolution {
            2
        } else {
            2 + self.range.val()
        }
    }
}

/// ADXL345 model configuration
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case", default)]
pub struct Config {
    /// Cap on the depth reported through FIFO_STATUS
    pub max_fifo_depth: usize,
    /// 7-bit bus address the model answers on
    pub i2c_address: u8,
}

pub const DEFAULT_MAX_FIFO_DEPTH: usize = 32;
pub const DEFAULT_I2C_ADDRESS: u8 = 0x53; // ALT pin low

impl Default for Config {
    fn default() -> Self {
        Config {
            max_fifo_depth: DEFAULT_MAX_FIFO_DEPTH,
            i2c_address: DEFAULT_I2C_ADDRESS,
        }
    }
}

impl Config {
    /// Creates a new configuration object with default values
    pub fn new() -> Self {
        Config::default()
    }

    /// Sets the reported FIFO depth cap.
    /// Default is 32 entries
    pub fn max_fifo_depth(&mut self, depth: usize) -> &mut Self {
        self.max_fifo_depth = depth;
        self
    }

    /// Sets the bus address.
    /// Default is `0x53`
    pub fn i2c_address(&mut self, address: u8) -> &mut Self {
        self.i2c_address = address;
        self
    }

    /// Load a [Config] from the given YAML string
    pub fn from_yaml(content: &str) -> Result<Config, Error> {
        let config: Config = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Load a [Config] from the given YAML file
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Config, Error> {
        let file = std::fs::File::open(path)?;
        let config: Config = serde_yaml::from_reader(file)?;
        Ok(config)
    }
}
