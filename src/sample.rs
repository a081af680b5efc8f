use std::fmt;

use accelerometer::vector::I16x3;

use crate::conf::{DataFormat, Range};

/// Number of bytes one sample occupies on the bus (DATAX0..DATAZ1)
pub const SAMPLE_BYTES: usize = 6;

/// A single 3-axis reading fed into the model
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Sample {
    pub x: i16,
    pub y: i16,
    pub z: i16,
}

impl Sample {
    pub const fn new(x: i16, y: i16, z: i16) -> Self {
        Sample { x, y, z }
    }

    /// Bus representation of this sample under the given data format
    pub fn encode(self, format: DataFormat) -> [u8; SAMPLE_BYTES] {
        encode(self, format.full_resolution, format.range)
    }
}

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[X: {}, Y: {}, Z: {}]", self.x, self.y, self.z)
    }
}

impl From<I16x3> for Sample {
    fn from(v: I16x3) -> Self {
        Sample::new(v.x, v.y, v.z)
    }
}

impl From<Sample> for I16x3 {
    fn from(s: Sample) -> Self {
        I16x3 {
            x: s.x,
            y: s.y,
            z: s.z,
        }
    }
}

/// Encode a sample into the six bytes DATAX0, DATAX1, DATAY0, DATAY1, DATAZ0, DATAZ1.
///
/// Each axis is arithmetic-shifted right by 2 in full resolution mode, or by
/// `2 + range` otherwise, and emitted little-endian.
pub fn encode(sample: Sample, full_resolution: bool, range: Range) -> [u8; SAMPLE_BYTES] {
    let shift = DataFormat::new(full_resolution, range).shift();
    let [x0, x1] = encode_axis(sample.x, shift);
    let [y0, y1] = encode_axis(sample.y, shift);
    let [z0, z1] = encode_axis(sample.z, shift);
    [x0, x1, y0, y1, z0, z1]
}

fn encode_axis(value: i16, shift: u8) -> [u8; 2] {
    (value >> shift).to_le_bytes()
}
