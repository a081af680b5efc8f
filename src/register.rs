//! ADXL345 register addresses
#![allow(non_camel_case_types)]

/// Number of addressable registers. The register pointer wraps at this value.
pub const REGISTER_COUNT: u8 = 0x40;

#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Register {
    DEVID           = 0x00,
    // 0x01 to 0x1C are reserved
    THRESH_TAP      = 0x1D,
    OFSX            = 0x1E,
    OFSY            = 0x1F,
    OFSZ            = 0x20,
    DUR             = 0x21,
    LATENT          = 0x22,
    WINDOW          = 0x23,
    THRESH_ACT      = 0x24,
    THRESH_INACT    = 0x25,
    TIME_INACT      = 0x26,
    ACT_INACT_CTL   = 0x27,
    THRESH_FF       = 0x28,
    TIME_FF         = 0x29,
    TAP_AXES        = 0x2A,
    ACT_TAP_STATUS  = 0x2B,
    BW_RATE         = 0x2C,
    POWER_CTL       = 0x2D,
    INT_ENABLE      = 0x2E,
    INT_MAP         = 0x2F,
    INT_SOURCE      = 0x30,
    DATA_FORMAT     = 0x31,
    DATA_X0         = 0x32,
    DATA_X1         = 0x33,
    DATA_Y0         = 0x34,
    DATA_Y1         = 0x35,
    DATA_Z0         = 0x36,
    DATA_Z1         = 0x37,
    FIFO_CTL        = 0x38,
    FIFO_STATUS     = 0x39
}

impl Register {
    /// Get register address
    pub fn addr(self) -> u8 {
        self as u8
    }

    /// Decode a register pointer. Only the low 6 bits take part in the decode;
    /// reserved and unmapped addresses yield `None`.
    pub fn from_addr(addr: u8) -> Option<Register> {
        use Register::*;
        let register = match addr % REGISTER_COUNT {
            0x00 => DEVID,
            0x1D => THRESH_TAP,
            0x1E => OFSX,
            0x1F => OFSY,
            0x20 => OFSZ,
            0x21 => DUR,
            0x22 => LATENT,
            0x23 => WINDOW,
            0x24 => THRESH_ACT,
            0x25 => THRESH_INACT,
            0x26 => TIME_INACT,
            0x27 => ACT_INACT_CTL,
            0x28 => THRESH_FF,
            0x29 => TIME_FF,
            0x2A => TAP_AXES,
            0x2B => ACT_TAP_STATUS,
            0x2C => BW_RATE,
            0x2D => POWER_CTL,
            0x2E => INT_ENABLE,
            0x2F => INT_MAP,
            0x30 => INT_SOURCE,
            0x31 => DATA_FORMAT,
            0x32 => DATA_X0,
            0x33 => DATA_X1,
            0x34 => DATA_Y0,
            0x35 => DATA_Y1,
            0x36 => DATA_Z0,
            0x37 => DATA_Z1,
            0x38 => FIFO_CTL,
            0x39 => FIFO_STATUS,
            _ => return None,
        };
        Some(register)
    }

    /// True for the six axis-data registers DATAX0..DATAZ1
    pub fn is_axis_data(self) -> bool {
        (Register::DATA_X0.addr()..=Register::DATA_Z1.addr()).contains(&self.addr())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_mapped_registers() {
        assert_eq!(Register::from_addr(0x00), Some(Register::DEVID));
        assert_eq!(Register::from_addr(0x31), Some(Register::DATA_FORMAT));
        assert_eq!(Register::from_addr(0x39), Some(Register::FIFO_STATUS));
        for addr in 0x1D..=0x39 {
            assert_eq!(Register::from_addr(addr).map(Register::addr), Some(addr));
        }
    }

    #[test]
    fn reserved_and_unmapped_addresses_decode_to_none() {
        assert_eq!(Register::from_addr(0x01), None);
        assert_eq!(Register::from_addr(0x1C), None);
        assert_eq!(Register::from_addr(0x3A), None);
        assert_eq!(Register::from_addr(0x3F), None);
    }

    #[test]
    fn only_low_six_bits_are_decoded() {
        assert_eq!(Register::from_addr(0x72), Some(Register::DATA_X0));
        assert_eq!(Register::from_addr(0xC0), Some(Register::DEVID));
    }

    #[test]
    fn axis_data_range() {
        assert!(Register::DATA_X0.is_axis_data());
        assert!(Register::DATA_Z1.is_axis_data());
        assert!(!Register::DATA_FORMAT.is_axis_data());
        assert!(!Register::FIFO_CTL.is_axis_data());
    }
}
