//! Register model of the STM32L0 flash program/erase controller.
//! Only the bits the EEPROM accessors touch are decoded.
use bit::BitIndex;

/// First key written to `FLASH_PEKEYR` to unlock the data EEPROM and `FLASH_PECR`
pub const PEKEY1: u32 = 0x89AB_CDEF;
/// Second key written to `FLASH_PEKEYR`
pub const PEKEY2: u32 = 0x0203_0405;

/// `FLASH_SR` bit positions
pub mod sr {
    pub const BSY: usize = 0;
    pub const EOP: usize = 1;
    pub const ENDHV: usize = 2;
    pub const READY: usize = 3;
    pub const WRPERR: usize = 8;
    pub const PGAERR: usize = 9;
    pub const SIZERR: usize = 10;
}

/// `FLASH_PECR` bit positions
pub mod pecr {
    pub const PELOCK: usize = 0;
    pub const PRGLOCK: usize = 1;
    pub const FIX: usize = 8;
    pub const ERASE: usize = 9;
    pub const EOPIE: usize = 16;
}

/// Value of `FLASH_PECR` after reset
pub const PECR_RESET: u32 = 0x0000_0007;

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusRegister {
    pub busy: bool,
    pub end_of_program: bool,
    pub end_high_voltage: bool,
    pub ready: bool,
    pub write_protect_error: bool,
    pub alignment_error: bool,
    pub size_error: bool,
}

impl From<u32> for StatusRegister {
    fn from(val: u32) -> StatusRegister {
        StatusRegister {
            busy: val.bit(sr::BSY),
            end_of_program: val.bit(sr::EOP),
            end_high_voltage: val.bit(sr::ENDHV),
            ready: val.bit(sr::READY),
            write_protect_error: val.bit(sr::WRPERR),
            alignment_error: val.bit(sr::PGAERR),
            size_error: val.bit(sr::SIZERR),
        }
    }
}

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlRegister {
    /// Data EEPROM and `FLASH_PECR` are write protected
    pub locked: bool,
    pub program_locked: bool,
    pub erase: bool,
    pub fixed_time: bool,
    pub end_of_program_interrupt: bool,
}

impl From<u32> for ControlRegister {
    fn from(val: u32) -> ControlRegister {
        ControlRegister {
            locked: val.bit(pecr::PELOCK),
            program_locked: val.bit(pecr::PRGLOCK),
            erase: val.bit(pecr::ERASE),
            fixed_time: val.bit(pecr::FIX),
            end_of_program_interrupt: val.bit(pecr::EOPIE),
        }
    }
}

/// Return the `FLASH_PECR` `value` with the erase bit set or cleared.
pub fn with_erase(mut value: u32, enable: bool) -> u32 {
    value.set_bit(pecr::ERASE, enable);
    value
}

/// Return the `FLASH_PECR` `value` with the lock bit set or cleared.
pub fn with_lock(mut value: u32, lock: bool) -> u32 {
    value.set_bit(pecr::PELOCK, lock);
    value
}
