#![no_std]
//! Bounded access to the data EEPROM of STM32L0 microcontrollers.
//!
//! A [`blocking::Region`] owns a `start`/`length` window of the EEPROM and exposes byte reads,
//! byte writes and word erases inside it. Every mutation is bracketed by the program/erase
//! controller unlock sequence and re-locks the controller before returning.
//!
//! The controller itself is abstracted by [`controller::FlashController`], so the accessors
//! run on anything from the real [`FLASH` peripheral](https://www.st.com/resource/en/reference_manual/rm0377-ultralowpower-stm32l0x1-advanced-armbased-32bit-mcus-stmicroelectronics.pdf)
//! to a test double. Enable the `stm32l0x1` feature for the register backed implementation.
//!
//! Writes are split into as few program cycles as possible: words first, then at most one
//! half-word and one byte. Erases work on 4 byte words and must start on a word boundary.

pub mod address;
pub mod asynchronous;
pub mod blocking;
pub mod controller;
pub mod error;
pub mod register;
#[cfg(feature = "stm32l0x1")]
pub mod stm32l0;
pub mod tier;

use crate::error::Error;

pub use address::{Address, EEPROM_END, EEPROM_SIZE, EEPROM_START, WORD_SIZE};
pub use controller::{Element, FlashController};

pub(crate) fn check_access(length: u16, offset: u16, len: usize) -> Result<(), Error> {
    let end = offset as usize + len;
    if end > length as usize {
        return Err(Error::Overflow);
    }
    Ok(())
}

pub(crate) fn check_erase(length: u16, offset: u16, words: u16) -> Result<(), Error> {
    if offset % WORD_SIZE != 0 {
        return Err(Error::NotAligned);
    }
    check_access(length, offset, words as usize * WORD_SIZE as usize)
}

pub(crate) fn check_range(start: u32, length: u16) -> Result<(), Error> {
    let end = start as u64 + length as u64;
    if start < EEPROM_START || end > EEPROM_END as u64 {
        return Err(Error::Overflow);
    }
    Ok(())
}

/// Convert a `embedded-storage` offset into a region offset
pub(crate) fn storage_offset(offset: u32) -> Result<u16, Error> {
    u16::try_from(offset).map_err(|_| Error::Overflow)
}
