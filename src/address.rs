use core::ops::Add;

/// Start of the STM32L051 data EEPROM
pub const EEPROM_START: u32 = 0x0808_0000;
/// Size of the STM32L051 data EEPROM in bytes
pub const EEPROM_SIZE: u16 = 2048;
/// One past the last EEPROM byte
pub const EEPROM_END: u32 = EEPROM_START + EEPROM_SIZE as u32;

/// Size of an erasable EEPROM word
pub const WORD_SIZE: u16 = 4;

/// An absolute address in the EEPROM address space
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Address(pub u32);

impl Address {
    /// Whether the address sits on a word boundary.
    pub fn is_word_aligned(self) -> bool {
        self.0 % WORD_SIZE as u32 == 0
    }
}

impl Add<u16> for Address {
    type Output = Address;

    fn add(self, offset: u16) -> Address {
        Address(self.0.wrapping_add(offset as u32))
    }
}
