//! [`FlashController`] on top of the STM32L0x1 `FLASH` peripheral.
use core::ptr;

use bit::BitIndex;
use stm32l0::stm32l0x1::FLASH;

use crate::{
    address::Address,
    controller::{Element, FlashController},
    register::{self, sr, StatusRegister},
};

pub struct Stm32l0Flash {
    regs: FLASH,
}

impl Stm32l0Flash {
    /// Take ownership of the `FLASH` peripheral.
    ///
    /// # Safety
    ///
    /// Cells are accessed through raw pointers built from region addresses. Every region driven
    /// by this controller must lie within the data EEPROM, see [`crate::EEPROM_START`] and
    /// [`crate::EEPROM_END`] or use `try_new` on the region.
    pub unsafe fn new(regs: FLASH) -> Self {
        Self { regs }
    }

    pub fn free(self) -> FLASH {
        self.regs
    }

    pub fn status(&self) -> StatusRegister {
        self.regs.sr.read().bits().into()
    }
}

impl FlashController for Stm32l0Flash {
    fn busy(&mut self) -> bool {
        self.regs.sr.read().bits().bit(sr::BSY)
    }

    fn set_unlock_key(&mut self, key: u32) {
        self.regs.pekeyr.write(|w| unsafe { w.bits(key) });
    }

    fn set_erase_enable(&mut self, enable: bool) {
        self.regs
            .pecr
            .modify(|r, w| unsafe { w.bits(register::with_erase(r.bits(), enable)) });
    }

    fn set_lock(&mut self, lock: bool) {
        self.regs
            .pecr
            .modify(|r, w| unsafe { w.bits(register::with_lock(r.bits(), lock)) });
    }

    fn wait_for_event(&mut self) {
        cortex_m::asm::wfi();
    }

    fn read_byte(&mut self, addr: Address) -> u8 {
        unsafe { ptr::read_volatile(addr.0 as *const u8) }
    }

    fn store(&mut self, addr: Address, element: Element) {
        // Cortex-M0+ faults on unaligned accesses, split pieces are separate program cycles
        element.for_each_aligned(addr, |addr, element| {
            while self.busy() {}
            unsafe {
                match element {
                    Element::Word(v) => ptr::write_volatile(addr.0 as *mut u32, v),
                    Element::HalfWord(v) => ptr::write_volatile(addr.0 as *mut u16, v),
                    Element::Byte(v) => ptr::write_volatile(addr.0 as *mut u8, v),
                }
            }
        });
    }
}
