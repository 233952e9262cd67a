//! The flash controller capabilities the region accessors are built on.
use core::cell::RefCell;

use crate::address::Address;

/// A single program cycle worth of data
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Element {
    Word(u32),
    HalfWord(u16),
    Byte(u8),
}

impl Element {
    /// Number of bytes stored by this element
    pub fn width(&self) -> u16 {
        match self {
            Element::Word(_) => 4,
            Element::HalfWord(_) => 2,
            Element::Byte(_) => 1,
        }
    }

    /// Little-endian bytes of the element, only the first [`Self::width`] are meaningful
    pub fn to_le_bytes(self) -> [u8; 4] {
        match self {
            Element::Word(v) => v.to_le_bytes(),
            Element::HalfWord(v) => {
                let [lo, hi] = v.to_le_bytes();
                [lo, hi, 0, 0]
            }
            Element::Byte(v) => [v, 0, 0, 0],
        }
    }

    /// Break the element into naturally aligned stores for `addr`.
    ///
    /// An aligned element is passed through as is. A word on a half-word boundary becomes two
    /// half-words, anything else falls back to single bytes.
    pub fn for_each_aligned(self, addr: Address, mut f: impl FnMut(Address, Element)) {
        let width = self.width();
        if addr.0 % width as u32 == 0 {
            f(addr, self);
            return;
        }

        let bytes = self.to_le_bytes();
        if width == 4 && addr.0 % 2 == 0 {
            f(addr, Element::HalfWord(u16::from_le_bytes([bytes[0], bytes[1]])));
            f(addr + 2, Element::HalfWord(u16::from_le_bytes([bytes[2], bytes[3]])));
            return;
        }
        for (i, byte) in bytes[..width as usize].iter().enumerate() {
            f(addr + i as u16, Element::Byte(*byte));
        }
    }
}

/// Access to the flash program/erase controller and the EEPROM cells behind it.
///
/// The controller is a single hardware resource. Implementations are expected to be shared
/// between regions through `&mut C` or `&RefCell<C>`, both of which implement this trait.
pub trait FlashController {
    /// `true` while a program or erase operation is in flight
    fn busy(&mut self) -> bool;

    /// Write one value into the unlock key register
    fn set_unlock_key(&mut self, key: u32);

    /// Toggle erase mode, stores of zero then erase the addressed word
    fn set_erase_enable(&mut self, enable: bool);

    /// Set or clear the write protection bit
    fn set_lock(&mut self, lock: bool);

    /// Block until the next hardware event. Only used while erasing.
    fn wait_for_event(&mut self);

    /// Read a single EEPROM byte
    fn read_byte(&mut self, addr: Address) -> u8;

    /// Store an element at `addr`. The controller must be unlocked and idle.
    fn store(&mut self, addr: Address, element: Element);
}

impl<C: FlashController + ?Sized> FlashController for &mut C {
    fn busy(&mut self) -> bool {
        (**self).busy()
    }

    fn set_unlock_key(&mut self, key: u32) {
        (**self).set_unlock_key(key)
    }

    fn set_erase_enable(&mut self, enable: bool) {
        (**self).set_erase_enable(enable)
    }

    fn set_lock(&mut self, lock: bool) {
        (**self).set_lock(lock)
    }

    fn wait_for_event(&mut self) {
        (**self).wait_for_event()
    }

    fn read_byte(&mut self, addr: Address) -> u8 {
        (**self).read_byte(addr)
    }

    fn store(&mut self, addr: Address, element: Element) {
        (**self).store(addr, element)
    }
}

/// Lets several regions share one controller. Each call takes a short borrow, so a region
/// operation must not be started from within another one.
impl<C: FlashController> FlashController for &RefCell<C> {
    fn busy(&mut self) -> bool {
        self.borrow_mut().busy()
    }

    fn set_unlock_key(&mut self, key: u32) {
        self.borrow_mut().set_unlock_key(key)
    }

    fn set_erase_enable(&mut self, enable: bool) {
        self.borrow_mut().set_erase_enable(enable)
    }

    fn set_lock(&mut self, lock: bool) {
        self.borrow_mut().set_lock(lock)
    }

    fn wait_for_event(&mut self) {
        self.borrow_mut().wait_for_event()
    }

    fn read_byte(&mut self, addr: Address) -> u8 {
        self.borrow_mut().read_byte(addr)
    }

    fn store(&mut self, addr: Address, element: Element) {
        self.borrow_mut().store(addr, element)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pieces(addr: u32, element: Element) -> ([(Address, Element); 4], usize) {
        let mut out = [(Address(0), Element::Byte(0)); 4];
        let mut n = 0;
        element.for_each_aligned(Address(addr), |a, e| {
            out[n] = (a, e);
            n += 1;
        });
        (out, n)
    }

    #[test]
    fn aligned_elements_pass_through() {
        let (out, n) = pieces(0x0808_0004, Element::Word(0x0403_0201));
        assert_eq!(n, 1);
        assert_eq!(out[0], (Address(0x0808_0004), Element::Word(0x0403_0201)));

        let (out, n) = pieces(0x0808_0006, Element::HalfWord(0xBBAA));
        assert_eq!(n, 1);
        assert_eq!(out[0], (Address(0x0808_0006), Element::HalfWord(0xBBAA)));
    }

    #[test]
    fn word_on_half_word_boundary() {
        let (out, n) = pieces(0x0808_0002, Element::Word(0x0403_0201));
        assert_eq!(n, 2);
        assert_eq!(out[0], (Address(0x0808_0002), Element::HalfWord(0x0201)));
        assert_eq!(out[1], (Address(0x0808_0004), Element::HalfWord(0x0403)));
    }

    #[test]
    fn odd_address_falls_back_to_bytes() {
        let (out, n) = pieces(0x0808_0001, Element::Word(0x0403_0201));
        assert_eq!(n, 4);
        for (i, (addr, element)) in out.iter().enumerate() {
            assert_eq!(*addr, Address(0x0808_0001 + i as u32));
            assert_eq!(*element, Element::Byte(i as u8 + 1));
        }

        let (out, n) = pieces(0x0808_0003, Element::HalfWord(0xBBAA));
        assert_eq!(n, 2);
        assert_eq!(out[0], (Address(0x0808_0003), Element::Byte(0xAA)));
        assert_eq!(out[1], (Address(0x0808_0004), Element::Byte(0xBB)));
    }
}
