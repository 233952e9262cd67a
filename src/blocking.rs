use crate::{
    address::{Address, WORD_SIZE},
    check_access, check_erase, check_range,
    controller::{Element, FlashController},
    error::Error,
    register::{PEKEY1, PEKEY2},
    tier::Elements,
};

/// A window of the data EEPROM.
///
/// Reads go straight to the cells, writes and erases unlock the controller once, do their work
/// and lock it again before returning.
pub struct Region<C>
where
    C: FlashController,
{
    controller: C,
    start: Address,
    length: u16,
}

impl<C> Region<C>
where
    C: FlashController,
{
    /// Create a region of `length` bytes at `start`. The range is not checked against the
    /// EEPROM bounds, see [`Self::try_new`].
    pub fn new(controller: C, start: u32, length: u16) -> Self {
        Self {
            controller,
            start: Address(start),
            length,
        }
    }

    /// Create a region, making sure it lies within the data EEPROM
    pub fn try_new(controller: C, start: u32, length: u16) -> Result<Self, Error> {
        check_range(start, length)?;
        Ok(Self::new(controller, start, length))
    }

    /// Give back the controller
    pub fn release(self) -> C {
        self.controller
    }

    pub fn start(&self) -> Address {
        self.start
    }

    /// Capacity in bytes
    pub fn len(&self) -> u16 {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Read `buff.len()` bytes starting `offset` bytes into the region
    pub fn read(&mut self, offset: u16, buff: &mut [u8]) -> Result<(), Error> {
        if let Err(e) = check_access(self.length, offset, buff.len()) {
            #[cfg(feature = "defmt")]
            defmt::warn!("Read of {=usize} at {=u16} overflows region", buff.len(), offset);
            return Err(e);
        }

        let base = self.start + offset;
        for (i, byte) in buff.iter_mut().enumerate() {
            *byte = self.controller.read_byte(base + i as u16);
        }

        #[cfg(feature = "defmt")]
        defmt::trace!("Read from {=u32}, {=usize}: {:?}", base.0, buff.len(), buff);
        Ok(())
    }

    /// Write `buff` starting `offset` bytes into the region
    pub fn write(&mut self, offset: u16, buff: &[u8]) -> Result<(), Error> {
        if let Err(e) = check_access(self.length, offset, buff.len()) {
            #[cfg(feature = "defmt")]
            defmt::warn!("Write of {=usize} at {=u16} overflows region", buff.len(), offset);
            return Err(e);
        }

        let base = self.start + offset;
        #[cfg(feature = "defmt")]
        defmt::debug!("Write to {=u32} len {=usize}", base.0, buff.len());

        self.unlock();
        for (pos, element) in Elements::new(buff) {
            self.store(base + pos, element);
        }
        self.lock();
        Ok(())
    }

    /// Erase `words` words starting `offset` bytes into the region. `offset` must be word aligned.
    pub fn erase(&mut self, offset: u16, words: u16) -> Result<(), Error> {
        if let Err(e) = check_erase(self.length, offset, words) {
            #[cfg(feature = "defmt")]
            defmt::warn!("Erase of {=u16} words at {=u16} rejected: {:?}", words, offset, e);
            return Err(e);
        }

        let base = self.start + offset;
        #[cfg(feature = "defmt")]
        defmt::debug!("Erase {=u16} words from {=u32}", words, base.0);

        self.unlock();
        self.controller.set_erase_enable(true);
        for word in 0..words {
            self.controller.store(base + word * WORD_SIZE, Element::Word(0));
            self.controller.wait_for_event();
        }
        self.controller.set_erase_enable(false);
        self.lock();
        Ok(())
    }

    fn wait_idle(&mut self) {
        while self.controller.busy() {}
    }

    fn store(&mut self, addr: Address, element: Element) {
        self.wait_idle();
        self.controller.store(addr, element);
    }

    fn unlock(&mut self) {
        self.wait_idle();
        self.controller.set_unlock_key(PEKEY1);
        self.controller.set_unlock_key(PEKEY2);
    }

    fn lock(&mut self) {
        self.wait_idle();
        self.controller.set_lock(true);
    }
}

/// Implementation of the `NorFlash` traits of the `embedded_storage` crate. Offsets are relative
/// to the region start.
mod es {
    use super::*;
    use crate::storage_offset;
    use embedded_storage::nor_flash::{
        check_erase, check_read, check_write, ErrorType, MultiwriteNorFlash, NorFlash,
        NorFlashError, NorFlashErrorKind, ReadNorFlash,
    };

    impl From<NorFlashErrorKind> for Error {
        fn from(e: NorFlashErrorKind) -> Self {
            match e {
                NorFlashErrorKind::NotAligned => Error::NotAligned,
                _ => Error::Overflow,
            }
        }
    }

    impl NorFlashError for Error {
        fn kind(&self) -> NorFlashErrorKind {
            match self {
                Error::Overflow => NorFlashErrorKind::OutOfBounds,
                Error::NotAligned => NorFlashErrorKind::NotAligned,
            }
        }
    }

    impl<C: FlashController> ErrorType for Region<C> {
        type Error = Error;
    }

    impl<C: FlashController> ReadNorFlash for Region<C> {
        const READ_SIZE: usize = 1;

        fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
            check_read(self, offset, bytes.len())?;
            self.read(storage_offset(offset)?, bytes)
        }

        fn capacity(&self) -> usize {
            self.length as usize
        }
    }

    impl<C: FlashController> NorFlash for Region<C> {
        const WRITE_SIZE: usize = 1;
        const ERASE_SIZE: usize = WORD_SIZE as usize;

        fn erase(&mut self, from: u32, to: u32) -> Result<(), Self::Error> {
            check_erase(self, from, to)?;
            let words = (to - from) / WORD_SIZE as u32;
            self.erase(storage_offset(from)?, words as u16)
        }

        fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error> {
            check_write(self, offset, bytes.len())?;
            self.write(storage_offset(offset)?, bytes)
        }
    }

    impl<C: FlashController> MultiwriteNorFlash for Region<C> {}
}
