use crate::{
    address::{Address, WORD_SIZE},
    check_access, check_erase, check_range,
    controller::{Element, FlashController},
    error::Error,
    register::{PEKEY1, PEKEY2},
    storage_offset,
    tier::Elements,
};
use embassy_futures::yield_now;
use embedded_storage_async::nor_flash::{MultiwriteNorFlash, NorFlash, ReadNorFlash};

/// Async flavour of [`crate::blocking::Region`].
///
/// Busy waits yield to the executor instead of spinning, and erases poll for completion of each
/// word rather than halting the core until the next interrupt.
pub struct AsyncRegion<C>
where
    C: FlashController,
{
    controller: C,
    start: Address,
    length: u16,
}

impl<C> AsyncRegion<C>
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

    /// Wait until the controller is done with the current operation
    pub async fn wait_idle(&mut self) {
        while self.controller.busy() {
            yield_now().await;
        }
    }

    /// Read `buff.len()` bytes starting `offset` bytes into the region
    pub async fn read(&mut self, offset: u16, buff: &mut [u8]) -> Result<(), Error> {
        if let Err(e) = check_access(self.length, offset, buff.len()) {
            #[cfg(feature = "defmt")]
            defmt::warn!("Read of {=usize} at {=u16} overflows region", buff.len(), offset);
            return Err(e);
        }

        // Reading while a program cycle is running stalls the bus, let others run meanwhile
        self.wait_idle().await;
        let base = self.start + offset;
        for (i, byte) in buff.iter_mut().enumerate() {
            *byte = self.controller.read_byte(base + i as u16);
        }

        #[cfg(feature = "defmt")]
        defmt::trace!("Read from {=u32}, {=usize}: {:?}", base.0, buff.len(), buff);
        Ok(())
    }

    /// Write `buff` starting `offset` bytes into the region
    pub async fn write(&mut self, offset: u16, buff: &[u8]) -> Result<(), Error> {
        if let Err(e) = check_access(self.length, offset, buff.len()) {
            #[cfg(feature = "defmt")]
            defmt::warn!("Write of {=usize} at {=u16} overflows region", buff.len(), offset);
            return Err(e);
        }

        let base = self.start + offset;
        #[cfg(feature = "defmt")]
        defmt::debug!("Write to {=u32} len {=usize}", base.0, buff.len());

        self.unlock().await;
        for (pos, element) in Elements::new(buff) {
            self.wait_idle().await;
            self.controller.store(base + pos, element);
        }
        self.lock().await;
        Ok(())
    }

    /// Erase `words` words starting `offset` bytes into the region. `offset` must be word aligned.
    pub async fn erase(&mut self, offset: u16, words: u16) -> Result<(), Error> {
        if let Err(e) = check_erase(self.length, offset, words) {
            #[cfg(feature = "defmt")]
            defmt::warn!("Erase of {=u16} words at {=u16} rejected: {:?}", words, offset, e);
            return Err(e);
        }

        let base = self.start + offset;
        self.unlock().await;
        self.controller.set_erase_enable(true);
        for word in 0..words {
            #[cfg(feature = "defmt")]
            defmt::trace!("Erase word {=u32}", (base + word * WORD_SIZE).0);
            self.controller.store(base + word * WORD_SIZE, Element::Word(0));

            // Wait for the erase to complete, acting like a flush
            self.wait_idle().await;
        }
        self.controller.set_erase_enable(false);
        self.lock().await;
        Ok(())
    }

    async fn unlock(&mut self) {
        self.wait_idle().await;
        self.controller.set_unlock_key(PEKEY1);
        self.controller.set_unlock_key(PEKEY2);
    }

    async fn lock(&mut self) {
        self.wait_idle().await;
        self.controller.set_lock(true);
    }
}

impl<C: FlashController> embedded_storage_async::nor_flash::ErrorType for AsyncRegion<C> {
    type Error = Error;
}

impl<C: FlashController> ReadNorFlash for AsyncRegion<C> {
    const READ_SIZE: usize = 1;

    async fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        self.read(storage_offset(offset)?, bytes).await
    }

    fn capacity(&self) -> usize {
        self.length as usize
    }
}

impl<C: FlashController> NorFlash for AsyncRegion<C> {
    const WRITE_SIZE: usize = 1;

    const ERASE_SIZE: usize = WORD_SIZE as usize;

    async fn erase(&mut self, from: u32, to: u32) -> Result<(), Self::Error> {
        if from > to || to > self.length as u32 {
            return Err(Error::Overflow);
        }
        let erase_size = Self::ERASE_SIZE as u32;
        if from % erase_size != 0 || to % erase_size != 0 {
            return Err(Error::NotAligned);
        }

        let words = (to - from) / erase_size;
        self.erase(storage_offset(from)?, words as u16).await
    }

    async fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error> {
        self.write(storage_offset(offset)?, bytes).await
    }
}

impl<C: FlashController> MultiwriteNorFlash for AsyncRegion<C> {}
