#![allow(dead_code)]

use eeprom_region::{
    register::{self, ControlRegister, PECR_RESET, PEKEY1, PEKEY2},
    Address, Element, FlashController,
};

pub const START: u32 = 0x0808_0000;
pub const SIZE: u16 = 2048;

/// Everything the accessors asked the controller to do, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Busy(bool),
    UnlockKey(u32),
    EraseEnable(bool),
    Lock(bool),
    WaitForEvent,
    Read(Address),
    Store(Address, Element),
}

/// Software model of the program/erase controller and the EEPROM behind it.
///
/// Stores are ignored while locked, each store keeps the controller busy for a configurable
/// number of polls and `wait_for_event` stands for the end of operation interrupt.
pub struct MockFlash {
    base: u32,
    pub mem: Vec<u8>,
    pub pecr: u32,
    key_stage: u8,
    busy_left: u32,
    pub program_cycles: u32,
    pub erase_cycles: u32,
    pub log: Vec<Event>,
    /// Stores issued while locked or busy
    pub violations: u32,
}

impl MockFlash {
    pub fn new(base: u32, size: u16) -> Self {
        Self {
            base,
            mem: vec![0xFF; size as usize],
            pecr: PECR_RESET,
            key_stage: 0,
            busy_left: 0,
            program_cycles: 0,
            erase_cycles: 8,
            log: Vec::new(),
            violations: 0,
        }
    }

    pub fn eeprom() -> Self {
        Self::new(START, SIZE)
    }

    pub fn with_program_cycles(mut self, cycles: u32) -> Self {
        self.program_cycles = cycles;
        self
    }

    pub fn locked(&self) -> bool {
        ControlRegister::from(self.pecr).locked
    }

    pub fn erase_enabled(&self) -> bool {
        ControlRegister::from(self.pecr).erase
    }

    /// Number of completed unlock sequences
    pub fn unlocks(&self) -> usize {
        self.log
            .iter()
            .filter(|e| **e == Event::UnlockKey(PEKEY2))
            .count()
    }

    pub fn locks(&self) -> usize {
        self.log.iter().filter(|e| **e == Event::Lock(true)).count()
    }

    pub fn stores(&self) -> Vec<(Address, Element)> {
        self.log
            .iter()
            .filter_map(|e| match e {
                Event::Store(addr, element) => Some((*addr, *element)),
                _ => None,
            })
            .collect()
    }

    /// Bytes at `offset` from the modelled base address
    pub fn bytes(&self, offset: u32, len: usize) -> &[u8] {
        let start = offset as usize;
        &self.mem[start..start + len]
    }

    fn index(&self, addr: Address) -> usize {
        let idx = addr
            .0
            .checked_sub(self.base)
            .expect("address below modelled EEPROM") as usize;
        assert!(idx < self.mem.len(), "address past modelled EEPROM");
        idx
    }

    fn put(&mut self, addr: Address, bytes: &[u8]) {
        let idx = self.index(addr);
        self.mem[idx..idx + bytes.len()].copy_from_slice(bytes);
    }
}

impl FlashController for MockFlash {
    fn busy(&mut self) -> bool {
        let busy = self.busy_left > 0;
        if busy {
            self.busy_left -= 1;
        }
        self.log.push(Event::Busy(busy));
        busy
    }

    fn set_unlock_key(&mut self, key: u32) {
        self.log.push(Event::UnlockKey(key));
        self.key_stage = match (self.key_stage, key) {
            (0, PEKEY1) => 1,
            (1, PEKEY2) => {
                self.pecr = register::with_lock(self.pecr, false);
                0
            }
            _ => 0,
        };
    }

    fn set_erase_enable(&mut self, enable: bool) {
        self.log.push(Event::EraseEnable(enable));
        if !self.locked() {
            self.pecr = register::with_erase(self.pecr, enable);
        }
    }

    fn set_lock(&mut self, lock: bool) {
        self.log.push(Event::Lock(lock));
        // The lock bit can only be cleared through the key sequence
        if lock {
            self.pecr = register::with_lock(self.pecr, true);
        }
    }

    fn wait_for_event(&mut self) {
        self.log.push(Event::WaitForEvent);
        self.busy_left = 0;
    }

    fn read_byte(&mut self, addr: Address) -> u8 {
        self.log.push(Event::Read(addr));
        self.mem[self.index(addr)]
    }

    fn store(&mut self, addr: Address, element: Element) {
        self.log.push(Event::Store(addr, element));
        if self.locked() || self.busy_left > 0 {
            self.violations += 1;
            return;
        }

        if self.erase_enabled() {
            assert!(addr.is_word_aligned(), "erase of unaligned word");
            assert_eq!(element, Element::Word(0), "erase requires a zero word");
            self.put(addr, &[0; 4]);
            self.busy_left = self.erase_cycles;
            return;
        }

        let mut cells = Vec::new();
        element.for_each_aligned(addr, |addr, element| cells.push((addr, element)));
        for (addr, element) in cells {
            assert_eq!(addr.0 % element.width() as u32, 0, "unaligned store at {addr:?}");
            let bytes = element.to_le_bytes();
            self.put(addr, &bytes[..element.width() as usize]);
        }
        self.busy_left = self.program_cycles;
    }
}
