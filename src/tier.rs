//! Splitting of a write into as few program cycles as possible.
use crate::controller::Element;

/// Greedy split of a byte count into words, then half-words, then single bytes
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tiers {
    /// 4 byte stores
    pub words: u16,
    /// 2 byte stores, at most one
    pub half_words: u16,
    /// Trailing single byte store, at most one
    pub bytes: u16,
}

impl Tiers {
    /// Split `len` bytes, largest elements first
    pub fn split(len: u16) -> Self {
        Tiers {
            words: len / 4,
            half_words: (len % 4) / 2,
            bytes: len % 2,
        }
    }

    /// Total number of program cycles
    pub fn cycles(&self) -> u16 {
        self.words + self.half_words + self.bytes
    }
}

/// Walks a buffer tier by tier, widest first, yielding the byte position of each element
/// within the buffer and the element itself.
pub struct Elements<'a> {
    data: &'a [u8],
    pos: u16,
    tiers: Tiers,
}

impl<'a> Elements<'a> {
    /// `data` must not be longer than `u16::MAX`, the region bound check guarantees it.
    pub fn new(data: &'a [u8]) -> Self {
        Elements {
            data,
            pos: 0,
            tiers: Tiers::split(data.len() as u16),
        }
    }
}

impl Iterator for Elements<'_> {
    type Item = (u16, Element);

    fn next(&mut self) -> Option<Self::Item> {
        let rest = &self.data[self.pos as usize..];
        let element = if self.tiers.words > 0 {
            self.tiers.words -= 1;
            Element::Word(u32::from_le_bytes([rest[0], rest[1], rest[2], rest[3]]))
        } else if self.tiers.half_words > 0 {
            self.tiers.half_words -= 1;
            Element::HalfWord(u16::from_le_bytes([rest[0], rest[1]]))
        } else if self.tiers.bytes > 0 {
            self.tiers.bytes -= 1;
            Element::Byte(rest[0])
        } else {
            return None;
        };

        let pos = self.pos;
        self.pos += element.width();
        Some((pos, element))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.tiers.cycles() as usize;
        (left, Some(left))
    }
}
