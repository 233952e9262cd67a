/// All possible errors emitted by the region accessors
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Erase offset is not aligned on a word
    NotAligned,

    /// Access would go past the end of the region
    Overflow,
}
