//! The discrete LED command value and its wire encoding.

use pairlight_core::{LedIndex, Result, Rgb};

/// One color assignment for one LED.
///
/// Immutable value; every instance has passed range validation, either through
/// the typed constructor arguments or through [`LedCommand::from_raw`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedCommand {
    index: LedIndex,
    color: Rgb,
}

impl LedCommand {
    /// Create a command from already-validated parts.
    #[must_use]
    pub fn new(index: LedIndex, color: Rgb) -> Self {
        Self { index, color }
    }

    /// Create a command from unvalidated integers.
    ///
    /// This is the untyped boundary used by
    /// [`LedChannel::enqueue`](crate::LedChannel::enqueue): the index must be
    /// in `[0, 50)` and each color component in `[0, 256)`.
    ///
    /// # Errors
    /// Returns the validation error of the first out-of-range value.
    pub fn from_raw(index: u16, r: u16, g: u16, b: u16) -> Result<Self> {
        Ok(Self {
            index: LedIndex::new(index)?,
            color: Rgb::from_raw(r, g, b)?,
        })
    }

    /// The target LED.
    #[must_use]
    pub fn index(&self) -> LedIndex {
        self.index
    }

    /// The color to latch.
    #[must_use]
    pub fn color(&self) -> Rgb {
        self.color
    }

    /// Encode as the four-byte wire frame `[index, r, g, b]`.
    ///
    /// The protocol is fire-and-forget; no acknowledgment is ever read back.
    #[must_use]
    pub fn to_frame(&self) -> [u8; 4] {
        [
            self.index.as_u8(),
            self.color.r,
            self.color.g,
            self.color.b,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_from_raw_valid() {
        let command = LedCommand::from_raw(7, 70, 30, 0).unwrap();
        assert_eq!(command.index().as_u8(), 7);
        assert_eq!(command.color(), Rgb::PENDING);
    }

    #[rstest]
    #[case(50, 0, 0, 0)]
    #[case(0, 256, 0, 0)]
    #[case(0, 0, 256, 0)]
    #[case(0, 0, 0, 999)]
    #[case(100, 300, 300, 300)]
    fn test_from_raw_invalid(#[case] index: u16, #[case] r: u16, #[case] g: u16, #[case] b: u16) {
        assert!(LedCommand::from_raw(index, r, g, b).is_err());
    }

    #[test]
    fn test_to_frame() {
        let command = LedCommand::from_raw(3, 90, 0, 12).unwrap();
        assert_eq!(command.to_frame(), [3, 90, 0, 12]);
    }
}
