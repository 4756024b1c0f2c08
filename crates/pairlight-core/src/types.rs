use crate::{
    Result,
    constants::{MAX_COLOR, STRIP_LED_COUNT},
    error::Error,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of one LED on the strip.
///
/// Guaranteed to be below [`STRIP_LED_COUNT`] by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LedIndex(u8);

impl LedIndex {
    /// Create a new LED index with validation.
    ///
    /// # Errors
    /// Returns `Error::LedIndexOutOfRange` if the value is not below
    /// [`STRIP_LED_COUNT`].
    pub fn new(value: u16) -> Result<Self> {
        if value >= u16::from(STRIP_LED_COUNT) {
            return Err(Error::LedIndexOutOfRange {
                value,
                limit: STRIP_LED_COUNT,
            });
        }
        Ok(LedIndex(value as u8))
    }

    /// Get the raw index as u8.
    #[must_use]
    pub fn as_u8(&self) -> u8 {
        self.0
    }

    /// Iterate over every valid index on the strip, in order.
    pub fn all() -> impl Iterator<Item = LedIndex> {
        (0..STRIP_LED_COUNT).map(LedIndex)
    }
}

impl fmt::Display for LedIndex {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An RGB color triple, one byte per channel.
///
/// Out-of-range components are unrepresentable here; the runtime [0,256)
/// check required at the untyped boundary lives in [`Rgb::from_raw`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// All channels off.
    pub const OFF: Rgb = Rgb::new(0, 0, 0);

    /// Amber, shown on the LED of a scanned barcode awaiting its partner.
    pub const PENDING: Rgb = Rgb::new(70, 30, 0);

    /// Green, shown on both LEDs of a resolved pair.
    pub const MATCHED: Rgb = Rgb::new(0, 90, 0);

    /// Red, shown on both LEDs of a failed match attempt.
    pub const REJECTED: Rgb = Rgb::new(90, 0, 0);

    /// Red, the resting color of every registered LED after a session reset.
    pub const IDLE: Rgb = Rgb::new(90, 0, 0);

    /// Create a color from its components.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    /// Create a color from unvalidated components.
    ///
    /// # Errors
    /// Returns `Error::ColorOutOfRange` naming the first component that is
    /// not in `[0, 256)`.
    pub fn from_raw(r: u16, g: u16, b: u16) -> Result<Self> {
        for (channel, value) in [('r', r), ('g', g), ('b', b)] {
            if value > MAX_COLOR {
                return Err(Error::ColorOutOfRange { channel, value });
            }
        }
        Ok(Rgb::new(r as u8, g as u8, b as u8))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({},{},{})", self.r, self.g, self.b)
    }
}

/// The string payload of one barcode scan event.
///
/// Normalized (trimmed) and guaranteed non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Barcode(String);

impl Barcode {
    /// Create a new barcode token with validation.
    ///
    /// The token is trimmed before validation.
    ///
    /// # Errors
    /// Returns `Error::InvalidBarcode` if the trimmed token is empty.
    pub fn new(token: &str) -> Result<Self> {
        let token = token.trim();
        if token.is_empty() {
            return Err(Error::InvalidBarcode("empty token".to_string()));
        }
        Ok(Barcode(token.to_string()))
    }

    /// Get the token as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Barcode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Barcode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Barcode::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0)]
    #[case(25)]
    #[case(49)]
    fn test_led_index_valid(#[case] value: u16) {
        let index = LedIndex::new(value).unwrap();
        assert_eq!(index.as_u8(), value as u8);
    }

    #[rstest]
    #[case(50)]
    #[case(255)]
    #[case(1000)]
    fn test_led_index_invalid(#[case] value: u16) {
        assert!(LedIndex::new(value).is_err());
    }

    #[test]
    fn test_led_index_all_covers_strip() {
        let all: Vec<_> = LedIndex::all().collect();
        assert_eq!(all.len(), 50);
        assert_eq!(all[0].as_u8(), 0);
        assert_eq!(all[49].as_u8(), 49);
    }

    #[test]
    fn test_rgb_from_raw_valid() {
        let color = Rgb::from_raw(70, 30, 0).unwrap();
        assert_eq!(color, Rgb::PENDING);

        assert_eq!(Rgb::from_raw(255, 255, 255).unwrap(), Rgb::new(255, 255, 255));
    }

    #[rstest]
    #[case(256, 0, 0, 'r')]
    #[case(0, 300, 0, 'g')]
    #[case(0, 0, 1000, 'b')]
    fn test_rgb_from_raw_invalid(
        #[case] r: u16,
        #[case] g: u16,
        #[case] b: u16,
        #[case] channel: char,
    ) {
        match Rgb::from_raw(r, g, b) {
            Err(Error::ColorOutOfRange { channel: c, .. }) => assert_eq!(c, channel),
            other => panic!("expected ColorOutOfRange, got {:?}", other),
        }
    }

    #[test]
    fn test_barcode_trims() {
        let barcode = Barcode::new("  4006381333931  ").unwrap();
        assert_eq!(barcode.as_str(), "4006381333931");
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn test_barcode_invalid(#[case] token: &str) {
        assert!(Barcode::new(token).is_err());
    }

    #[test]
    fn test_barcode_from_str() {
        let barcode: Barcode = "code-01".parse().unwrap();
        assert_eq!(barcode.to_string(), "code-01");
    }
}
