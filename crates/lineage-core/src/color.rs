//! Color handling for lineage styling
//!
//! This module provides the [`Color`] type which wraps the `DynamicColor` type
//! from the color crate. Style configuration accepts any CSS color string; the
//! DOT renderer needs them as `#rrggbb` hex strings, which [`Color::to_hex`] produces.

use std::str::FromStr;

use color::{DynamicColor, Srgb};

/// Wrapper around the `DynamicColor` type from the color crate
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Color {
    color: DynamicColor,
}

impl Color {
    /// Create a new `Color` from a string
    /// This will parse CSS color strings such as "#ff0000", "rgb(255, 0, 0)", "red", etc.
    ///
    /// # Examples
    ///
    /// ```
    /// use lineage_core::color::Color;
    ///
    /// let red = Color::new("#ff0000").unwrap();
    /// let blue = Color::new("blue").unwrap();
    /// ```
    pub fn new(color_str: &str) -> Result<Self, String> {
        match DynamicColor::from_str(color_str) {
            Ok(color) => Ok(Self { color }),
            Err(err) => Err(format!("invalid color `{color_str}`: {err}")),
        }
    }

    /// Returns the color as a Graphviz-compatible hex string.
    ///
    /// Opaque colors render as `#rrggbb`; translucent colors carry a trailing
    /// alpha byte (`#rrggbbaa`).
    ///
    /// # Examples
    ///
    /// ```
    /// use lineage_core::color::Color;
    ///
    /// let color = Color::new("rgb(255, 128, 0)").unwrap();
    /// assert_eq!(color.to_hex(), "#ff8000");
    /// ```
    pub fn to_hex(self) -> String {
        let rgba = self.color.to_alpha_color::<Srgb>().to_rgba8();
        if rgba.a == u8::MAX {
            format!("#{:02x}{:02x}{:02x}", rgba.r, rgba.g, rgba.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", rgba.r, rgba.g, rgba.b, rgba.a)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_new() {
        let red = Color::new("#ff0000");
        assert!(red.is_ok());

        let invalid = Color::new("not-a-color");
        assert!(invalid.unwrap_err().contains("not-a-color"));
    }

    #[test]
    fn test_color_to_hex() {
        assert_eq!(Color::new("red").unwrap().to_hex(), "#ff0000");
        assert_eq!(Color::new("#1e90ff").unwrap().to_hex(), "#1e90ff");
    }

    #[test]
    fn test_color_to_hex_translucent() {
        let color = Color::new("rgba(255, 255, 255, 0)").unwrap();
        assert_eq!(color.to_hex(), "#ffffff00");
    }
}
