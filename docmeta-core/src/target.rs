//! Target kinds an annotation can be attached to.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Program elements an annotation may decorate.
    ///
    /// The empty set means "unspecified" and disables target checks.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Targets: u8 {
        const CLASS = 0b0000_0001;
        const METHOD = 0b0000_0010;
        const PROPERTY = 0b0000_0100;
        /// Nested inside another annotation's argument list
        const ANNOTATION = 0b0000_1000;
        const ALL = Self::CLASS.bits()
            | Self::METHOD.bits()
            | Self::PROPERTY.bits()
            | Self::ANNOTATION.bits();
    }
}

impl Default for Targets {
    fn default() -> Self {
        Self::empty()
    }
}

/// Literal names accepted by `@Target`, in display order.
pub const TARGET_LITERALS: [(&str, Targets); 5] = [
    ("ALL", Targets::ALL),
    ("CLASS", Targets::CLASS),
    ("METHOD", Targets::METHOD),
    ("PROPERTY", Targets::PROPERTY),
    ("ANNOTATION", Targets::ANNOTATION),
];

impl Targets {
    /// Look up a `@Target` literal such as `"PROPERTY"`.
    pub fn from_literal(literal: &str) -> Option<Self> {
        TARGET_LITERALS
            .iter()
            .find(|(name, _)| *name == literal)
            .map(|(_, flags)| *flags)
    }

    /// Human-readable label, e.g. `"METHOD, PROPERTY"`.
    pub fn label(&self) -> String {
        if self.contains(Targets::ALL) {
            return "ALL".to_string();
        }
        TARGET_LITERALS
            .iter()
            .skip(1)
            .filter(|(_, flags)| self.contains(*flags))
            .map(|(name, _)| *name)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

// bitflags 2.x serializes as a name list by default; keep the raw bits.
impl Serialize for Targets {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.bits().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Targets {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bits = u8::deserialize(deserializer)?;
        Self::from_bits(bits).ok_or_else(|| {
            serde::de::Error::custom(format!("invalid Targets bits: {:#04x}", bits))
        })
    }
}
