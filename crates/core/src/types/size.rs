//! Apparel sizes.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when a size label is not recognised.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown size: {0}")]
pub struct SizeError(pub String);

/// Size selector for products in sized categories.
///
/// Serialized as the bare label (`"S"`, `"M"`, `"L"`, `"XL"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Size {
    S,
    M,
    L,
    XL,
}

impl Size {
    /// Every size, smallest first.
    pub const ALL: [Self; 4] = [Self::S, Self::M, Self::L, Self::XL];

    /// The size pre-selected when the product modal opens.
    pub const DEFAULT: Self = Self::S;

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::S => "S",
            Self::M => "M",
            Self::L => "L",
            Self::XL => "XL",
        }
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Size {
    type Err = SizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim();
        Self::ALL
            .into_iter()
            .find(|size| size.as_str().eq_ignore_ascii_case(label))
            .ok_or_else(|| SizeError(label.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!("M".parse::<Size>().unwrap(), Size::M);
        assert_eq!(" xl".parse::<Size>().unwrap(), Size::XL);
        assert!("XXL".parse::<Size>().is_err());
    }

    #[test]
    fn test_serde() {
        assert_eq!(serde_json::to_string(&Size::XL).unwrap(), "\"XL\"");
        let size: Option<Size> = serde_json::from_str("null").unwrap();
        assert_eq!(size, None);
    }
}
