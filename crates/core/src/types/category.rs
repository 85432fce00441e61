//! Product categories.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when a category slug is not recognised.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown category: {0}")]
pub struct CategoryError(pub String);

/// The fixed set of product categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Futbol,
    Running,
    Baloncesto,
    Entrenamiento,
}

impl Category {
    /// Every category, in filter-bar order.
    pub const ALL: [Self; 4] = [
        Self::Futbol,
        Self::Running,
        Self::Baloncesto,
        Self::Entrenamiento,
    ];

    /// URL and data slug.
    #[must_use]
    pub const fn slug(&self) -> &'static str {
        match self {
            Self::Futbol => "futbol",
            Self::Running => "running",
            Self::Baloncesto => "baloncesto",
            Self::Entrenamiento => "entrenamiento",
        }
    }

    /// Display label: the slug with its first letter upper-cased.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Futbol => "Futbol",
            Self::Running => "Running",
            Self::Baloncesto => "Baloncesto",
            Self::Entrenamiento => "Entrenamiento",
        }
    }

    /// Whether products in this category are sold by size.
    #[must_use]
    pub const fn is_sized(&self) -> bool {
        matches!(self, Self::Futbol | Self::Running | Self::Entrenamiento)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Category {
    type Err = CategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let slug = s.trim();
        Self::ALL
            .into_iter()
            .find(|category| category.slug().eq_ignore_ascii_case(slug))
            .ok_or_else(|| CategoryError(slug.to_string()))
    }
}
