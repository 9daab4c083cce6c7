//! Category colours

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// How categories get their colour.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColourScheme {
    /// Derived from a SHA-256 digest of the category name
    #[default]
    Hashed,
    /// Taken from the list in category order, wrapping around
    Palette(Vec<String>),
}

impl ColourScheme {
    /// One colour per category, same order.
    pub fn assign(&self, categories: &[String]) -> Result<Vec<String>> {
        match self {
            ColourScheme::Hashed => Ok(categories.iter().map(|c| hashed_colour(c)).collect()),
            ColourScheme::Palette(colours) if colours.is_empty() => {
                Err(Error::format("colour palette is empty"))
            }
            ColourScheme::Palette(colours) => {
                Ok((0..categories.len()).map(|i| colours[i % colours.len()].clone()).collect())
            }
        }
    }
}

/// `#RRGGBB` from the first three digest bytes of `name`.
pub fn hashed_colour(name: &str) -> String {
    let digest = Sha256::digest(name.as_bytes());
    format!("#{:02X}{:02X}{:02X}", digest[0], digest[1], digest[2])
}
