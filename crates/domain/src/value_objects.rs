//! Validated value objects shared by the farm aggregates.
//!
//! Every constructor either returns a valid value or a [`ValidationError`];
//! there is no partially valid instance. Values are immutable and compare
//! by value.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Maximum length of a name, in characters.
pub const MAX_NAME_LEN: usize = 120;

/// A trimmed, non-empty label.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Name(String);

impl Name {
    /// Validates a name for the given field.
    ///
    /// Surrounding whitespace is removed before the length rules apply.
    pub fn new(field: &'static str, value: impl AsRef<str>) -> Result<Self, ValidationError> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field });
        }
        let len = trimmed.chars().count();
        if len > MAX_NAME_LEN {
            return Err(ValidationError::TooLong {
                field,
                max: MAX_NAME_LEN,
                actual: len,
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Name {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A strictly positive, finite length in metres.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Metres(f64);

impl Metres {
    pub fn new(field: &'static str, value: f64) -> Result<Self, ValidationError> {
        if !value.is_finite() || value <= 0.0 {
            return Err(ValidationError::NotPositive { field, value });
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

/// A point on the globe in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, ValidationError> {
        check_range("latitude", latitude, -90.0, 90.0)?;
        check_range("longitude", longitude, -180.0, 180.0)?;
        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value < min || value > max {
        return Err(ValidationError::OutOfRange {
            field,
            min,
            max,
            value,
        });
    }
    Ok(())
}

/// Days from planting to harvest, between 1 and 730.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DaysToMaturity(u16);

impl DaysToMaturity {
    pub const MIN: u16 = 1;
    pub const MAX: u16 = 730;

    pub fn new(days: u16) -> Result<Self, ValidationError> {
        if !(Self::MIN..=Self::MAX).contains(&days) {
            return Err(ValidationError::OutOfRange {
                field: "days to maturity",
                min: f64::from(Self::MIN),
                max: f64::from(Self::MAX),
                value: f64::from(days),
            });
        }
        Ok(Self(days))
    }

    pub fn days(&self) -> u16 {
        self.0
    }
}

/// A positive count of harvested units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Quantity(u32);

impl Quantity {
    pub fn new(value: u32) -> Result<Self, ValidationError> {
        if value == 0 {
            return Err(ValidationError::NotPositive {
                field: "quantity",
                value: 0.0,
            });
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

/// Closed sets of values stored as lowercase strings.
///
/// Deserialization rejects anything outside the set; `FromStr` reports the
/// same rejection as a [`ValidationError`] for callers holding raw input.
pub trait Enumerated: Copy + Sized + 'static {
    /// Field name used in validation messages.
    const FIELD: &'static str;

    /// Every member, in declaration order.
    const ALL: &'static [Self];

    fn as_str(&self) -> &'static str;

    fn parse(value: &str) -> Result<Self, ValidationError> {
        let wanted = value.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|v| v.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ValidationError::InvalidVariant {
                field: Self::FIELD,
                value: value.to_string(),
                allowed: Self::ALL
                    .iter()
                    .map(|v| v.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}

macro_rules! enumerated {
    ($(#[$meta:meta])* $name:ident, $field:literal { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl Enumerated for $name {
            const FIELD: &'static str = $field;
            const ALL: &'static [Self] = &[$(Self::$variant),+];

            fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                <Self as Enumerated>::parse(s)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

enumerated!(
    /// Dominant soil of a plot.
    SoilType, "soil type" {
        Clay => "clay",
        Sandy => "sandy",
        Silt => "silt",
        Loam => "loam",
        Peat => "peat",
        Chalk => "chalk",
    }
);

enumerated!(
    /// Botanical grouping of a crop variety.
    CropCategory, "crop category" {
        Vegetable => "vegetable",
        Fruit => "fruit",
        Herb => "herb",
        Grain => "grain",
        Legume => "legume",
        Flower => "flower",
    }
);

enumerated!(
    /// Where a crop is in its season.
    CropStatus, "crop status" {
        Planned => "planned",
        Planted => "planted",
        Growing => "growing",
        Harvested => "harvested",
        Failed => "failed",
    }
);
