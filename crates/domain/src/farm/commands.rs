//! Farm commands.

/// Command to register a new farm.
#[derive(Debug, Clone)]
pub struct CreateFarm {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub owner: Option<String>,
}

impl CreateFarm {
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.into(),
            latitude,
            longitude,
            owner: None,
        }
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }
}

/// Partial changes to a farm.
///
/// `owner: Some(None)` clears the owner; `None` leaves it as it is.
#[derive(Debug, Clone, Default)]
pub struct UpdateFarm {
    pub name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub owner: Option<Option<String>>,
}

impl UpdateFarm {
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn relocate(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude: Some(latitude),
            longitude: Some(longitude),
            ..Self::default()
        }
    }
}
