// Page configuration for the booking form
// Everything the page used to expose through globals and data attributes is carried here

use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonParseError(String),

    #[error("Invalid attribute: {0}")]
    InvalidAttribute(String),

    #[error("Missing availability endpoint")]
    MissingEndpoint,
}

// HTTP client settings for the availability endpoint
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    pub timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self { timeout_ms: 10_000 }
    }
}

// A room the guest can pick from the selector
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RoomOption {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub nightly_rate: Decimal,
}

impl RoomOption {
    pub fn new(id: impl Into<String>, nightly_rate: Decimal) -> Self {
        Self {
            id: id.into(),
            name: None,
            nightly_rate,
        }
    }

    /// Builds a room from its raw `data-price` attribute. A missing or
    /// unparseable price becomes zero, which keeps the estimator idle for
    /// that room.
    pub fn from_data_price(id: impl Into<String>, data_price: Option<&str>) -> Self {
        let nightly_rate = data_price
            .and_then(|raw| Decimal::from_str(raw.trim()).ok())
            .unwrap_or(Decimal::ZERO);
        Self::new(id, nightly_rate)
    }
}

// A gallery thumbnail and the full-resolution image it points at
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Thumbnail {
    pub id: String,
    pub full_image: String,
}

/// Dates that are already reserved. Fixed for the lifetime of the page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct BookedDates(BTreeSet<NaiveDate>);

impl BookedDates {
    pub fn new(dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self(dates.into_iter().collect())
    }

    /// Parses the JSON array carried by a `data-booked-dates` attribute.
    /// An absent attribute means no booked dates.
    pub fn from_attribute(attribute: Option<&str>) -> Result<Self, ConfigError> {
        let raw = match attribute {
            Some(raw) if !raw.trim().is_empty() => raw,
            _ => return Ok(Self::default()),
        };

        let iso: Vec<String> = serde_json::from_str(raw)
            .map_err(|e| ConfigError::InvalidAttribute(format!("data-booked-dates: {}", e)))?;

        iso.iter()
            .map(|s| {
                NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| {
                    ConfigError::InvalidAttribute(format!("booked date {:?}: {}", s, e))
                })
            })
            .collect::<Result<BTreeSet<_>, _>>()
            .map(Self)
    }

    pub fn contains(&self, date: &NaiveDate) -> bool {
        self.0.contains(date)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NaiveDate> {
        self.0.iter()
    }
}

// Everything the controller needs at initialization
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PageConfig {
    pub availability_url: String,
    pub booked_dates: BookedDates,
    pub rooms: Vec<RoomOption>,
    pub thumbnails: Vec<Thumbnail>,
    pub main_image: Option<String>,
    // Overrides the page-load "today"; local date is used when absent
    pub today: Option<NaiveDate>,
    pub client: ClientConfig,
}

impl PageConfig {
    pub fn from_json(json_str: &str) -> Result<Self, ConfigError> {
        let config: PageConfig = serde_json::from_str(json_str)
            .map_err(|e| ConfigError::JsonParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.availability_url.trim().is_empty() {
            return Err(ConfigError::MissingEndpoint);
        }
        Ok(())
    }

    // "today" as seen when the page loaded
    pub fn resolve_today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    pub fn room(&self, id: &str) -> Option<&RoomOption> {
        self.rooms.iter().find(|room| room.id == id)
    }
}

// Sample page configuration shipped with the crate
pub const SAMPLE_PAGE_PATH: &str = "samples/booking_page.json";
