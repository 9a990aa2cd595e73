//! Trip locations supplied by the host application.

use serde::{Deserialize, Serialize};

use crate::LngLat;

/// A named place on a trip itinerary.
///
/// Values are immutable inputs owned by the caller. The wire form keeps the
/// host application's field names, including `type` for [`Location::kind`].
///
/// # Examples
/// ```
/// use tripmap_core::{LngLat, Location};
///
/// let json = r#"{"name":"Forbidden City","lat":39.916,"lng":116.397,"type":"attraction"}"#;
/// let location: Location = serde_json::from_str(json)?;
/// assert_eq!(location.position(), LngLat::new(116.397, 39.916));
/// assert_eq!(location.kind_label(), "Attraction");
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Display name.
    pub name: String,
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lng: f64,
    /// Free-form category, usually one of the [`LocationKind`] identifiers.
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Optional description shown in the popup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Location {
    /// Construct a location without a description.
    pub fn new(name: impl Into<String>, position: LngLat, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lat: position.lat,
            lng: position.lng,
            kind: kind.into(),
            description: None,
        }
    }

    /// Attach a description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// The location's position.
    #[must_use]
    pub const fn position(&self) -> LngLat {
        LngLat::new(self.lng, self.lat)
    }

    /// Human readable category, falling back to the raw `type` string.
    #[must_use]
    pub fn kind_label(&self) -> &str {
        self.kind
            .parse::<LocationKind>()
            .map_or(self.kind.as_str(), |kind| kind.label())
    }
}

/// Location categories the host application emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocationKind {
    /// Sights and landmarks.
    Attraction,
    /// Places to eat.
    Restaurant,
    /// Museums, temples, theatres.
    Cultural,
    /// Markets and shopping streets.
    Shopping,
    /// Accommodation.
    Hotel,
}

impl LocationKind {
    /// Identifier used in the `type` field.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Attraction => "attraction",
            Self::Restaurant => "restaurant",
            Self::Cultural => "cultural",
            Self::Shopping => "shopping",
            Self::Hotel => "hotel",
        }
    }

    /// Display label used in popups.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Attraction => "Attraction",
            Self::Restaurant => "Restaurant",
            Self::Cultural => "Cultural venue",
            Self::Shopping => "Shopping",
            Self::Hotel => "Hotel",
        }
    }
}

impl std::fmt::Display for LocationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LocationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "attraction" => Ok(Self::Attraction),
            "restaurant" => Ok(Self::Restaurant),
            "cultural" => Ok(Self::Cultural),
            "shopping" => Ok(Self::Shopping),
            "hotel" => Ok(Self::Hotel),
            _ => Err(format!("unknown location type '{s}'")),
        }
    }
}
