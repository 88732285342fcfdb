//! Places returned by discovery adapters and resolved locality coordinates.

use geo::Coord;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A point of interest returned by a discovery query.
///
/// Coordinates are WGS84 with `x = longitude` and `y = latitude`.
///
/// # Examples
/// ```
/// use locality_core::{Place, lat_lng};
///
/// let place = Place::new(Some("ChIJ123".into()), "Trinity Metro", lat_lng(12.97, 77.62))
///     .with_rating(4.2)
///     .with_vicinity("MG Road");
///
/// assert_eq!(place.dedup_key(), "ChIJ123");
/// assert_eq!(place.vicinity.as_deref(), Some("MG Road"));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Place {
    /// Provider-assigned identifier, when the provider supplies one.
    pub id: Option<String>,
    /// Display name.
    pub name: String,
    /// Geospatial position.
    pub location: Coord<f64>,
    /// Average user rating, if published.
    pub rating: Option<f32>,
    /// Short address fragment.
    pub vicinity: Option<String>,
}

impl Place {
    /// Construct a `Place` without rating or vicinity.
    #[must_use]
    pub fn new(id: Option<String>, name: impl Into<String>, location: Coord<f64>) -> Self {
        Self {
            id,
            name: name.into(),
            location,
            rating: None,
            vicinity: None,
        }
    }

    /// Attach a user rating.
    #[must_use]
    pub const fn with_rating(mut self, rating: f32) -> Self {
        self.rating = Some(rating);
        self
    }

    /// Attach a short address fragment.
    #[must_use]
    pub fn with_vicinity(mut self, vicinity: impl Into<String>) -> Self {
        self.vicinity = Some(vicinity.into());
        self
    }

    /// Key used to collapse the same physical place reported under several
    /// place-type tags.
    ///
    /// The provider id wins when present and non-blank; otherwise the display
    /// name stands in.
    #[must_use]
    pub fn dedup_key(&self) -> &str {
        self.id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .unwrap_or(&self.name)
    }
}

/// A resolved locality returned by geocoding.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ResolvedLocation {
    /// Coordinate of the locality centre.
    pub location: Coord<f64>,
    /// Provider-formatted address.
    pub display_name: String,
}

impl ResolvedLocation {
    /// Construct a resolved location.
    #[must_use]
    pub fn new(location: Coord<f64>, display_name: impl Into<String>) -> Self {
        Self {
            location,
            display_name: display_name.into(),
        }
    }
}
