//! Place discovery trait implemented by geocoding/search providers.

use geo::Coord;

use crate::{Place, ResolvedLocation};

use super::error::{CredentialError, DiscoveryError};

/// Geocode localities and search for nearby places.
///
/// Implementations must be thread-safe (`Send` + `Sync`): the collector
/// issues independent searches from several worker threads at once.
///
/// Contract:
/// - [`PlaceDiscovery::geocode`] returns `Ok(None)` when nothing matches and
///   reserves `Err` for transport or provider failures.
/// - [`PlaceDiscovery::search_nearby`] returns an empty vector when no places
///   of the requested type exist; that is a valid answer, not an error.
/// - [`PlaceDiscovery::check_credentials`] must not perform network I/O; it
///   validates configuration only.
///
/// # Examples
///
/// ```rust
/// use geo::Coord;
/// use locality_core::{DiscoveryError, Place, PlaceDiscovery, ResolvedLocation, lat_lng};
///
/// struct OneStation;
///
/// impl PlaceDiscovery for OneStation {
///     fn geocode(
///         &self,
///         _locality: &str,
///         _region: &str,
///     ) -> Result<Option<ResolvedLocation>, DiscoveryError> {
///         Ok(Some(ResolvedLocation::new(lat_lng(12.935, 77.614), "Koramangala")))
///     }
///
///     fn search_nearby(
///         &self,
///         center: Coord<f64>,
///         place_type: &str,
///         _radius_m: f64,
///     ) -> Result<Vec<Place>, DiscoveryError> {
///         if place_type == "subway_station" {
///             Ok(vec![Place::new(Some("s1".into()), "Station", center)])
///         } else {
///             Ok(Vec::new())
///         }
///     }
/// }
///
/// let found = OneStation.search_nearby(lat_lng(0.0, 0.0), "hospital", 1_000.0)?;
/// assert!(found.is_empty());
/// # Ok::<(), DiscoveryError>(())
/// ```
pub trait PlaceDiscovery: Send + Sync {
    /// Validate configured credentials without contacting the provider.
    ///
    /// The default implementation accepts every configuration, which suits
    /// providers that need no credentials.
    ///
    /// # Errors
    /// Returns [`CredentialError`] when credentials are missing or malformed.
    fn check_credentials(&self) -> Result<(), CredentialError> {
        Ok(())
    }

    /// Resolve a free-text locality within `region` (usually a city name).
    ///
    /// # Errors
    /// Returns [`DiscoveryError`] for transport or provider failures.
    fn geocode(
        &self,
        locality: &str,
        region: &str,
    ) -> Result<Option<ResolvedLocation>, DiscoveryError>;

    /// Find places tagged `place_type` within `radius_m` meters of `center`.
    ///
    /// # Errors
    /// Returns [`DiscoveryError`] for transport, quota or provider failures.
    fn search_nearby(
        &self,
        center: Coord<f64>,
        place_type: &str,
        radius_m: f64,
    ) -> Result<Vec<Place>, DiscoveryError>;
}

impl<T: PlaceDiscovery + ?Sized> PlaceDiscovery for &T {
    fn check_credentials(&self) -> Result<(), CredentialError> {
        (**self).check_credentials()
    }

    fn geocode(
        &self,
        locality: &str,
        region: &str,
    ) -> Result<Option<ResolvedLocation>, DiscoveryError> {
        (**self).geocode(locality, region)
    }

    fn search_nearby(
        &self,
        center: Coord<f64>,
        place_type: &str,
        radius_m: f64,
    ) -> Result<Vec<Place>, DiscoveryError> {
        (**self).search_nearby(center, place_type, radius_m)
    }
}
