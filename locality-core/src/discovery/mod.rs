//! Discover places around a locality.
//!
//! The `PlaceDiscovery` trait abstracts the two capabilities the engine
//! needs from its environment: geocoding a locality name and searching for
//! places of a given type within a radius. Concrete providers live outside
//! this crate.
//!
//! Errors are typed so callers can tell "nothing exists here" (an empty
//! `Ok`) from "the query failed" (`Err`).

mod error;
mod provider;

pub use error::{CredentialError, DiscoveryError};
pub use provider::PlaceDiscovery;
