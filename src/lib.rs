//! Facade crate for the locality infrastructure engine.
//!
//! This crate re-exports the core scoring types and exposes the Google Maps
//! discovery adapter behind the `google-maps` feature.

#![forbid(unsafe_code)]

pub use locality_core::{
    AnalysisDetail, AnalysisError, AnalysisOutcome, AnalysisResult, CategoryDefinition,
    CategoryError, CategoryReport, CategoryScore, CategoryTable, CollectorConfig,
    CredentialError, DiscoveryError, FallbackReason, InfrastructureAnalyzer, NEUTRAL_SCORE, Place,
    PlaceDiscovery, ResolvedLocation, lat_lng,
};

#[cfg(feature = "google-maps")]
pub use locality_data::places::{GoogleMapsConfig, GoogleMapsDiscovery, ProviderBuildError};
