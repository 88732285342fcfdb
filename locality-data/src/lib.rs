//! Discovery adapters for the locality infrastructure engine.
//!
//! Responsibilities:
//! - Implement [`locality_core::PlaceDiscovery`] against real geocoding and
//!   places services.
//! - Translate provider envelopes, HTTP failures and quota rejections into
//!   [`locality_core::DiscoveryError`].
//! - Own adapter configuration and credential validation.
//!
//! Boundaries:
//! - Do not encode scoring rules (live in `locality-core`).
//! - Keep async I/O behind the synchronous discovery trait.
//!
//! Invariants:
//! - API keys never appear in errors, logs or `Debug` output.
//! - No global mutable state.

pub mod places;
