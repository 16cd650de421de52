//! Ferrous Names Application Layer
//!
//! Ports the resolution engine depends on. Infrastructure provides the
//! concrete adapters; tests provide mocks.
pub mod ports;
