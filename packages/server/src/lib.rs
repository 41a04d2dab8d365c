// Civic Signals - Identity & Verification Core
//
// This crate provides the identity, authorization, and verification-token
// subsystem of the civic-reporting platform: single-use verification codes
// (email verification, chat account linking), role-gated endpoint
// authorization, and report visibility filtering.
//
// HTTP routing, session resolution, and code delivery (email / chat bot)
// live in the boundary services that consume this crate.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;

pub use config::*;
