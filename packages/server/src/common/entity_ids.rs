//! Typed ID definitions for all domain entities.
//!
//! One alias per entity, so a `UserId` can never be passed where a `ReportId`
//! belongs.

// Re-export the core Id type and version markers
pub use super::id::{Id, V4, V7};

// ============================================================================
// Entity marker types
// ============================================================================

/// Marker type for user accounts (citizens and municipal staff).
pub struct User;

/// Marker type for citizen-submitted reports.
pub struct Report;

/// Marker type for report categories.
pub struct ReportCategory;

/// Marker type for municipal offices.
pub struct MunicipalOffice;

/// Marker type for issued verification codes.
pub struct IssuedCode;

// ============================================================================
// Type aliases - the primary API
// ============================================================================

/// Typed ID for user accounts.
pub type UserId = Id<User>;

/// Typed ID for reports.
pub type ReportId = Id<Report>;

/// Typed ID for report categories.
pub type CategoryId = Id<ReportCategory>;

/// Typed ID for municipal offices.
pub type OfficeId = Id<MunicipalOffice>;

/// Typed ID for verification codes.
pub type CodeId = Id<IssuedCode>;
