//! Domain-level constants.
//!
//! These constants define business rules and validation requirements.

// =============================================================================
// User Roles
// =============================================================================

/// Default role carried by regular callers
pub const ROLE_USER: &str = "user";

/// Administrator role; may observe soft-deleted products
pub const ROLE_ADMIN: &str = "admin";

// =============================================================================
// Product
// =============================================================================

/// Number of fractional digits stored for a price
pub const PRICE_SCALE: u32 = 8;

/// Total number of digits stored for a price (NUMERIC(20, 8))
pub const PRICE_PRECISION: u32 = 20;

// =============================================================================
// Pagination
// =============================================================================

/// Default starting page number (1-indexed)
pub const DEFAULT_PAGE_NUMBER: u64 = 1;

/// Default number of items per page
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Maximum allowed items per page to prevent excessive queries
pub const MAX_PAGE_SIZE: u64 = 100;
