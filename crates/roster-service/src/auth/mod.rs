//! File access authorization.
//!
//! ## Module Organization
//!
//! - `authorize`: Access authorizer, grants and `AuthorizationResult`
//! - `casbin`: Casbin enforcer initialization for role tiers
//! - `directory`: File and membership lookups (`AccessDirectory`)
//! - `filter`: List filter and list authorization
//! - `params`: Request parameters at the service boundary
//! - `policy`: Visibility policy (`requirement_for`)
//! - `service`: `FileAccessService` used by route handlers
//! - `tier`: Role tiers and the `TierTable` snapshot

pub mod authorize;
pub mod casbin;
pub mod directory;
pub mod filter;
pub mod params;
pub mod policy;
pub mod service;
pub mod tier;

// Re-export commonly used types at module level
pub use authorize::{AuthorizationResult, Authorizer, DenialReason, Grant};
pub use self::casbin::{init_casbin, load_tier_table};
pub use directory::{AccessDirectory, Catalog, InMemoryDirectory, MemberEntry};
pub use params::{FileAccessParams, FileListParams, FilterParams, RequesterParams};
pub use policy::{OwnerSlot, Requirement, requirement_for, requirement_for_file};
pub use service::{FileAccessService, ListOutcome, denial_status_code, status_for_error};
pub use tier::{Tier, TierTable};
