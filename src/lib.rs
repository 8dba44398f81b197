// CVR Resolver - Core Library
// Turns versioned registry documents into point-in-time organization records

pub mod temporal;    // Validity periods + current-fact selection
pub mod tree;        // Lenient accessors over the registry JSON tree
pub mod attributes;  // Attribute tag registry (registry code ↔ record field)
pub mod entities;    // Organization record and its value types
pub mod error;       // Typed failures (malformed documents, search)
pub mod employment;  // Employment range codes + granularity reconciliation
pub mod document;    // Raw entity document model
pub mod resolution;  // Field resolution policies
pub mod builder;     // Record builder (document → record as of a date)
pub mod config;      // Resolver configuration (file + env)
pub mod search;      // Query bodies + response interpretation

// Re-export commonly used types
pub use temporal::{select_current, select_current_value, ValidityPeriod, VersionedFact};
pub use attributes::{AttributeTag, ValueKind};
pub use entities::{
    Address, CompanyType, CreditStatus, EmploymentRange, Industries, Industry, Municipality,
    OrganizationRecord,
};
pub use error::{MalformedDocumentError, SearchError};
pub use employment::{reconcile, EmploymentObservation, Granularity, RangeCodeParser};
pub use document::{AttributeGroup, LifecycleSegment, RawEntityDocument, SnapshotMetadata};
pub use resolution::ResolutionPolicy;
pub use builder::{current_life_segment, OrganizationRecordBuilder};
pub use config::ResolverConfig;
pub use search::{SearchQuery, SearchResponse, SearchResult};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
