//! Resource registry for the maestro orchestrator.
//!
//! A *resource* is a declarative descriptor (skill, command, agent or
//! prompt) discovered on disk. This crate implements the full registry
//! pipeline:
//!
//! 1. **Scan**: [`scanner::ResourceScanner`] walks the user-scope and
//!    project-scope roots, recognising flat, categorised and
//!    directory-based layouts
//! 2. **Parse**: [`parser`] reads descriptor files (YAML front matter
//!    or H1 + `key: value` metadata) and captures `##` sections in order
//! 3. **Index**: [`registry::UnifiedRegistry`] keys resources by
//!    namespace (`<type>:<name>`) with secondary indexes by type and tag
//! 4. **Persist**: [`persistence::RegistryPersistence`] materialises
//!    scans to disk and validates them against content fingerprints and
//!    a TTL
//!
//! Parsing failures are fail-open: a malformed descriptor produces one
//! warning and is skipped; the scan as a whole continues.

pub mod parser;
pub mod persistence;
pub mod registry;
pub mod resource;
pub mod scanner;

mod error;

pub use error::RegistryError;
pub use error::Result;
pub use parser::ParsedDescriptor;
pub use parser::parse_descriptor;
pub use persistence::CacheStats;
pub use persistence::CacheStatus;
pub use persistence::RegistryPersistence;
pub use persistence::ScanSnapshot;
pub use registry::RegistryStats;
pub use registry::UnifiedRegistry;
pub use resource::ConfigValue;
pub use resource::Resource;
pub use resource::ResourceKind;
pub use resource::ResourceScope;
pub use resource::Section;
pub use scanner::ResourceScanner;
pub use scanner::ScanOutcome;
pub use scanner::ScanWarning;
