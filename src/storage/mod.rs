//! Storage for the mirror: on-disk layout and in-memory fingerprints.

pub mod fingerprints;
pub mod local;

// Re-export for convenience
pub use fingerprints::FingerprintStore;
pub use local::LocalStorage;
