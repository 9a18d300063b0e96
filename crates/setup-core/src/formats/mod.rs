//! # Formats
//!
//! Pure byte transformations for persisted data. File and database I/O live
//! in [`crate::storage`] and the app layer.

pub mod persistence;

pub use persistence::{
    ConfigurationSummary, PersistenceHeader, SavedConfiguration, configuration_from_bytes,
    configuration_to_bytes,
};
