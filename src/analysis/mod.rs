//! Analysis module for data export.

pub mod export;

pub use export::{ExportManifest, ExportSystem};
