//! Error types for the fax PDF repair library

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the fax PDF repair library
#[derive(Error, Debug)]
pub enum Error {
    /// The document cannot be repaired by rebuilding its closing sections
    #[error("Unrecoverable damage: {0}")]
    UnrecoverableDamage(String),

    /// Hole detection or xref construction was attempted without any objects
    #[error("No indirect objects found in source")]
    EmptyObjectTable,

    /// Xref construction was attempted before holes were stubbed out
    #[error("Holes in the object table ({distinct} distinct IDs, max ID {max_id}); stub them before building the xref")]
    HolesInObjectTable { distinct: usize, max_id: u32 },

    /// Repaired output did not open as a PDF with a page tree
    #[error("Verification failed: {0}")]
    Verification(String),

    /// PDF processing error
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),
}
