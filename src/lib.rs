//! Fax PDF Repair Library
//!
//! Repairs PDF documents whose object bodies are intact but whose closing
//! sections were never written, as produced by some fax-to-PDF gateways.
//! This library provides functionality to:
//! - Scan the surviving indirect objects and their byte offsets
//! - Rebuild the `/Pages` root the catalog points to
//! - Stub out gaps in object numbering
//! - Append a classic xref table and a trailer
//! - Re-open the result to confirm it loads
//!
//! # Example
//!
//! ```no_run
//! use fax_pdf_repair::{Repairer, RepairOptions};
//!
//! let damaged = std::fs::read("fax.pdf").expect("Failed to read input");
//! let mut repairer = Repairer::new(damaged, RepairOptions::default());
//! repairer.recover().expect("Failed to repair");
//! std::fs::write("fax-fixed.pdf", repairer.output().unwrap()).expect("Failed to write");
//! ```

pub mod error;
pub mod pdf;
pub mod repair;
pub mod verify;

// Re-export commonly used items
pub use error::{Error, Result};
pub use pdf::{DamageReport, ScanMode};
pub use repair::{repair_file, RepairOptions, RepairSummary, Repairer, SourceBuffer};
pub use verify::{inspect_repaired, RepairedInfo};
