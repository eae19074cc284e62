//! Structural recovery components

pub mod scanner;
pub mod analyzer;
pub mod holes;
pub mod pages;
pub mod xref;
pub mod trailer;

// Re-export commonly used items
pub use scanner::{scan_objects, split_lines, IndirectObject, Line, ObjectRef, ObjectTable, ScanMode};
pub use analyzer::{
    find_by_type, find_catalog, find_info_object, has_structural_keyword,
    pages_is_missing, trailer_is_missing, xref_is_missing, DamageReport,
};
pub use holes::{check_holes, HoleReport};
pub use pages::{catalog_pages_reference, construct_pages, SynthesizedPages};
pub use xref::{construct_xref, xref_entries, EntryFlag, XrefEntry};
pub use trailer::{construct_trailer, locate_xref, TrailerSection};
