//! Gap detection in object numbering
//!
//! A hole is signalled when the number of distinct IDs differs from the
//! highest ID. That only holds when numbering starts at 1; it is not a full
//! set difference.

use crate::error::{Error, Result};
use super::scanner::ObjectTable;

/// Stub objects for every missing ID, and the IDs themselves
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HoleReport {
    /// Section text to append, empty when there are no holes
    pub stubs: Vec<u8>,
    /// Missing IDs in ascending order
    pub holes: Vec<u32>,
}

/// Placeholder object body for a missing ID
pub fn stub_object(id: u32) -> String {
    format!("{} 0 obj\n-1\nendobj", id)
}

/// Find the IDs in `1..=max_id` that have no object and build a stub for each
pub fn check_holes(table: &ObjectTable<'_>) -> Result<HoleReport> {
    let max_id = table.max_id().ok_or(Error::EmptyObjectTable)?;

    if table.len() == max_id as usize {
        return Ok(HoleReport::default());
    }

    let holes: Vec<u32> = (1..=max_id).filter(|id| !table.contains(*id)).collect();
    log::info!("Object numbering has {} hole(s): {:?}", holes.len(), holes);

    let mut stubs = String::new();
    for id in &holes {
        stubs.push('\n');
        stubs.push_str(&stub_object(*id));
    }

    Ok(HoleReport {
        stubs: stubs.into_bytes(),
        holes,
    })
}
