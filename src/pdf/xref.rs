//! Classic cross-reference table construction

use std::fmt::Write;
use crate::error::{Error, Result};
use super::scanner::ObjectTable;

/// Flag of an xref entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryFlag {
    InUse,
    Free,
}

impl EntryFlag {
    fn as_char(self) -> char {
        match self {
            EntryFlag::InUse => 'n',
            EntryFlag::Free => 'f',
        }
    }
}

/// One row of the table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XrefEntry {
    pub offset: u64,
    pub generation: u32,
    pub flag: EntryFlag,
}

impl XrefEntry {
    /// Entry 0, head of the free list
    pub const ZERO: XrefEntry = XrefEntry {
        offset: 0,
        generation: 65535,
        flag: EntryFlag::Free,
    };

    /// Fixed-width row text, trailing space included
    pub fn render(&self) -> String {
        format!("{:010} {:05} {} ", self.offset, self.generation, self.flag.as_char())
    }
}

/// Rows for IDs `0..=max_id`
///
/// The table must already be dense: stub every hole before calling this.
pub fn xref_entries(table: &ObjectTable<'_>, holes: &[u32]) -> Result<Vec<XrefEntry>> {
    let max_id = table.max_id().ok_or(Error::EmptyObjectTable)?;
    if table.len() != max_id as usize {
        return Err(Error::HolesInObjectTable {
            distinct: table.len(),
            max_id,
        });
    }

    let mut entries = Vec::with_capacity(table.len() + 1);
    entries.push(XrefEntry::ZERO);

    for (id, obj) in table.iter() {
        let entry = if holes.contains(&id) {
            XrefEntry {
                offset: obj.byte_offset as u64,
                generation: 0,
                flag: EntryFlag::Free,
            }
        } else {
            XrefEntry {
                offset: obj.byte_offset as u64,
                generation: u32::from(obj.generation),
                flag: EntryFlag::InUse,
            }
        };
        entries.push(entry);
    }

    Ok(entries)
}

/// Render the `xref` section covering every object in `table`
///
/// IDs listed in `holes` are marked free.
pub fn construct_xref(table: &ObjectTable<'_>, holes: &[u32]) -> Result<Vec<u8>> {
    let entries = xref_entries(table, holes)?;

    let mut out = String::with_capacity(entries.len() * 21 + 16);
    // Infallible for String
    let _ = write!(out, "\nxref\n0 {}", entries.len());
    for entry in &entries {
        out.push('\n');
        out.push_str(&entry.render());
    }

    log::info!("Built xref table with {} entries ({} free stubs)", entries.len(), holes.len());
    Ok(out.into_bytes())
}
