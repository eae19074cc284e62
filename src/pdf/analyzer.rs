//! Structural probes over a scanned source
//!
//! Keyword detection here is substring matching on lines, not tokenizing.
//! A content line that mentions "xref" or "trailer" in prose will be taken
//! as the real thing. Callers go through [`has_structural_keyword`] so the
//! rule can be tightened in one place.

use crate::error::{Error, Result};
use super::scanner::{find_subslice, split_lines, IndirectObject};

/// `/Type` value of the document catalog
pub const TYPE_CATALOG: &[u8] = b"/Catalog";
/// `/Type` value of a page tree node
pub const TYPE_PAGES: &[u8] = b"/Pages";
/// `/Type` value of a page leaf
pub const TYPE_PAGE: &[u8] = b"/Page";

/// Whether any line of `source` contains `keyword`
pub fn has_structural_keyword(source: &[u8], keyword: &[u8]) -> bool {
    split_lines(source)
        .iter()
        .any(|line| find_subslice(line.content, keyword, 0).is_some())
}

pub fn xref_is_missing(source: &[u8]) -> bool {
    !has_structural_keyword(source, b"xref")
}

pub fn trailer_is_missing(source: &[u8]) -> bool {
    !has_structural_keyword(source, b"trailer")
}

pub fn pages_is_missing(objects: &[IndirectObject]) -> bool {
    find_by_type(objects, TYPE_PAGES).is_empty()
}

/// All objects whose `/Type` token equals `type_literal`, in discovery order
pub fn find_by_type<'a>(objects: &'a [IndirectObject], type_literal: &[u8]) -> Vec<&'a IndirectObject> {
    objects
        .iter()
        .filter(|obj| obj.object_type() == Some(type_literal))
        .collect()
}

/// First object carrying both `/Title` and `/Creator`
pub fn find_info_object(objects: &[IndirectObject]) -> Option<&IndirectObject> {
    objects
        .iter()
        .find(|obj| obj.contains(b"/Title") && obj.contains(b"/Creator"))
}

/// The first `/Type /Catalog` object
///
/// A document without one has nothing to hang a trailer on.
pub fn find_catalog(objects: &[IndirectObject]) -> Result<&IndirectObject> {
    let catalog = objects
        .iter()
        .find(|obj| obj.object_type() == Some(TYPE_CATALOG))
        .ok_or_else(|| Error::UnrecoverableDamage("no /Catalog object found".to_string()))?;
    log::debug!("Catalog is object {}", catalog.reference());
    Ok(catalog)
}

/// Which closing sections are absent from a source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DamageReport {
    pub trailer_missing: bool,
    pub pages_missing: bool,
    pub xref_missing: bool,
}

impl DamageReport {
    pub fn inspect(source: &[u8], objects: &[IndirectObject]) -> Self {
        Self {
            trailer_missing: trailer_is_missing(source),
            pages_missing: pages_is_missing(objects),
            xref_missing: xref_is_missing(source),
        }
    }

    /// Names of the missing parts, in report order
    pub fn missing_parts(&self) -> Vec<&'static str> {
        let mut parts = Vec::new();
        if self.trailer_missing {
            parts.push("Trailer");
        }
        if self.pages_missing {
            parts.push("Pages");
        }
        if self.xref_missing {
            parts.push("Xref");
        }
        parts
    }
}
