//! Post-repair verification
//!
//! Loads the repaired bytes with lopdf, which reads the rebuilt xref table
//! and trailer, then follows `/Root` to the page tree.

use lopdf::{Document, Object};
use crate::error::{Error, Result};

/// What a repaired document looks like once opened
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepairedInfo {
    /// `/Count` of the page tree root
    pub page_count: usize,
    /// Document title from the Info dictionary (if present)
    pub title: Option<String>,
}

/// Read the Count field from the Pages dictionary the catalog points to
fn count_pages_from_catalog(doc: &Document) -> Result<usize> {
    let catalog_ref = doc.trailer.get(b"Root")
        .map_err(|_| Error::Verification("No Root in trailer".to_string()))?;

    let catalog_id = match catalog_ref {
        Object::Reference(id) => *id,
        _ => return Err(Error::Verification("Root is not a reference".to_string())),
    };

    let catalog_dict = match doc.get_object(catalog_id)? {
        Object::Dictionary(dict) => dict,
        _ => return Err(Error::Verification("Catalog is not a dictionary".to_string())),
    };

    let pages_id = match catalog_dict.get(b"Pages") {
        Ok(Object::Reference(id)) => *id,
        Ok(_) => return Err(Error::Verification("Pages is not a reference".to_string())),
        Err(_) => return Err(Error::Verification("No Pages in catalog".to_string())),
    };

    let pages_dict = match doc.get_object(pages_id)? {
        Object::Dictionary(dict) => dict,
        _ => return Err(Error::Verification("Pages is not a dictionary".to_string())),
    };

    match pages_dict.get(b"Count") {
        Ok(Object::Integer(n)) if *n >= 0 => Ok(*n as usize),
        Ok(_) => Err(Error::Verification("Count is not a non-negative integer".to_string())),
        Err(_) => Err(Error::Verification("No Count in Pages".to_string())),
    }
}

fn title_from_info(doc: &Document) -> Option<String> {
    let info_id = match doc.trailer.get(b"Info").ok()? {
        Object::Reference(id) => *id,
        _ => return None,
    };

    match doc.get_object(info_id).ok()? {
        Object::Dictionary(info_dict) => {
            let title_bytes = info_dict.get(b"Title").ok()?.as_str().ok()?;
            String::from_utf8(title_bytes.to_vec()).ok()
        }
        _ => None,
    }
}

/// Open repaired bytes and read back the page count and title
pub fn inspect_repaired(bytes: &[u8]) -> Result<RepairedInfo> {
    let doc = Document::load_mem(bytes)?;
    let page_count = count_pages_from_catalog(&doc)?;

    Ok(RepairedInfo {
        page_count,
        title: title_from_info(&doc),
    })
}
