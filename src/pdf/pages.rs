//! Page tree root reconstruction
//!
//! The catalog of a truncated fax still names its `/Pages` object, so the
//! rebuilt node reuses that exact reference and the catalog stays untouched.

use crate::error::{Error, Result};
use super::analyzer::{find_by_type, find_catalog, TYPE_PAGE};
use super::scanner::{find_subslice, IndirectObject, ObjectRef};

/// A synthesized `/Pages` object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedPages {
    /// Reference taken from the catalog
    pub reference: ObjectRef,
    /// Page objects, in discovery order
    pub kids: Vec<ObjectRef>,
    /// Section text to append
    pub text: Vec<u8>,
}

/// Extract the `/Pages <id> <gen> R` reference from catalog text
///
/// Takes the span from the `/Pages` key up to the next `R` and reads the two
/// numbers that follow the key.
pub fn catalog_pages_reference(catalog_text: &[u8]) -> Option<ObjectRef> {
    let start = find_subslice(catalog_text, b"/Pages", 0)?;
    let end = catalog_text[start..].iter().position(|b| *b == b'R')? + start;

    let mut parts = catalog_text[start..=end]
        .split(|b| b.is_ascii_whitespace())
        .filter(|part| !part.is_empty())
        .skip(1);

    let id = std::str::from_utf8(parts.next()?).ok()?.parse::<u32>().ok()?;
    let generation = std::str::from_utf8(parts.next()?).ok()?.parse::<u16>().ok()?;
    Some(ObjectRef::new(id, generation))
}

/// Build the `/Pages` object the catalog points to, listing every `/Type /Page`
pub fn construct_pages(objects: &[IndirectObject]) -> Result<SynthesizedPages> {
    let catalog = find_catalog(objects)?;
    let reference = catalog_pages_reference(&catalog.raw_text).ok_or_else(|| {
        Error::UnrecoverableDamage(format!(
            "catalog {} has no usable /Pages reference",
            catalog.reference()
        ))
    })?;

    let kids: Vec<ObjectRef> = find_by_type(objects, TYPE_PAGE)
        .iter()
        .map(|page| page.reference())
        .collect();

    if kids.is_empty() {
        log::warn!("No /Page objects found, the rebuilt page tree will be empty");
    }

    let refs = kids
        .iter()
        .map(ObjectRef::to_string)
        .collect::<Vec<_>>()
        .join(" ");

    let text = format!(
        "\n{} {} obj\n<< /Type /Pages\n/Kids [ {} ]\n/Count {}\n>>\nendobj",
        reference.id,
        reference.generation,
        refs,
        kids.len()
    );

    log::info!("Rebuilt page tree {} with {} page(s)", reference, kids.len());

    Ok(SynthesizedPages {
        reference,
        kids,
        text: text.into_bytes(),
    })
}
