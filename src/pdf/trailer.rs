//! Trailer dictionary and `startxref` footer

use crate::error::{Error, Result};
use super::analyzer::{find_catalog, find_info_object};
use super::scanner::{split_lines, IndirectObject, ObjectRef, ObjectTable};

/// The trailer appended after the xref table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrailerSection {
    /// Distinct object count plus one
    pub size: usize,
    pub root: ObjectRef,
    /// Omitted from the dictionary when no Info object exists
    pub info: Option<ObjectRef>,
    /// Offset of the `xref` line in the buffer the trailer is appended to
    pub startxref: usize,
    /// Section text to append
    pub text: Vec<u8>,
}

/// Byte offset of the first line that reads exactly `xref`
///
/// Equal to the summed length of every line before it, terminators included.
pub fn locate_xref(source: &[u8]) -> Option<usize> {
    split_lines(source)
        .iter()
        .find(|line| line.is_keyword(b"xref"))
        .map(|line| line.start)
}

/// Build the trailer for `source` as it stands right now
pub fn construct_trailer(source: &[u8], objects: &[IndirectObject]) -> Result<TrailerSection> {
    let startxref = locate_xref(source).ok_or_else(|| {
        Error::UnrecoverableDamage("no xref section for startxref to point at".to_string())
    })?;

    let root = find_catalog(objects)?.reference();
    let info = find_info_object(objects).map(IndirectObject::reference);
    if info.is_none() {
        log::warn!("No Info dictionary found, leaving /Info out of the trailer");
    }

    let size = ObjectTable::new(objects).len() + 1;

    let mut lines = vec![
        String::new(),
        "trailer".to_string(),
        format!("<< /Size {}", size),
        format!("/Root {}", root),
    ];
    if let Some(info) = info {
        lines.push(format!("/Info {}", info));
    }
    lines.push(">>".to_string());
    lines.push("startxref".to_string());
    lines.push(startxref.to_string());
    lines.push("%%EOF".to_string());

    log::info!("Built trailer: /Size {}, /Root {}, startxref {}", size, root, startxref);

    Ok(TrailerSection {
        size,
        root,
        info,
        startxref,
        text: lines.join("\n").into_bytes(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::scanner::{scan_objects, ScanMode};

    const BODY: &str = "%PDF-1.4\r\n1 0 obj\r\n<< /Type /Catalog /Pages 2 0 R >>\r\nendobj\r\n\
2 0 obj\r\n<< /Type /Pages /Kids [] /Count 0 >>\r\nendobj\r\n\
3 0 obj\r\n<< /Title (t) /Creator (c) >>\r\nendobj\r\n";

    #[test]
    fn test_locate_xref_sums_preceding_lines() {
        let src = format!("{}xref\n0 1\n", BODY);
        let expected: usize = BODY.split_inclusive('\n').map(str::len).sum();
        assert_eq!(locate_xref(src.as_bytes()), Some(expected));
        assert_eq!(locate_xref(b"startxref\n12\n"), None);
    }

    #[test]
    fn test_trailer_fields() {
        let src = format!("{}xref\n0 4\n", BODY);
        let objects = scan_objects(src.as_bytes(), ScanMode::Bounded);
        let trailer = construct_trailer(src.as_bytes(), &objects).unwrap();

        assert_eq!(trailer.size, 4);
        assert_eq!(trailer.root, ObjectRef::new(1, 0));
        assert_eq!(trailer.info, Some(ObjectRef::new(3, 0)));
        assert_eq!(trailer.startxref, BODY.len());

        let text = String::from_utf8(trailer.text).unwrap();
        assert_eq!(
            text,
            format!(
                "\ntrailer\n<< /Size 4\n/Root 1 0 R\n/Info 3 0 R\n>>\nstartxref\n{}\n%%EOF",
                BODY.len()
            )
        );
    }

    #[test]
    fn test_trailer_without_info() {
        let src = "1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\nxref\n";
        let objects = scan_objects(src.as_bytes(), ScanMode::Bounded);
        let trailer = construct_trailer(src.as_bytes(), &objects).unwrap();
        assert_eq!(trailer.info, None);
        assert!(!String::from_utf8(trailer.text).unwrap().contains("/Info"));
    }

    #[test]
    fn test_trailer_requires_xref_line() {
        let objects = scan_objects(BODY.as_bytes(), ScanMode::Bounded);
        let result = construct_trailer(BODY.as_bytes(), &objects);
        assert!(matches!(result, Err(Error::UnrecoverableDamage(_))));
    }
}
