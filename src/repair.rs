//! Recovery orchestration
//!
//! Sequences the components over a working copy of the source. Every query
//! reads the current buffer; every repair step appends to it. Appends happen
//! only between queries, which the borrow on [`SourceBuffer::objects`]
//! enforces.

use std::cell::OnceCell;
use std::fs;
use std::io::Read;
use std::path::Path;

use crate::error::{Error, Result};
use crate::pdf::{
    check_holes, construct_pages, construct_trailer, construct_xref, scan_objects,
    xref_is_missing, DamageReport, IndirectObject, ObjectRef, ObjectTable, ScanMode,
};
use crate::verify::{inspect_repaired, RepairedInfo};

/// Options for a repair run
#[derive(Debug, Clone, Default)]
pub struct RepairOptions {
    /// How object headers are paired with `endobj`
    pub scan_mode: ScanMode,
    /// Re-open the repaired output and check its page tree
    pub verify: bool,
}

/// What a successful repair did
#[derive(Debug, Clone, Default)]
pub struct RepairSummary {
    /// State of the input before repair
    pub damage: DamageReport,
    /// Page tree object that was rebuilt, if any
    pub pages: Option<ObjectRef>,
    /// IDs that received stub objects
    pub holes: Vec<u32>,
    /// Whether an xref table was appended
    pub xref_appended: bool,
    /// Value written after `startxref`
    pub startxref: usize,
    /// Result of the post-repair check, when requested
    pub verified: Option<RepairedInfo>,
}

/// Append-only working buffer with a lazily scanned object list
///
/// Each append bumps the revision and drops the scan, so the next query
/// sees the appended bytes.
#[derive(Debug)]
pub struct SourceBuffer {
    bytes: Vec<u8>,
    revision: u64,
    scan_mode: ScanMode,
    objects: OnceCell<Vec<IndirectObject>>,
}

impl SourceBuffer {
    pub fn new(bytes: Vec<u8>, scan_mode: ScanMode) -> Self {
        Self {
            bytes,
            revision: 0,
            scan_mode,
            objects: OnceCell::new(),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Number of appends so far
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Objects in the buffer at its current revision
    pub fn objects(&self) -> &[IndirectObject] {
        self.objects
            .get_or_init(|| scan_objects(&self.bytes, self.scan_mode))
    }

    pub fn append(&mut self, section: &[u8]) {
        if section.is_empty() {
            return;
        }
        self.bytes.extend_from_slice(section);
        self.revision += 1;
        self.objects = OnceCell::new();
        log::debug!("Appended {} bytes, buffer at revision {}", section.len(), self.revision);
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Rebuilds the closing sections of a truncated PDF
///
/// The original bytes are kept as read; the repaired document is a copy
/// extended with the rebuilt sections.
#[derive(Debug, Clone)]
pub struct Repairer {
    source: Vec<u8>,
    options: RepairOptions,
    output: Option<Vec<u8>>,
}

impl Repairer {
    pub fn new(source: impl Into<Vec<u8>>, options: RepairOptions) -> Self {
        Self {
            source: source.into(),
            options,
            output: None,
        }
    }

    /// Read the whole damaged document from `reader`
    pub fn from_reader<R: Read>(mut reader: R, options: RepairOptions) -> Result<Self> {
        let mut source = Vec::new();
        reader.read_to_end(&mut source)?;
        Ok(Self::new(source, options))
    }

    /// The damaged input, never modified
    pub fn source(&self) -> &[u8] {
        &self.source
    }

    /// Repaired document, once [`Repairer::recover`] has succeeded
    pub fn output(&self) -> Option<&[u8]> {
        self.output.as_deref()
    }

    pub fn into_output(self) -> Option<Vec<u8>> {
        self.output
    }

    /// Which closing sections the input lacks
    pub fn damage_report(&self) -> DamageReport {
        let objects = scan_objects(&self.source, self.options.scan_mode);
        DamageReport::inspect(&self.source, &objects)
    }

    /// Rebuild the missing sections
    ///
    /// Fails with [`Error::UnrecoverableDamage`] when the input already has a
    /// trailer or when the catalog cannot be found. On failure no output is
    /// produced.
    pub fn recover(&mut self) -> Result<RepairSummary> {
        let mut work = SourceBuffer::new(self.source.clone(), self.options.scan_mode);

        let damage = DamageReport::inspect(work.as_bytes(), work.objects());
        if !damage.trailer_missing {
            return Err(Error::UnrecoverableDamage(
                "file trailer exists already, refusing to guess what else is wrong".to_string(),
            ));
        }

        let mut summary = RepairSummary {
            damage,
            ..RepairSummary::default()
        };

        if damage.pages_missing {
            let pages = construct_pages(work.objects())?;
            summary.pages = Some(pages.reference);
            work.append(&pages.text);
        }

        if xref_is_missing(work.as_bytes()) {
            let holes = check_holes(&ObjectTable::new(work.objects()))?;
            work.append(&holes.stubs);

            let xref = construct_xref(&ObjectTable::new(work.objects()), &holes.holes)?;
            work.append(&xref);

            summary.holes = holes.holes;
            summary.xref_appended = true;
        }

        let trailer = construct_trailer(work.as_bytes(), work.objects())?;
        summary.startxref = trailer.startxref;
        work.append(&trailer.text);

        if self.options.verify {
            let info = inspect_repaired(work.as_bytes())?;
            log::info!("Repaired document opens with {} page(s)", info.page_count);
            summary.verified = Some(info);
        }

        log::info!("Repair finished after {} append(s)", work.revision());
        self.output = Some(work.into_bytes());
        Ok(summary)
    }
}

/// Repair `input` and write the result to `output`
///
/// Nothing is written unless the repair succeeds.
pub fn repair_file(input: &Path, output: &Path, options: &RepairOptions) -> Result<RepairSummary> {
    if !input.exists() {
        return Err(Error::FileNotFound(input.to_path_buf()));
    }

    let mut repairer = Repairer::new(fs::read(input)?, options.clone());
    let summary = repairer.recover()?;

    if let Some(bytes) = repairer.output() {
        fs::write(output, bytes)?;
    }

    Ok(summary)
}
