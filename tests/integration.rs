//! Integration tests for the fax PDF repair library

use fax_pdf_repair::{inspect_repaired, repair_file, Error, RepairOptions, Repairer, ScanMode};
use lopdf::Document;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// A fax as the gateway leaves it: objects written, page tree root and
/// everything after the body missing, object 5 never emitted
const TRUNCATED_FAX: &str = "%PDF-1.4
1 0 obj
<< /Type /Catalog /Pages 3 0 R >>
endobj
2 0 obj
<< /Title (Fax from 0301234567) /Creator (FRITZ!Box) /Producer (FRITZ!Box) >>
endobj
4 0 obj
<< /Type /Page /Parent 3 0 R /MediaBox [0 0 595 842] /Resources << >> >>
endobj
6 0 obj
<< /Type /Page /Parent 3 0 R /MediaBox [0 0 595 842] /Resources << >> >>
endobj
";

/// Write `contents` into a fresh temp dir and return the dir and file path
fn write_fixture(name: &str, contents: &[u8]) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let path = temp_dir.path().join(name);
    fs::write(&path, contents).expect("Failed to write fixture");
    (temp_dir, path)
}

#[test]
fn test_repair_file_produces_loadable_pdf() {
    let (temp_dir, input) = write_fixture("fax.pdf", TRUNCATED_FAX.as_bytes());
    let output = temp_dir.path().join("fax-fixed.pdf");

    let summary = repair_file(&input, &output, &RepairOptions::default())
        .expect("Failed to repair fax");

    assert!(output.exists(), "Repaired PDF was not written");
    assert_eq!(summary.holes, vec![5]);

    let doc = Document::load(&output).expect("Repaired PDF should load");
    assert_eq!(doc.get_pages().len(), 2, "Both fax pages should be reachable");
}

#[test]
fn test_repaired_structure_counts() {
    let mut repairer = Repairer::new(TRUNCATED_FAX, RepairOptions::default());
    repairer.recover().expect("Failed to repair fax");
    let out = String::from_utf8(repairer.output().unwrap().to_vec()).unwrap();

    // IDs 1..=6 after the rebuilt page tree and the stub for 5
    let object_count = 6;
    assert_eq!(out.matches("/Type /Pages").count(), 1);
    assert_eq!(out.lines().filter(|l| *l == "xref").count(), 1);
    assert_eq!(out.lines().filter(|l| *l == "trailer").count(), 1);
    assert!(out.contains(&format!("\nxref\n0 {}\n", object_count + 1)));
    assert!(out.contains(&format!("<< /Size {}\n", object_count + 1)));

    let entries = out
        .lines()
        .filter(|l| l.len() == 19 && (l.ends_with(" n ") || l.ends_with(" f ")))
        .count();
    assert_eq!(entries, object_count + 1);
}

#[test]
fn test_xref_offsets_point_at_objects() {
    let mut repairer = Repairer::new(TRUNCATED_FAX, RepairOptions::default());
    repairer.recover().expect("Failed to repair fax");
    let out = repairer.output().unwrap();
    let text = std::str::from_utf8(out).unwrap();

    let table = text.split("\nxref\n").nth(1).unwrap();
    for (id, row) in table.lines().skip(2).enumerate().take(6) {
        let id = id + 1;
        let offset: usize = row[..10].parse().unwrap();
        let header = format!("{} 0 obj", id);
        assert_eq!(
            &text[offset..offset + header.len()],
            header,
            "xref entry for object {} should point at its header",
            id
        );
        let expected_flag = if id == 5 { 'f' } else { 'n' };
        assert_eq!(row.chars().nth(17), Some(expected_flag));
    }
}

#[test]
fn test_verify_option_reads_back_pages_and_title() {
    let options = RepairOptions {
        verify: true,
        ..RepairOptions::default()
    };
    let mut repairer = Repairer::new(TRUNCATED_FAX, options);
    let summary = repairer.recover().expect("Failed to repair fax");

    let info = summary.verified.expect("Verification should have run");
    assert_eq!(info.page_count, 2);
    assert_eq!(info.title.as_deref(), Some("Fax from 0301234567"));

    let again = inspect_repaired(repairer.output().unwrap()).unwrap();
    assert_eq!(again, info);
}

#[test]
fn test_crlf_fax_startxref() {
    let crlf = TRUNCATED_FAX.replace('\n', "\r\n");
    let mut repairer = Repairer::new(crlf.as_bytes(), RepairOptions::default());
    let summary = repairer.recover().expect("Failed to repair CRLF fax");
    let out = repairer.output().unwrap();

    // Appended sections start after the original body, which ends in CRLF
    let xref_at = summary.startxref;
    assert!(xref_at > crlf.len());
    assert_eq!(&out[xref_at..xref_at + 5], b"xref\n");
    assert_eq!(out[xref_at - 1], b'\n');
}

#[test]
fn test_compatible_scan_matches_bounded_on_well_formed_input() {
    let bounded = {
        let mut r = Repairer::new(TRUNCATED_FAX, RepairOptions::default());
        r.recover().unwrap();
        r.into_output().unwrap()
    };
    let compatible = {
        let options = RepairOptions {
            scan_mode: ScanMode::Compatible,
            ..RepairOptions::default()
        };
        let mut r = Repairer::new(TRUNCATED_FAX, options);
        r.recover().unwrap();
        r.into_output().unwrap()
    };
    assert_eq!(bounded, compatible);
}

#[test]
fn test_existing_trailer_leaves_output_unwritten() {
    let mut damaged = TRUNCATED_FAX.to_string();
    damaged.push_str("trailer\n<< /Root 1 0 R >>\n");
    let (temp_dir, input) = write_fixture("has-trailer.pdf", damaged.as_bytes());
    let output = temp_dir.path().join("out.pdf");

    let result = repair_file(&input, &output, &RepairOptions::default());
    assert!(matches!(result, Err(Error::UnrecoverableDamage(_))));
    assert!(!output.exists(), "No output should be written on failure");

    if let Err(e) = result {
        assert!(
            e.to_string().contains("trailer"),
            "Error should mention the trailer: {}",
            e
        );
    }
}

#[test]
fn test_repair_nonexistent_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let output = temp_dir.path().join("out.pdf");

    let result = repair_file(&PathBuf::from("nonexistent.pdf"), &output, &RepairOptions::default());
    assert!(matches!(result, Err(Error::FileNotFound(_))));
}

#[test]
fn test_empty_input_is_rejected() {
    let mut repairer = Repairer::new(Vec::new(), RepairOptions::default());
    let result = repairer.recover();
    assert!(result.is_err(), "Empty input has no catalog to repair around");
    assert!(repairer.output().is_none());
}
