//! End-to-end integration tests for printcorner.
//!
//! Everything runs in memory: fixture DOCX/XLSX packages are assembled on
//! the fly with the `zip` writer, and session persistence goes through
//! `MemorySessionStore`. No environment gating needed.
//!
//! Run with:
//!   cargo test --test e2e -- --nocapture

use printcorner::{
    ConversionResult, ConverterKind, ManagedFile, MemorySessionStore, PreviewOrchestrator,
    PreviewState, Workflow, WorkflowStep,
};
use std::io::{Cursor, Write};
use std::sync::Arc;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

// ── Test fixtures ────────────────────────────────────────────────────────

const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// A one-paragraph docx package built in memory.
fn docx_fixture(heading: &str, body: &str) -> Vec<u8> {
    let document = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>
<w:p><w:pPr><w:pStyle w:val="Heading1"/></w:pPr><w:r><w:t>{heading}</w:t></w:r></w:p>
<w:p><w:r><w:t>{body}</w:t></w:r></w:p>
</w:body></w:document>"#
    );
    let mut buf = Cursor::new(Vec::new());
    let mut writer = ZipWriter::new(&mut buf);
    writer
        .start_file("word/document.xml", SimpleFileOptions::default())
        .unwrap();
    writer.write_all(document.as_bytes()).unwrap();
    writer.finish().unwrap();
    buf.into_inner()
}

/// A single-sheet xlsx package with one inline-string row.
fn xlsx_fixture(cells: &[&str]) -> Vec<u8> {
    let mut row = String::new();
    for (c, value) in cells.iter().enumerate() {
        let col = (b'A' + c as u8) as char;
        row.push_str(&format!(
            r#"<c r="{col}1" t="inlineStr"><is><t>{value}</t></is></c>"#
        ));
    }

    let mut buf = Cursor::new(Vec::new());
    let mut writer = ZipWriter::new(&mut buf);
    let options = SimpleFileOptions::default();
    let parts: [(&str, String); 5] = [
        (
            "[Content_Types].xml",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
<Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
</Types>"#
                .to_string(),
        ),
        (
            "_rels/.rels",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#
                .to_string(),
        ),
        (
            "xl/workbook.xml",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Sheet1" sheetId="1" r:id="rId1"/></sheets></workbook>"#
                .to_string(),
        ),
        (
            "xl/_rels/workbook.xml.rels",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
</Relationships>"#
                .to_string(),
        ),
        (
            "xl/worksheets/sheet1.xml",
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData><row r="1">{row}</row></sheetData></worksheet>"#
            ),
        ),
    ];
    for (name, content) in parts {
        writer.start_file(name, options).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap();
    buf.into_inner()
}

fn pdf_file(name: &str) -> ManagedFile {
    ManagedFile::new(name, "application/pdf", b"%PDF-1.7 stub".to_vec(), 0)
}

/// Opt-in log output: RUST_LOG=debug cargo test --test e2e -- --nocapture
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Select the active file and drive any async conversion to completion.
async fn preview_active(orch: &mut PreviewOrchestrator, wf: &Workflow) {
    let Some(index) = wf.files().active_index() else {
        orch.clear();
        return;
    };
    let file = wf.files().active_file().unwrap().clone();
    if let Some(task) = orch.select(index, &file) {
        let outcome = task.run().await;
        orch.apply(outcome);
    }
}

// ── Scenarios ────────────────────────────────────────────────────────────

/// The mixed-upload scenario: a PDF and a HEIC photo, then removal.
#[tokio::test]
async fn mixed_upload_removal_and_heic_failure() {
    init_tracing();
    let store = Arc::new(MemorySessionStore::new());
    let mut wf = Workflow::new(store);
    let mut preview = PreviewOrchestrator::new();

    wf.add_files([
        pdf_file("a.pdf"),
        ManagedFile::new("b.heic", "image/heic", b"not a real heif payload".to_vec(), 0),
    ]);
    // Last appended becomes active
    assert_eq!(wf.files().active_index(), Some(1));

    preview_active(&mut preview, &wf).await;
    // HEIC conversion fails recoverably in both build flavours: the codec
    // is either absent or rejects the garbage payload.
    match preview.state() {
        PreviewState::Failed { index, reason, hint } => {
            assert_eq!(*index, 1);
            assert!(reason.starts_with("heic conversion failed"), "reason: {reason}");
            assert!(hint.contains("downloading"), "hint: {hint}");
        }
        other => panic!("unexpected state: {other:?}"),
    }

    // The failure never touches workflow progress
    assert_eq!(wf.step(), WorkflowStep::Upload);

    // Remove index 0; active clamps onto the heic file, now at index 0
    wf.files_mut().remove(0).unwrap();
    assert_eq!(wf.files().active_index(), Some(0));
    assert_eq!(wf.files().active_file().unwrap().name(), "b.heic");

    // Remove the last file; preview clears to idle
    wf.files_mut().remove(0).unwrap();
    assert_eq!(wf.files().active_index(), None);
    preview_active(&mut preview, &wf).await;
    assert!(matches!(preview.state(), PreviewState::Idle));
}

#[tokio::test]
async fn docx_upload_renders_sanitized_fragment() {
    let bytes = docx_fixture("Quarterly Report", "Printed in duplicate.");
    let file = ManagedFile::new("report.docx", DOCX_MIME, bytes, 0);
    let mut preview = PreviewOrchestrator::new();

    let task = preview.select(0, &file).expect("docx converts asynchronously");
    assert_eq!(task.kind(), ConverterKind::Document);
    assert!(preview.is_converting());

    let outcome = task.run().await;
    assert!(preview.apply(outcome));
    match preview.state() {
        PreviewState::Ready {
            result: ConversionResult::Markup(html),
            ..
        } => {
            assert_eq!(
                html,
                "<h1>Quarterly Report</h1><p>Printed in duplicate.</p>"
            );
        }
        other => panic!("unexpected state: {other:?}"),
    }
}

#[tokio::test]
async fn xlsx_upload_renders_first_sheet_table() {
    let bytes = xlsx_fixture(&["Copies", "3"]);
    let file = ManagedFile::new("orders.xlsx", XLSX_MIME, bytes, 0);
    let mut preview = PreviewOrchestrator::new();

    let task = preview.select(0, &file).expect("xlsx converts asynchronously");
    let outcome = task.run().await;
    assert!(preview.apply(outcome));
    match preview.state() {
        PreviewState::Ready {
            result: ConversionResult::Markup(html),
            ..
        } => {
            assert_eq!(html, "<table><tr><td>Copies</td><td>3</td></tr></table>");
        }
        other => panic!("unexpected state: {other:?}"),
    }
}

/// Re-selecting before a slow conversion settles must discard the stale
/// outcome and keep the newer content on screen.
#[tokio::test]
async fn reselection_supersedes_inflight_conversion() {
    let mut preview = PreviewOrchestrator::new();

    let docx = ManagedFile::new(
        "slow.docx",
        DOCX_MIME,
        docx_fixture("Stale", "should never display"),
        0,
    );
    let stale_task = preview.select(0, &docx).unwrap();

    // User clicks the PDF while the docx still converts
    let pdf = pdf_file("fresh.pdf");
    assert!(preview.select(1, &pdf).is_none());

    let stale = stale_task.run().await;
    assert!(!preview.apply(stale));

    match preview.state() {
        PreviewState::Ready {
            index,
            result: ConversionResult::Pdf(handle),
            ..
        } => {
            assert_eq!(*index, 1);
            assert_eq!(handle.mime(), "application/pdf");
        }
        other => panic!("unexpected state: {other:?}"),
    }
}

/// The full happy path: upload → settings → location → summary, with the
/// session restored mid-way as a reload would.
#[tokio::test]
async fn full_workflow_with_reload() {
    init_tracing();
    let store = Arc::new(MemorySessionStore::new());

    {
        let mut wf = Workflow::new(Arc::clone(&store) as Arc<dyn printcorner::SessionStore>);
        wf.add_files([pdf_file("flyer.pdf")]);
        wf.config_mut().set_zoom_percent(150);
        wf.config_mut()
            .set_orientation(printcorner::Orientation::Landscape);
        wf.advance().unwrap(); // Settings
        wf.advance().unwrap(); // Location
        wf.select_shop("quick-print-hub");
        wf.advance().unwrap(); // Summary
        assert_eq!(wf.step(), WorkflowStep::Summary);
    }

    // Reload: a new process restores from the same store
    let mut wf = Workflow::restore(Arc::clone(&store) as Arc<dyn printcorner::SessionStore>);
    assert_eq!(wf.step(), WorkflowStep::Summary);
    assert_eq!(wf.highest_reached(), WorkflowStep::Summary);
    assert_eq!(wf.selected_shop(), Some("quick-print-hub"));
    assert_eq!(wf.config().zoom_percent(), 150);

    // Files survive as metadata placeholders only
    let file = wf.files().active_file().unwrap();
    assert_eq!(file.name(), "flyer.pdf");
    assert!(file.needs_reupload());

    // A placeholder cannot be previewed; it fails with a re-upload hint
    let placeholder = file.clone();
    let mut preview = PreviewOrchestrator::new();
    assert!(preview.select(0, &placeholder).is_none());
    match preview.state() {
        PreviewState::Failed { hint, .. } => assert!(hint.contains("uploaded again")),
        other => panic!("unexpected state: {other:?}"),
    }

    // Step-indicator navigation: anything already reached is reachable
    assert_eq!(wf.jump_to(WorkflowStep::Upload).unwrap(), WorkflowStep::Upload);
    assert_eq!(
        wf.jump_to(WorkflowStep::Summary).unwrap(),
        WorkflowStep::Summary
    );
}

#[test]
fn upload_gate_blocks_empty_collection() {
    let mut wf = Workflow::new(Arc::new(MemorySessionStore::new()));
    assert!(wf.advance().is_err());
    assert_eq!(wf.step(), WorkflowStep::Upload);

    // jumping ahead is equally blocked until the step was reached
    assert!(wf.jump_to(WorkflowStep::Summary).is_err());
}

#[tokio::test]
async fn unsupported_upload_is_accepted_but_not_previewed() {
    let store = Arc::new(MemorySessionStore::new());
    let mut wf = Workflow::new(store);
    let mut preview = PreviewOrchestrator::new();

    wf.add_files([ManagedFile::new(
        "archive.tar.gz",
        "application/gzip",
        vec![0x1f, 0x8b, 0x08],
        0,
    )]);
    preview_active(&mut preview, &wf).await;
    assert!(matches!(
        preview.state(),
        PreviewState::Unsupported { index: 0 }
    ));

    // Unsupported files still count for the upload gate
    assert_eq!(wf.advance().unwrap(), WorkflowStep::Settings);
}
