// tests/profile_e2e.rs
//
// Load CSV exports from disk and check the normalized records and rendered pages.
//
use std::path::{Path, PathBuf};

use profile_viewer::item::{FieldValue, Item, Scalar};
use profile_viewer::render::{RenderOptions, render_record};
use profile_viewer::session::{Selector, Session};
use profile_viewer::table::{Table, load_first_available};

fn write_csv(dir: &Path, name: &str, headers: &[&str], rows: &[&[&str]]) -> PathBuf {
    let path = dir.join(name);
    let mut w = csv::Writer::from_path(&path).unwrap();
    w.write_record(headers).unwrap();
    for row in rows {
        w.write_record(*row).unwrap();
    }
    w.flush().unwrap();
    path
}

fn text(s: &str) -> FieldValue {
    FieldValue::Scalar(Scalar::Text(s.to_string()))
}

#[test]
fn work_experience_from_cleaned_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(
        dir.path(),
        "enrichment_clean.csv",
        &["cleaned.name", "cleaned.work_experience"],
        &[&[
            "Dr. Mercy",
            r#"[{"employer":"Mercy Hospital","role":"Attending","start":"2015","end":"2020","source":["http://a.example"]}]"#,
        ]],
    );
    let records = Table::load(&path).unwrap().records();
    assert_eq!(records[0].work_history.len(), 1);
    let entry = records[0].work_history[0].as_entry().unwrap();
    assert_eq!(entry.get("employer"), Some(&text("Mercy Hospital")));
    assert_eq!(entry.sources(), ["http://a.example".to_string()]);

    let page = render_record(&records[0], &RenderOptions::default());
    assert!(page.contains(
        "- **Employer:** Mercy Hospital — **Role:** Attending — **Start:** 2015 — **End:** 2020 \
         • [http://a.example](http://a.example)"
    ));
}

#[test]
fn legacy_npi_column_keeps_exact_text() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(
        dir.path(),
        "viewer_data.csv",
        &["name", "npi"],
        &[&["Dr. A", "1234567890"], &["Dr. B", "0012345678"]],
    );
    let records = Table::load(&path).unwrap().records();
    assert_eq!(records[0].npi.as_deref(), Some("1234567890"));
    assert_eq!(records[1].npi.as_deref(), Some("0012345678"));

    let page = render_record(&records[1], &RenderOptions::default());
    assert!(page.contains(
        "[0012345678](https://npiregistry.cms.hhs.gov/provider-view/0012345678)"
    ));
}

#[test]
fn sentinel_emails_render_placeholder() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(
        dir.path(),
        "enrichment_clean.csv",
        &["cleaned.name", "cleaned.emails", "raw.emails"],
        &[&["Dr. A", "nan", ""]],
    );
    let records = Table::load(&path).unwrap().records();
    assert!(records[0].emails.is_empty());
    let page = render_record(&records[0], &RenderOptions::default());
    assert!(page.contains("### Emails\n\nN/A\n"), "{page}");
}

#[test]
fn bare_medical_school_mapping_becomes_list() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(
        dir.path(),
        "enrichment_clean.csv",
        &["cleaned.name", "cleaned.medical_school"],
        &[&["Dr. A", r#"{"institution":"State U","start_year":"2001"}"#]],
    );
    let records = Table::load(&path).unwrap().records();
    assert_eq!(records[0].medical_school.len(), 1);
    let entry = records[0].medical_school[0].as_entry().unwrap();
    assert_eq!(entry.get("institution"), Some(&text("State U")));
    assert_eq!(entry.get("start_year"), Some(&text("2001")));
}

#[test]
fn literal_cells_and_mixed_schema_versions() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(
        dir.path(),
        "profile_enrichment_export.csv",
        &[
            "raw.name",
            "raw.npi",
            "raw.residency",
            "insurance_accepted",
            "cleaned.linkedin_url.url",
            "license_state",
        ],
        &[&[
            "Dr. Literal",
            "1112223334",
            "[{'institution': 'County General', 'start_year': '2010', 'end_year': None, 'confidence': 0.8}]",
            "['Aetna', {'insurance': 'Cigna', 'source': 'http://c.example'}]",
            "https://www.linkedin.com/in/literal",
            "NV",
        ]],
    );
    let records = Table::load(&path).unwrap().records();
    let r = &records[0];
    assert_eq!(r.name.as_deref(), Some("Dr. Literal"));
    assert_eq!(r.residency.len(), 1);
    assert_eq!(r.insurance[0], Item::Scalar(Scalar::Text("Aetna".into())));
    assert_eq!(r.license_state.as_deref(), Some("NV"));

    let page = render_record(r, &RenderOptions::default());
    assert!(page.contains("- **Institution:** County General — **Start Year:** 2010\n"), "{page}");
    assert!(!page.contains("Confidence"));
    assert!(page.contains("- Aetna\n- **Insurance:** Cigna • [http://c.example](http://c.example)\n"));
    assert!(page.contains(
        "[https://www.linkedin.com/in/literal](https://www.linkedin.com/in/literal)"
    ));
    assert!(page.contains("### License State\n\nNV\n"));
    assert!(page.contains("### Doximity\n\nN/A\n"));
}

#[test]
fn malformed_cells_degrade_quietly() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(
        dir.path(),
        "enrichment_clean.csv",
        &["cleaned.name", "cleaned.work_experience", "raw.work_experience"],
        &[&["Dr. A", "[{'employer': 'Mercy'", "[{\"employer\": \"Raw\"}]"]],
    );
    let records = Table::load(&path).unwrap().records();
    // The cleaned cell is present text, so it wins resolution and then fails to decode.
    assert!(records[0].work_history.is_empty());
    let page = render_record(&records[0], &RenderOptions::default());
    assert!(page.contains("### Work Experience\n\nN/A\n"));
}

#[test]
fn missing_files_are_all_reported() {
    let dir = tempfile::tempdir().unwrap();
    let candidates: Vec<PathBuf> = ["enrichment_clean.csv", "viewer_data.csv"]
        .iter()
        .map(|n| dir.path().join(n))
        .collect();
    let err = format!("{:#}", load_first_available(&candidates).unwrap_err());
    assert!(err.contains("enrichment_clean.csv"), "{err}");
    assert!(err.contains("viewer_data.csv"), "{err}");
}

#[test]
fn session_orders_by_name_and_selects() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(
        dir.path(),
        "enrichment_clean.csv",
        &["cleaned.name", "cleaned.npi", "npi"],
        &[
            &["Young", "", "5"],
            &["Abbott", "1", ""],
            &["", "", "7"],
            &["Abbott", "2", ""],
        ],
    );
    let mut session = Session::open(&[path], RenderOptions::default()).unwrap();
    let labels: Vec<&str> = session
        .navigator()
        .entries()
        .iter()
        .map(|e| e.label.as_str())
        .collect();
    assert_eq!(labels, vec!["Abbott — 1", "Abbott — 2", "Unknown — 7", "Young — 5"]);

    session.select(&Selector::Npi("7".into())).unwrap();
    assert_eq!(session.navigator().position(), 2);
    assert_eq!(session.current().unwrap().row_key(), Some("7"));

    let exported = serde_json::to_value(session.records_in_order().collect::<Vec<_>>()).unwrap();
    assert_eq!(exported[0]["name"], "Abbott");
    assert_eq!(exported[3]["npi"], "5");
}
