//! Markdown rendering of normalized records. Reads records, never changes them.

use std::fmt::Write;

use crate::constants::{DEFAULT_REGISTRY_BASE_URL, NOT_AVAILABLE, SOURCE_KEY, SUPPRESSED_KEYS};
use crate::item::{Entry, Item};
use crate::presence::Presence;
use crate::record::Record;
use crate::schema::LogicalField;

#[derive(Debug, Clone, Copy)]
pub struct Section {
    pub title: &'static str,
    pub field: LogicalField,
    /// Keys shown first, in this order. Other keys follow in source order.
    pub order: &'static [&'static str],
}

pub const WORK_EXPERIENCE: Section = Section {
    title: "Work Experience",
    field: LogicalField::WorkHistory,
    order: &["employer", "role", "start", "end", "location"],
};

pub const RESIDENCY: Section = Section {
    title: "Residency",
    field: LogicalField::Residency,
    order: &["institution", "start_year", "end_year"],
};

pub const MEDICAL_SCHOOL: Section = Section {
    title: "Medical School",
    field: LogicalField::MedicalSchool,
    order: &["institution", "start_year", "end_year"],
};

pub const EMAILS: Section = Section {
    title: "Emails",
    field: LogicalField::Emails,
    order: &["email", "address", "type"],
};

pub const INSURANCE: Section = Section {
    title: "Insurance",
    field: LogicalField::Insurance,
    order: &["insurance"],
};

#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub registry_base_url: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            registry_base_url: DEFAULT_REGISTRY_BASE_URL.to_string(),
        }
    }
}

impl RenderOptions {
    pub fn registry_url(&self, npi: &str) -> String {
        format!(
            "{}/{}",
            self.registry_base_url.trim_end_matches('/'),
            npi.trim()
        )
    }
}

/// `start_year` -> `Start Year`.
pub fn label(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut prev_cased = false;
    for c in key.chars() {
        let c = if c == '_' { ' ' } else { c };
        if c.is_alphabetic() {
            if prev_cased {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_cased = true;
        } else {
            out.push(c);
            prev_cased = false;
        }
    }
    out
}

pub fn source_links(urls: &[String]) -> Vec<String> {
    urls.iter()
        .filter(|url| url.is_present())
        .map(|url| {
            let url = url.trim();
            format!("[{url}]({url})")
        })
        .collect()
}

fn is_hidden(key: &str) -> bool {
    key == SOURCE_KEY || SUPPRESSED_KEYS.contains(&key)
}

/// One entry as a single line: declared keys first, then any other keys, then
/// source links. `N/A` when there is nothing at all to show.
pub fn render_entry(entry: &Entry, order: &[&str]) -> String {
    let mut parts = Vec::new();
    for &key in order {
        if is_hidden(key) {
            continue;
        }
        if let Some(value) = entry.get(key).filter(|v| v.is_present()) {
            parts.push(format!("**{}:** {}", label(key), value));
        }
    }
    for (key, value) in entry.iter() {
        if order.contains(&key) || is_hidden(key) || !value.is_present() {
            continue;
        }
        parts.push(format!("**{}:** {}", label(key), value));
    }

    let links = source_links(entry.sources());
    match (parts.is_empty(), links.is_empty()) {
        (true, true) => NOT_AVAILABLE.to_string(),
        (true, false) => links.join(" • "),
        (false, true) => parts.join(" — "),
        (false, false) => format!("{} • {}", parts.join(" — "), links.join(" • ")),
    }
}

/// `None` for scalar items that carry no value.
pub fn render_item(item: &Item, order: &[&str]) -> Option<String> {
    match item {
        Item::Mapping(entry) => Some(render_entry(entry, order)),
        Item::Scalar(scalar) if scalar.is_present() => Some(scalar.to_string()),
        Item::Scalar(_) => None,
    }
}

pub fn render_items(items: &[Item], order: &[&str]) -> String {
    let lines: Vec<String> = items
        .iter()
        .filter_map(|item| render_item(item, order))
        .map(|line| format!("- {line}\n"))
        .collect();
    if lines.is_empty() {
        format!("{NOT_AVAILABLE}\n")
    } else {
        lines.concat()
    }
}

pub fn render_section(section: &Section, record: &Record) -> String {
    format!(
        "### {}\n\n{}",
        section.title,
        render_items(record.collection(section.field), section.order)
    )
}

fn render_link(title: &str, text: Option<&str>, url: impl FnOnce(&str) -> String) -> String {
    match text.filter(|t| t.is_present()) {
        Some(text) => format!("### {title}\n\n[{text}]({})\n", url(text)),
        None => format!("### {title}\n\n{NOT_AVAILABLE}\n"),
    }
}

fn render_text(title: &str, text: Option<&str>) -> String {
    match text.filter(|t| t.is_present()) {
        Some(text) => format!("### {title}\n\n{text}\n"),
        None => format!("### {title}\n\n{NOT_AVAILABLE}\n"),
    }
}

/// The full profile page.
pub fn render_record(record: &Record, options: &RenderOptions) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "## {}\n", record.display_name());

    for section in [WORK_EXPERIENCE, RESIDENCY, MEDICAL_SCHOOL] {
        out.push_str(&render_section(&section, record));
        out.push('\n');
    }
    out.push_str("---\n\n");

    let details = [
        render_link("NPI", record.npi.as_deref(), |npi| options.registry_url(npi)),
        render_link("Doximity", record.doximity_url.as_deref(), str::to_string),
        render_link("LinkedIn", record.linkedin_url.as_deref(), str::to_string),
        render_section(&EMAILS, record),
        render_section(&INSURANCE, record),
        render_text("License State", record.license_state.as_deref()),
    ];
    out.push_str(&details.join("\n"));
    out
}
