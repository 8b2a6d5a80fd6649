//! HTML report rendering for change notifications.
//!
//! The report is a single self-contained document with inline styles so it
//! renders in most mail clients. Every scraped value is escaped before it is
//! embedded.

use chrono::{DateTime, Local};
use html_escape::encode_safe;

use crate::models::{Listing, ListingSet};
use crate::pipeline::ChangeSet;

const TITLE: &str = "Student Housing Aarhus – Updates";

const STYLE: &str = r#"
      .container { max-width: 720px; margin: 0 auto; padding: 16px; font-family: -apple-system, Segoe UI, Roboto, Arial, sans-serif; }
      .card { border: 1px solid #e5e7eb; border-radius: 12px; padding: 16px; margin: 0 0 16px 0; }
      h1, h2, h3 { margin: 0 0 8px 0; }
      .muted { color: #6b7280; font-size: 13px; }
      .pill { display: inline-block; padding: 2px 8px; border-radius: 999px; font-size: 12px; border: 1px solid #e5e7eb; }
      .pill--ok { background: #ecfdf5; border-color: #a7f3d0; }
      .pill--add { background: #ecfeff; border-color: #a5f3fc; }
      .pill--rm  { background: #fff1f2; border-color: #fecdd3; }
      table { border-collapse: collapse; width: 100%; }
      th, td { border: 1px solid #e5e7eb; padding: 8px; text-align: left; font-size: 14px; vertical-align: top; }
      th { background: #f9fafb; }
      .row-add { background: #f0fdfa; }
      .row-rm  { background: #fff7ed; }
      a.btn { display:inline-block; padding:10px 14px; border-radius:10px; text-decoration:none; border:1px solid #111827; }
      .footer { margin-top: 16px; font-size: 12px; color: #6b7280; }
      @media (prefers-color-scheme: dark) {
        .card, th, td { border-color: #374151; }
        th { background: #111827; }
      }
"#;

const TABLE_HEAD: &str = "<thead><tr><th>Area</th><th>Price</th><th>Address</th><th>Date</th><th>Type</th><th>Key</th></tr></thead>";

/// Which listing set a section reads its rows from, and how rows are styled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    New,
    Removed,
    Rest,
}

impl Section {
    fn heading(self) -> &'static str {
        match self {
            Section::New => "New listings",
            Section::Removed => "Removed listings",
            Section::Rest => "Rest of the listings",
        }
    }

    fn placeholder(self) -> &'static str {
        match self {
            Section::New => "No new listings.",
            Section::Removed => "No removals.",
            Section::Rest => "No other listings.",
        }
    }

    fn row_class(self) -> &'static str {
        match self {
            Section::New => "row-add",
            Section::Removed => "row-rm",
            Section::Rest => "row-rest",
        }
    }
}

/// A change report ready to be rendered.
pub struct Report<'a> {
    changes: &'a ChangeSet,
    previous: &'a ListingSet,
    current: &'a ListingSet,
    available: usize,
    portal_url: &'a str,
    generated_at: DateTime<Local>,
}

impl<'a> Report<'a> {
    /// Build a report stamped with the current local time.
    ///
    /// New and remaining rows read from `current`, removed rows from `previous`.
    pub fn new(
        changes: &'a ChangeSet,
        previous: &'a ListingSet,
        current: &'a ListingSet,
        portal_url: &'a str,
    ) -> Self {
        Self {
            changes,
            previous,
            current,
            available: current.available,
            portal_url,
            generated_at: Local::now(),
        }
    }

    /// Override the total shown as "Available now".
    pub fn with_available(mut self, available: usize) -> Self {
        self.available = available;
        self
    }

    /// Override the render timestamp.
    pub fn with_timestamp(mut self, generated_at: DateTime<Local>) -> Self {
        self.generated_at = generated_at;
        self
    }

    /// Render the full HTML document.
    pub fn render(&self) -> String {
        let snapshot_date = self.generated_at.format("%Y-%m-%d %H:%M").to_string();
        let portal_url = encode_safe(self.portal_url);
        let available = self.available;
        let added_count = self.changes.added.len();
        let removed_count = self.changes.removed.len();

        let added_section = self.section(Section::New);
        let removed_section = self.section(Section::Removed);
        let rest_section = self.section(Section::Rest);

        format!(
            r#"<!doctype html>
<html>
  <head>
    <meta charset="utf-8" />
    <meta name="color-scheme" content="light dark">
    <meta name="supported-color-schemes" content="light dark">
    <title>{TITLE}</title>
    <style>{STYLE}</style>
  </head>
  <body>
    <div class="container">
      <div class="card">
        <h1>{TITLE}</h1>
        <div class="muted">Snapshot: {snapshot_date}</div>
        <p>
          <span class="pill pill--ok">Available now: <strong>{available}</strong></span>
          <span class="pill pill--add" style="margin-left:8px;">New: <strong>{added_count}</strong></span>
          <span class="pill pill--rm"  style="margin-left:8px;">Removed: <strong>{removed_count}</strong></span>
        </p>
        <p style="margin: 8px 0 0 0;">
          <a class="btn" href="{portal_url}">Open portal</a>
        </p>
      </div>
{added_section}
{removed_section}
{rest_section}
      <div class="footer">
        You’re getting this because you track changes on the Student Housing Aarhus portal.
        Tip: keys are built as “<em>Area</em> + <em>Price</em>”, so a price change will appear as “removed + new”.
      </div>
    </div>
  </body>
</html>
"#
        )
    }

    fn section(&self, section: Section) -> String {
        let (keys, source) = match section {
            Section::New => (&self.changes.added, self.current),
            Section::Removed => (&self.changes.removed, self.previous),
            Section::Rest => (&self.changes.common, self.current),
        };

        let rows = if keys.is_empty() {
            format!(
                r#"<tr><td colspan="6" class="muted">{}</td></tr>"#,
                section.placeholder()
            )
        } else {
            let empty = Listing::default();
            keys.iter()
                .map(|key| {
                    row(key, source.get(key).unwrap_or(&empty), section.row_class())
                })
                .collect::<Vec<_>>()
                .join("\n              ")
        };

        let heading = section.heading();
        format!(
            r#"      <div class="card">
        <h2>{heading}</h2>
        <table role="table" aria-label="{heading}">
          {TABLE_HEAD}
          <tbody>
              {rows}
          </tbody>
        </table>
      </div>"#
        )
    }
}

/// One table row. Absent fields render as empty cells.
fn row(key: &str, listing: &Listing, class: &str) -> String {
    let cell =
        |value: &Option<String>| encode_safe(value.as_deref().unwrap_or("")).into_owned();
    format!(
        r#"<tr class="{class}"><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>"#,
        cell(&listing.area),
        cell(&listing.price),
        cell(&listing.address),
        cell(&listing.date),
        cell(&listing.kind),
        encode_safe(key),
    )
}
