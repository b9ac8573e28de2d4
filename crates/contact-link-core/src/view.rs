//! Aggregated identity view and its HTML rendering.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{Contact, LinkPrecedence};

/// One identity as assembled from every row sharing an email or phone.
///
/// Scalar fields come from the newest matching row, which may be a
/// secondary row rather than the identity's primary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactView {
    pub email: Option<String>,
    /// One entry per row that carries a phone number, newest row first.
    /// Repeats are kept.
    pub phone_numbers: Vec<String>,
    pub id: i64,
    pub linked_id: Option<i64>,
    pub link_precedence: LinkPrecedence,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl ContactView {
    /// Build a view from rows already ordered newest first.
    ///
    /// Returns `None` for an empty slice.
    pub fn from_rows(rows: &[Contact]) -> Option<Self> {
        let head = rows.first()?;
        let phone_numbers = rows
            .iter()
            .filter_map(|r| r.phone_number.clone())
            .collect();
        Some(Self {
            email: head.email.clone(),
            phone_numbers,
            id: head.id,
            linked_id: head.linked_id,
            link_precedence: head.link_precedence,
            created_at: head.created_at,
            updated_at: head.updated_at,
            deleted_at: head.deleted_at,
        })
    }

    /// Render as an HTML fragment under the given `<h1>` heading.
    pub fn render_html(&self, heading: &str) -> String {
        let mut out = String::new();
        out.push_str(&format!("<h1>{}</h1>\n", escape_html(heading)));
        field(&mut out, "Email", self.email.as_deref().unwrap_or_default());
        field(
            &mut out,
            "Phone Numbers",
            &format!("[{}]", self.phone_numbers.join(", ")),
        );
        field(&mut out, "ID", &self.id.to_string());
        field(
            &mut out,
            "Linked ID",
            &self.linked_id.map(|id| id.to_string()).unwrap_or_default(),
        );
        field(&mut out, "Link Precedence", self.link_precedence.as_str());
        field(&mut out, "Created At", &format_ts_iso(&self.created_at));
        field(&mut out, "Updated At", &format_ts_iso(&self.updated_at));
        field(
            &mut out,
            "Deleted At",
            &self.deleted_at.as_ref().map(format_ts_iso).unwrap_or_default(),
        );
        out
    }
}

fn field(out: &mut String, label: &str, value: &str) {
    out.push_str(&format!(
        "<p><strong>{}:</strong> {}</p>\n",
        label,
        escape_html(value)
    ));
}

pub fn format_ts_iso(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
