//! HTML digest renderer.
//!
//! Pure string building: the same items, date label, and lookback always
//! produce byte-identical output. The renderer shows exactly what it is
//! given, in order; selection happens upstream in the ranker.

use std::fmt::Write as _;

use crate::digest::types::DigestItem;

/// Maximum preview length, in characters, before escaping.
pub const PREVIEW_MAX_CHARS: usize = 240;

pub const UNKNOWN_SENDER: &str = "Unknown";
pub const NO_SUBJECT: &str = "(no subject)";
pub const NO_LINK: &str = "#";

const ROW_STYLE: &str = "padding:12px;border-bottom:1px solid #eaeaea";

/// Text of the single row rendered when there is nothing to show.
pub fn empty_marker(lookback_hours: u32) -> String {
    format!("No important emails in the last {lookback_hours}h.")
}

/// Render the digest as an HTML fragment suitable for an email body.
pub fn render(items: &[DigestItem], date_label: &str, lookback_hours: u32) -> String {
    let mut rows = String::new();
    for item in items {
        render_row(&mut rows, item);
    }
    if rows.is_empty() {
        let _ = write!(
            rows,
            "<tr><td style=\"{ROW_STYLE}\">{}</td></tr>",
            empty_marker(lookback_hours)
        );
    }

    let mut html = String::with_capacity(rows.len() + 512);
    html.push_str("<div style=\"font-family:Inter,Arial,sans-serif;max-width:720px;margin:0 auto\">\n");
    let _ = writeln!(
        html,
        "<h2 style=\"margin:0 0 12px\">Daily Digest \u{2014} {}</h2>",
        escape_html(date_label)
    );
    html.push_str("<table style=\"width:100%;border-collapse:collapse\">\n");
    html.push_str(&rows);
    html.push_str("</table>\n");
    let _ = writeln!(
        html,
        "<p style=\"color:#777;font-size:12px;margin-top:12px\">Top items from the last {lookback_hours} hours.</p>"
    );
    html.push_str("</div>\n");
    html
}

fn render_row(out: &mut String, item: &DigestItem) {
    let sender = escape_html(present(item.sender.as_deref()).unwrap_or(UNKNOWN_SENDER));
    let subject = escape_html(present(item.subject.as_deref()).unwrap_or(NO_SUBJECT));
    let preview = escape_html(&truncate_chars(
        item.preview.as_deref().unwrap_or(""),
        PREVIEW_MAX_CHARS,
    ));
    let link = escape_html(present(item.link.as_deref()).unwrap_or(NO_LINK));

    let _ = write!(
        out,
        "<tr>\n\
         <td style=\"{ROW_STYLE}\">\n\
         <div style=\"font-weight:600\">{sender}</div>\n\
         <div style=\"color:#111;margin:2px 0 6px\">{subject}</div>\n\
         <div style=\"color:#555;font-size:13px;margin:4px 0 8px\">{preview}</div>\n\
         <a href=\"{link}\" style=\"font-size:13px;text-decoration:none\">Open in Outlook \u{2192}</a>\n\
         </td>\n\
         </tr>\n"
    );
}

/// Treat blank strings like absent ones.
fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Truncate to at most `max` characters on a char boundary.
fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((end, _)) => s[..end].to_string(),
        None => s.to_string(),
    }
}

/// Escape text for HTML element content and double-quoted attributes.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}
