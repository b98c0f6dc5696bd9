// crates/po-sync-core/src/core/po.rs
// ============================================================================
// Module: PO Codec
// Description: Parser, serializer, and append-only merge for PO documents.
// Purpose: Round-trip catalogue files without corrupting untouched entries.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! The codec reads and writes the gettext PO dialect this system manages:
//! line-oriented `msgid "..."` / `msgstr "..."` pairs under a comment-and-
//! metadata header. Parsing is liberal (malformed or unmatched lines are
//! skipped, never fatal) while `merge` is strict about the one structural
//! landmark it needs, the `msgstr ""` header sentinel. Merging only ever
//! appends missing entries and re-stamps the two managed timestamp fields;
//! existing body bytes are preserved untouched, which is what makes repeated
//! merges with the same pairs a no-op on the body.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashSet;

use thiserror::Error;
use time::OffsetDateTime;

use crate::core::catalog::MAX_MSGID_CHARS;
use crate::core::catalog::PoDocument;
use crate::core::catalog::PoEntry;
use crate::core::time::po_date;
use crate::core::time::po_timestamp;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Structural sentinel terminating the header entry.
const HEADER_SENTINEL: &str = "msgstr \"\"";

/// Marker introducing the managed date comment in the header.
const DATE_COMMENT_MARKER: &str = "# date: ";

/// Marker introducing the managed revision-date header field.
const REVISION_DATE_MARKER: &str = "\"PO-Revision-Date: ";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Structural errors raised by the codec.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - Only `merge` fails; `parse` skips malformed input silently.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PoParseError {
    /// Document has no `msgstr ""` header sentinel.
    #[error("po document is missing the msgstr \"\" header sentinel")]
    MissingHeaderSentinel,
}

// ============================================================================
// SECTION: Header Spec
// ============================================================================

/// Identity fields written into generated PO headers.
///
/// # Invariants
/// - Values are emitted verbatim; callers own any escaping of exotic input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoHeaderSpec {
    /// Project name for the banner comment and `Project-Id-Version`.
    pub project: String,
    /// Value of the `Last-Translator` field.
    pub team: String,
    /// Value of the `Language-Team` field.
    pub team_contact: String,
    /// Value of the `X-Generator` field.
    pub generator: String,
}

impl Default for PoHeaderSpec {
    fn default() -> Self {
        Self {
            project: "po-sync".to_string(),
            team: "po-sync maintainers".to_string(),
            team_contact: "po-sync maintainers <po-sync@localhost>".to_string(),
            generator: concat!("po-sync ", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

// ============================================================================
// SECTION: Parse
// ============================================================================

/// Parses PO text into a document of ordered entries.
///
/// Scans line-oriented `msgid`/`msgstr` pairs, tolerating the single-quoted
/// variant used by bulk-ingestion sources. Backslash escapes are decoded,
/// keys are truncated to [`MAX_MSGID_CHARS`] characters, and the header entry
/// (empty `msgid`) is skipped. Malformed or unmatched lines are skipped
/// silently; a single bad entry never fails the parse. Duplicate `msgid`s are
/// retained as separate entries in file order.
#[must_use]
pub fn parse(text: &str) -> PoDocument {
    let header = header_boundary(text).map_or_else(String::new, |end| text[.. end].to_string());
    let mut entries = Vec::new();
    let mut pending: Option<String> = None;
    for line in text.lines() {
        let trimmed = line.trim();
        if let Some(rest) = keyword_rest(trimmed, "msgid") {
            pending = quoted_value(rest).map(|value| truncate_msgid(unescape(value)));
        } else if let Some(rest) = keyword_rest(trimmed, "msgstr") {
            let value = quoted_value(rest);
            if let (Some(msgid), Some(msgstr)) = (pending.take(), value)
                && !msgid.is_empty()
            {
                entries.push(PoEntry {
                    msgid,
                    msgstr: unescape(msgstr),
                });
            }
        }
    }
    PoDocument {
        header,
        entries,
    }
}

// ============================================================================
// SECTION: Serialize
// ============================================================================

/// Serializes entries into a complete PO document with a generated header.
///
/// The header carries the project identity from `spec`, both timestamp fields
/// rendered from `now` at the fixed reference offset, and the standard
/// MIME/encoding boilerplate. Each entry becomes one `msgid`/`msgstr` block
/// with `"` and newline escaped.
#[must_use]
pub fn serialize(
    spec: &PoHeaderSpec,
    language_name: &str,
    language_code: &str,
    entries: &[PoEntry],
    now: OffsetDateTime,
) -> String {
    let stamp = po_timestamp(now);
    let mut lines: Vec<String> = vec![
        format!("# Autogenerated by {}", spec.project),
        "#".to_string(),
        format!("# language: {language_name}"),
        format!("# locale: {language_code}"),
        format!("# date: {}", po_date(now)),
        "#".to_string(),
        "msgid \"\"".to_string(),
        "msgstr \"\"".to_string(),
        format!("\"Project-Id-Version: {}-0.000\\n\"", spec.project),
        format!("\"POT-Creation-Date: {stamp}\\n\""),
        format!("\"PO-Revision-Date: {stamp}\\n\""),
        format!("\"Last-Translator: {}\\n\"", spec.team),
        format!("\"Language-Team: {}\\n\"", spec.team_contact),
        format!("\"Language: {language_code}\\n\""),
        "\"MIME-Version: 1.0\\n\"".to_string(),
        "\"Content-Type: text/plain; charset=UTF-8\\n\"".to_string(),
        "\"Content-Transfer-Encoding: 8bit\\n\"".to_string(),
        "\"Plural-Forms: nplurals=2; plural=n != 1;\\n\"".to_string(),
        format!("\"X-Generator: {}\\n\"", spec.generator),
        String::new(),
    ];
    for entry in entries {
        lines.push(format!("msgid \"{}\"", escape(&entry.msgid)));
        lines.push(format!("msgstr \"{}\"\n", escape(&entry.msgstr)));
    }
    lines.join("\n")
}

// ============================================================================
// SECTION: Merge
// ============================================================================

/// Appends missing pairs to an existing PO document and re-stamps its
/// managed timestamp fields.
///
/// The `# date:` comment and `PO-Revision-Date:` field are rewritten from
/// `now`; everything else in the header passes through unchanged. Pairs whose
/// `msgid` already appears in the body are dropped; the remainder are
/// appended after exactly one blank line of separation. Existing entries are
/// never rewritten or reordered. When nothing is left to append, the input
/// is returned unchanged apart from the timestamp fields.
///
/// # Errors
///
/// Returns [`PoParseError::MissingHeaderSentinel`] when the document lacks
/// the `msgstr ""` header sentinel; such a file is not a valid catalogue
/// and must not be patched silently.
pub fn merge(
    existing_text: &str,
    new_pairs: &[(String, String)],
    now: OffsetDateTime,
) -> Result<String, PoParseError> {
    let restamped = restamp_revision_date(
        &restamp_date_comment(existing_text, &po_date(now)),
        &po_timestamp(now),
    );
    let boundary =
        header_boundary(&restamped).ok_or(PoParseError::MissingHeaderSentinel)?;
    let (header, body) = restamped.split_at(boundary);
    let body_document = parse(body);
    let present: HashSet<&str> =
        body_document.entries.iter().map(|entry| entry.msgid.as_str()).collect();
    // Filtered before any body edit so an all-duplicates merge leaves the
    // body bytes untouched.
    let to_append: Vec<&(String, String)> =
        new_pairs.iter().filter(|(msgid, _)| !present.contains(msgid.as_str())).collect();
    if to_append.is_empty() {
        return Ok(restamped);
    }
    let mut body = body.to_string();
    if !body.is_empty() && !body.ends_with("\n\n") {
        body = format!("{}\n\n", body.trim_end());
    }
    for (msgid, msgstr) in to_append {
        body.push_str(&format!(
            "msgid \"{}\"\nmsgstr \"{}\"\n\n",
            escape(msgid),
            escape(msgstr)
        ));
    }
    Ok(format!("{header}{body}"))
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns the byte offset one past the header sentinel line, if present.
fn header_boundary(text: &str) -> Option<usize> {
    let start = text.find(HEADER_SENTINEL)?;
    let mut end = start + HEADER_SENTINEL.len();
    if text[end ..].starts_with('\n') {
        end += 1;
    }
    Some(end)
}

/// Strips a keyword prefix, returning the remainder when it is a value line.
fn keyword_rest<'a>(line: &'a str, keyword: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(keyword)?;
    rest.starts_with(char::is_whitespace).then_some(rest)
}

/// Extracts the inside of a double- or single-quoted value.
fn quoted_value(raw: &str) -> Option<&str> {
    let raw = raw.trim();
    for quote in ['"', '\''] {
        if raw.len() >= 2 && raw.starts_with(quote) && raw.ends_with(quote) {
            return Some(&raw[1 .. raw.len() - 1]);
        }
    }
    None
}

/// Truncates a key to the catalogue column width.
fn truncate_msgid(value: String) -> String {
    if value.chars().count() > MAX_MSGID_CHARS {
        value.chars().take(MAX_MSGID_CHARS).collect()
    } else {
        value
    }
}

/// Escapes a value for emission inside a double-quoted PO string.
fn escape(value: &str) -> String {
    value.replace('"', "\\\"").replace('\n', "\\n")
}

/// Decodes backslash escapes; unknown sequences pass through verbatim.
fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('"') => out.push('"'),
            Some('\'') => out.push('\''),
            Some('\\') => out.push('\\'),
            Some('u') => {
                let digits: String = chars.clone().take(4).collect();
                let decoded = (digits.chars().count() == 4)
                    .then(|| u32::from_str_radix(&digits, 16).ok())
                    .flatten()
                    .and_then(char::from_u32);
                if let Some(decoded) = decoded {
                    out.push(decoded);
                    for _ in 0 .. 4 {
                        chars.next();
                    }
                } else {
                    out.push('\\');
                    out.push('u');
                }
            }
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Rewrites the `# date:` comment value, leaving the text untouched when the
/// marker or a date run is absent.
fn restamp_date_comment(text: &str, date: &str) -> String {
    let Some(start) = text.find(DATE_COMMENT_MARKER) else {
        return text.to_string();
    };
    let value_start = start + DATE_COMMENT_MARKER.len();
    let tail = &text[value_start ..];
    let run = tail
        .find(|ch: char| !(ch.is_ascii_digit() || ch == '-'))
        .unwrap_or(tail.len());
    if run == 0 {
        return text.to_string();
    }
    format!("{}{date}{}", &text[.. value_start], &tail[run ..])
}

/// Rewrites the `PO-Revision-Date:` field value, leaving the text untouched
/// when the field is absent or not terminated by the literal `\n"` escape.
fn restamp_revision_date(text: &str, stamp: &str) -> String {
    let Some(start) = text.find(REVISION_DATE_MARKER) else {
        return text.to_string();
    };
    let value_start = start + REVISION_DATE_MARKER.len();
    let tail = &text[value_start ..];
    let run = tail
        .find(|ch: char| {
            !(ch.is_ascii_digit() || ch.is_whitespace() || ch == ':' || ch == '+' || ch == '-')
        })
        .unwrap_or(tail.len());
    if run == 0 || !tail[run ..].starts_with("\\n\"") {
        return text.to_string();
    }
    format!("{}{stamp}{}", &text[.. value_start], &tail[run ..])
}
