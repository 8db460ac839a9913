//! Raw `multipart/form-data` decoding.
//!
//! The decoder walks the body once with a byte cursor:
//! `SeekingBoundary → ReadingHeaders → ReadingPayload → (ReadingHeaders | Done)`.
//! A section that cannot be split into headers and payload is dropped on its
//! own; it never aborts the rest of the decode. The only hard failures are a
//! content type that is not multipart and a missing boundary, both detected by
//! [`boundary_from_content_type`] before any decoding happens.

use std::collections::HashMap;

use thiserror::Error;
use tracing::debug;

pub mod form;

pub use form::FormData;

const HEADER_SEPARATOR: &[u8] = b"\r\n\r\n";
const CRLF: &[u8] = b"\r\n";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MultipartError {
    #[error("unsupported content type: expected multipart/form-data, got '{0}'")]
    UnsupportedContentType(String),

    #[error("multipart content type is missing the boundary parameter")]
    MissingBoundary,
}

/// One decoded section of a multipart body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartPart {
    /// Raw header block, kept verbatim for attribute extraction.
    pub headers: String,
    /// `name="..."` from the disposition, if present and non-empty.
    pub name: Option<String>,
    /// `Some` iff the disposition carries a `filename="..."` attribute.
    /// The value may be empty; callers substitute a default name.
    pub filename: Option<String>,
    pub data: Vec<u8>,
}

impl MultipartPart {
    pub fn is_file(&self) -> bool {
        self.filename.is_some()
    }

    /// Payload as text. Invalid UTF-8 sequences are replaced, not rejected.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.data).into_owned()
    }
}

/// Validates a `Content-Type` header value and returns its boundary token.
pub fn boundary_from_content_type(content_type: &str) -> Result<String, MultipartError> {
    let mut params = content_type.split(';');
    let mime = params.next().unwrap_or_default().trim();
    if !mime.eq_ignore_ascii_case("multipart/form-data") {
        return Err(MultipartError::UnsupportedContentType(content_type.to_string()));
    }

    let boundary = params
        .filter_map(|p| p.split_once('='))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case("boundary"))
        .map(|(_, value)| value.trim().trim_matches('"').to_string())
        .ok_or(MultipartError::MissingBoundary)?;

    if boundary.is_empty() {
        return Err(MultipartError::MissingBoundary);
    }
    Ok(boundary)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    SeekingBoundary,
    ReadingHeaders,
    ReadingPayload { header_end: usize },
    Done,
}

/// Decodes a raw body into its parts, in body order.
pub fn decode(body: &[u8], boundary: &str) -> Vec<MultipartPart> {
    let delimiter = format!("--{boundary}").into_bytes();
    let mut parts = Vec::new();
    let mut state = State::SeekingBoundary;
    // Start of the current section (first byte after a delimiter).
    let mut section_start = 0;
    // End of the current section (start of the next delimiter, or end of body).
    let mut section_end = 0;

    loop {
        state = match state {
            State::SeekingBoundary => match find(body, &delimiter, 0) {
                Some(pos) => {
                    section_start = pos + delimiter.len();
                    enter_section(body, &delimiter, section_start, &mut section_end)
                }
                None => State::Done,
            },
            State::ReadingHeaders => {
                let section = &body[section_start..section_end];
                if section.iter().all(u8::is_ascii_whitespace) {
                    next_section(body, &delimiter, section_end, &mut section_start, &mut section_end)
                } else {
                    match find(section, HEADER_SEPARATOR, 0) {
                        Some(header_end) => State::ReadingPayload { header_end },
                        None => {
                            debug!(
                                "Dropping multipart section at byte {section_start}: no header separator"
                            );
                            next_section(
                                body,
                                &delimiter,
                                section_end,
                                &mut section_start,
                                &mut section_end,
                            )
                        }
                    }
                }
            }
            State::ReadingPayload { header_end } => {
                let section = &body[section_start..section_end];
                let headers = String::from_utf8_lossy(&section[..header_end]);
                let headers = headers.trim_start_matches(['\r', '\n']).to_string();
                let payload = &section[header_end + HEADER_SEPARATOR.len()..];
                let payload = payload.strip_suffix(CRLF).unwrap_or(payload);

                parts.push(MultipartPart {
                    name: disposition_param(&headers, "name").filter(|n| !n.is_empty()),
                    filename: disposition_param(&headers, "filename"),
                    headers,
                    data: payload.to_vec(),
                });
                next_section(body, &delimiter, section_end, &mut section_start, &mut section_end)
            }
            State::Done => break,
        };
    }

    parts
}

/// Positions the cursor on the section following the delimiter that starts at
/// `delimiter_pos`.
fn next_section(
    body: &[u8],
    delimiter: &[u8],
    delimiter_pos: usize,
    section_start: &mut usize,
    section_end: &mut usize,
) -> State {
    if delimiter_pos >= body.len() {
        return State::Done;
    }
    *section_start = delimiter_pos + delimiter.len();
    enter_section(body, delimiter, *section_start, section_end)
}

fn enter_section(body: &[u8], delimiter: &[u8], start: usize, section_end: &mut usize) -> State {
    // `--<boundary>--` closes the body; anything after it is epilogue.
    if body[start..].starts_with(b"--") {
        return State::Done;
    }
    *section_end = find(body, delimiter, start).unwrap_or(body.len());
    State::ReadingHeaders
}

/// Extracts `key="value"` from a header block. The key must stand on its own,
/// so `name` does not match inside `filename`.
fn disposition_param(headers: &str, key: &str) -> Option<String> {
    let needle = format!("{key}=\"");
    let mut from = 0;
    while let Some(offset) = headers[from..].find(&needle) {
        let at = from + offset;
        let standalone = headers[..at]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_ascii_alphanumeric() && c != '_' && c != '*');
        let value_start = at + needle.len();
        if standalone {
            let value_end = headers[value_start..].find('"')?;
            return Some(headers[value_start..value_start + value_end].to_string());
        }
        from = value_start;
    }
    None
}

fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if needle.is_empty() || from >= haystack.len() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|p| p + from)
}

/// Collects named non-file parts into a map. Later fields with the same name
/// overwrite earlier ones.
pub fn field_map(parts: &[MultipartPart]) -> HashMap<String, String> {
    parts
        .iter()
        .filter(|p| !p.is_file())
        .filter_map(|p| p.name.clone().map(|name| (name, p.text())))
        .collect()
}
