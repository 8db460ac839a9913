use std::collections::HashMap;

use tracing::debug;

use super::{boundary_from_content_type, decode, field_map, MultipartError, MultipartPart};

/// A decoded form: plain fields by name plus the uploaded file, if any.
#[derive(Debug, Default)]
pub struct FormData {
    pub fields: HashMap<String, String>,
    /// The last file part in the body.
    pub file: Option<MultipartPart>,
}

impl FormData {
    /// Checks the content type, then decodes `body` with its boundary.
    pub fn parse(content_type: &str, body: &[u8]) -> Result<Self, MultipartError> {
        let boundary = boundary_from_content_type(content_type)?;
        Ok(Self::from_parts(decode(body, &boundary)))
    }

    pub fn from_parts(parts: Vec<MultipartPart>) -> Self {
        for part in parts.iter().filter(|p| p.name.is_none() && !p.is_file()) {
            debug!("Ignoring unnamed form part: {:?}", part.headers);
        }
        let fields = field_map(&parts);
        let file = parts.into_iter().filter(MultipartPart::is_file).last();
        Self { fields, file }
    }

    /// Field value exactly as sent, blank values included.
    pub fn raw(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Present and not blank. Only for presence checks; values are passed
    /// on through [`FormData::raw`].
    pub fn has_value(&self, name: &str) -> bool {
        self.raw(name).is_some_and(|v| !v.trim().is_empty())
    }

    pub fn raw_or(&self, name: &str, default: &str) -> String {
        self.raw(name).unwrap_or(default).to_string()
    }
}
