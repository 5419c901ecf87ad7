//! `multipart/form-data` encoding.
//!
//! Layout: scalar fields first, then file parts, each opened by
//! `--{boundary}\r\n` with `Content-Disposition` and `Content-Type` headers,
//! and the body closed by `--{boundary}--\r\n`.

use bytes::{BufMut, Bytes, BytesMut};
use serde::Serialize;

use crate::error::{ApiError, ApiResult};

const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

#[derive(Debug, Clone, PartialEq)]
pub struct FormField {
    pub name: String,
    pub content_type: String,
    pub value: Bytes,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilePart {
    pub name: String,
    pub filename: String,
    pub content_type: String,
    pub data: Bytes,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MultipartForm {
    boundary: String,
    fields: Vec<FormField>,
    files: Vec<FilePart>,
}

impl Default for MultipartForm {
    fn default() -> Self {
        Self::new()
    }
}

impl MultipartForm {
    /// New form with a random boundary.
    pub fn new() -> Self {
        Self::with_boundary(format!("Boundary-{}", uuid::Uuid::new_v4().simple()))
    }

    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
            fields: Vec::new(),
            files: Vec::new(),
        }
    }

    pub fn text(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.fields.push(FormField {
            name: name.into(),
            content_type: TEXT_CONTENT_TYPE.to_string(),
            value: Bytes::from(value.to_string()),
        });
        self
    }

    /// Scalar field holding a JSON document.
    pub fn json<T: Serialize + ?Sized>(mut self, name: impl Into<String>, value: &T) -> ApiResult<Self> {
        let encoded = serde_json::to_vec(value).map_err(|e| ApiError::EncodingError(e.to_string()))?;
        self.fields.push(FormField {
            name: name.into(),
            content_type: "application/json".to_string(),
            value: Bytes::from(encoded),
        });
        Ok(self)
    }

    pub fn file(
        mut self,
        name: impl Into<String>,
        filename: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        self.files.push(FilePart {
            name: name.into(),
            filename: filename.into(),
            content_type: content_type.into(),
            data: data.into(),
        });
        self
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Value for the request's `Content-Type` header.
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    pub fn part_count(&self) -> usize {
        self.fields.len() + self.files.len()
    }

    pub fn encode(&self) -> Bytes {
        let payload: usize = self.fields.iter().map(|f| f.value.len()).sum::<usize>()
            + self.files.iter().map(|f| f.data.len()).sum::<usize>();
        let mut buf = BytesMut::with_capacity(payload + 160 * (self.part_count() + 1));

        for field in &self.fields {
            self.open_part(&mut buf);
            buf.put_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"\r\n",
                    quote(&field.name)
                )
                .as_bytes(),
            );
            buf.put_slice(format!("Content-Type: {}\r\n\r\n", field.content_type).as_bytes());
            buf.put_slice(&field.value);
            buf.put_slice(b"\r\n");
        }

        for file in &self.files {
            self.open_part(&mut buf);
            buf.put_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                    quote(&file.name),
                    quote(&file.filename)
                )
                .as_bytes(),
            );
            buf.put_slice(format!("Content-Type: {}\r\n\r\n", file.content_type).as_bytes());
            buf.put_slice(&file.data);
            buf.put_slice(b"\r\n");
        }

        buf.put_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        buf.freeze()
    }

    fn open_part(&self, buf: &mut BytesMut) {
        buf.put_slice(format!("--{}\r\n", self.boundary).as_bytes());
    }
}

/// Escape a parameter value for a quoted header string.
fn quote(value: &str) -> String {
    value
        .replace('"', "%22")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_form_is_only_the_closing_marker() {
        let form = MultipartForm::with_boundary("B");
        assert_eq!(&form.encode()[..], b"--B--\r\n");
    }

    #[test]
    fn test_fields_precede_files() {
        let form = MultipartForm::with_boundary("B")
            .file("photos", "a.jpg", "image/jpeg", &b"JPEG"[..])
            .text("generate_story", false);

        let body = String::from_utf8(form.encode().to_vec()).unwrap();
        let field_at = body.find("name=\"generate_story\"").unwrap();
        let file_at = body.find("name=\"photos\"").unwrap();
        assert!(field_at < file_at);
        assert!(body.contains("Content-Type: text/plain; charset=utf-8\r\n\r\nfalse\r\n"));
    }

    #[test]
    fn test_header_values_are_escaped() {
        let form = MultipartForm::with_boundary("B").file("photos", "my \"best\".jpg", "image/jpeg", Bytes::new());
        let body = String::from_utf8(form.encode().to_vec()).unwrap();
        assert!(body.contains("filename=\"my %22best%22.jpg\""));
    }

    #[test]
    fn test_random_boundaries_differ() {
        assert_ne!(MultipartForm::new().boundary(), MultipartForm::new().boundary());
        assert!(MultipartForm::new().content_type().starts_with("multipart/form-data; boundary=Boundary-"));
    }
}
