use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};

use crate::api::transport::{FilePart, Payload};
use crate::errors::ClientError;

/// Upload ceiling enforced client-side; the UI advertises "up to 10MB".
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Document categories the backend stores. Wire format is
/// SCREAMING_SNAKE_CASE; user input is parsed case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocType {
    Cv,
    Certificate,
    Recommendation,
    ProfileImage,
    Project,
    Other,
}

impl DocType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocType::Cv => "CV",
            DocType::Certificate => "CERTIFICATE",
            DocType::Recommendation => "RECOMMENDATION",
            DocType::ProfileImage => "PROFILE_IMAGE",
            DocType::Project => "PROJECT",
            DocType::Other => "OTHER",
        }
    }

    /// Accepted upload extensions (lowercase, no dot). Profile images are
    /// image-only; everything else also takes documents.
    pub fn allowed_extensions(&self) -> &'static [&'static str] {
        match self {
            DocType::ProfileImage => &["png", "jpg", "jpeg"],
            _ => &["pdf", "docx", "png", "jpg", "jpeg"],
        }
    }
}

impl fmt::Display for DocType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocType {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CV" => Ok(DocType::Cv),
            "CERTIFICATE" => Ok(DocType::Certificate),
            "RECOMMENDATION" => Ok(DocType::Recommendation),
            "PROFILE_IMAGE" => Ok(DocType::ProfileImage),
            "PROJECT" => Ok(DocType::Project),
            "OTHER" => Ok(DocType::Other),
            other => Err(ClientError::Validation(format!(
                "unknown document type '{other}'"
            ))),
        }
    }
}

/// A server-side document row as the client consumes it.
///
/// `id` is the only stable identity. Everything else varies by `doc_type`:
/// PROJECT rows are link-only (`external_url`/`description`), file rows carry
/// `file`/`original_name`/`size_bytes`. `doc_type` is kept as the raw wire
/// string because filtering compares it case-insensitively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: i64,
    pub doc_type: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub original_name: Option<String>,
    /// On the wire this is either a bare URL string or a `{url: …}` object,
    /// depending on the serializer variant.
    #[serde(default, deserialize_with = "file_url")]
    pub file: Option<String>,
    #[serde(default)]
    pub external_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub size_bytes: Option<u64>,
    #[serde(default)]
    pub uploaded_at: Option<DateTime<Utc>>,
}

impl Document {
    /// Case-insensitive, trimmed `doc_type` comparison.
    pub fn matches_type(&self, doc_type: &str) -> bool {
        self.doc_type.trim().eq_ignore_ascii_case(doc_type.trim())
    }

    /// Display label: trimmed title, else original file name, else the id.
    pub fn label(&self) -> String {
        if let Some(title) = self.title.as_deref() {
            let title = title.trim();
            if !title.is_empty() {
                return title.to_owned();
            }
        }
        if let Some(name) = self.original_name.as_deref() {
            if !name.is_empty() {
                return name.to_owned();
            }
        }
        format!("Item #{}", self.id)
    }

    /// Where the entry points: the stored file when present, the external
    /// link otherwise. Empty strings count as absent.
    pub fn link(&self) -> Option<&str> {
        non_empty(self.file.as_deref()).or_else(|| non_empty(self.external_url.as_deref()))
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn file_url<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(url)) => Some(url),
        Some(Value::Object(map)) => map.get("url").and_then(Value::as_str).map(str::to_owned),
        _ => None,
    })
}

/// Link-only PROJECT entry. `title` and `external_url` are mandatory and
/// checked before any network attempt.
#[derive(Debug, Clone, Serialize)]
pub struct NewProject {
    pub title: String,
    pub external_url: String,
    pub description: String,
}

impl NewProject {
    pub fn new(
        title: impl Into<String>,
        external_url: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            external_url: external_url.into(),
            description: description.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ClientError> {
        if self.title.trim().is_empty() {
            return Err(ClientError::Validation("title is required".into()));
        }
        if self.external_url.trim().is_empty() {
            return Err(ClientError::Validation("external_url is required".into()));
        }
        Ok(())
    }

    pub(crate) fn to_body(&self) -> Value {
        json!({
            "doc_type": DocType::Project.as_str(),
            "title": self.title.trim(),
            "external_url": self.external_url.trim(),
            "description": self.description.trim(),
        })
    }
}

/// Partial edit body; only the set fields go on the wire.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DocumentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_url: Option<String>,
}

impl DocumentPatch {
    pub fn rename(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }
}

/// A file staged for upload, with its destination type.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub file_name: String,
    pub bytes: Bytes,
    pub doc_type: DocType,
}

impl FileUpload {
    pub fn new(file_name: impl Into<String>, bytes: Bytes, doc_type: DocType) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
            doc_type,
        }
    }

    /// Extension and size checks, before any network attempt.
    pub fn validate(&self) -> Result<(), ClientError> {
        let extension = self
            .file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
            .ok_or_else(|| {
                ClientError::Validation(format!("'{}' has no file extension", self.file_name))
            })?;
        if !self
            .doc_type
            .allowed_extensions()
            .contains(&extension.as_str())
        {
            return Err(ClientError::Validation(format!(
                "'.{extension}' is not accepted for {} (allowed: {})",
                self.doc_type,
                self.doc_type.allowed_extensions().join(", ")
            )));
        }
        if self.bytes.len() as u64 > MAX_UPLOAD_BYTES {
            return Err(ClientError::Validation(format!(
                "'{}' is {} bytes; the limit is {MAX_UPLOAD_BYTES}",
                self.file_name,
                self.bytes.len()
            )));
        }
        Ok(())
    }

    pub(crate) fn into_payload(self) -> Payload {
        Payload::Multipart {
            fields: vec![("doc_type".to_owned(), self.doc_type.as_str().to_owned())],
            file: FilePart {
                file_name: self.file_name,
                bytes: self.bytes,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doc_type_wire_format() {
        assert_eq!(serde_json::to_string(&DocType::Cv).unwrap(), "\"CV\"");
        assert_eq!(
            serde_json::to_string(&DocType::ProfileImage).unwrap(),
            "\"PROFILE_IMAGE\""
        );
        let parsed: DocType = serde_json::from_str("\"RECOMMENDATION\"").unwrap();
        assert_eq!(parsed, DocType::Recommendation);
    }

    #[test]
    fn test_doc_type_from_str_is_case_insensitive() {
        assert_eq!(" cv ".parse::<DocType>().unwrap(), DocType::Cv);
        assert_eq!(
            "profile_image".parse::<DocType>().unwrap(),
            DocType::ProfileImage
        );
        assert!("SPREADSHEET".parse::<DocType>().is_err());
    }

    #[test]
    fn test_document_file_accepts_bare_string() {
        let doc: Document = serde_json::from_value(serde_json::json!({
            "id": 1,
            "doc_type": "CV",
            "file": "/media/uploads/cv.pdf",
        }))
        .unwrap();
        assert_eq!(doc.file.as_deref(), Some("/media/uploads/cv.pdf"));
    }

    #[test]
    fn test_document_file_accepts_url_object() {
        let doc: Document = serde_json::from_value(serde_json::json!({
            "id": 1,
            "doc_type": "CV",
            "file": { "url": "/media/uploads/cv.pdf", "name": "cv.pdf" },
        }))
        .unwrap();
        assert_eq!(doc.file.as_deref(), Some("/media/uploads/cv.pdf"));
    }

    #[test]
    fn test_document_file_null_and_missing_are_none() {
        let with_null: Document = serde_json::from_value(serde_json::json!({
            "id": 1, "doc_type": "PROJECT", "file": null,
        }))
        .unwrap();
        assert!(with_null.file.is_none());

        let missing: Document =
            serde_json::from_value(serde_json::json!({ "id": 2, "doc_type": "PROJECT" })).unwrap();
        assert!(missing.file.is_none());
    }

    #[test]
    fn test_label_precedence() {
        let mut doc = Document {
            id: 12,
            doc_type: "CV".to_owned(),
            title: Some("  My CV  ".to_owned()),
            original_name: Some("cv_final_v3.pdf".to_owned()),
            file: None,
            external_url: None,
            description: None,
            size_bytes: None,
            uploaded_at: None,
        };
        assert_eq!(doc.label(), "My CV");

        doc.title = Some("   ".to_owned());
        assert_eq!(doc.label(), "cv_final_v3.pdf");

        doc.original_name = None;
        assert_eq!(doc.label(), "Item #12");
    }

    #[test]
    fn test_link_skips_empty_strings() {
        let doc: Document = serde_json::from_value(serde_json::json!({
            "id": 1,
            "doc_type": "PROJECT",
            "file": null,
            "external_url": "",
        }))
        .unwrap();
        assert_eq!(doc.link(), None);

        let linked: Document = serde_json::from_value(serde_json::json!({
            "id": 1,
            "doc_type": "PROJECT",
            "external_url": "https://github.com/me/demo",
        }))
        .unwrap();
        assert_eq!(linked.link(), Some("https://github.com/me/demo"));
    }

    #[test]
    fn test_link_prefers_file_over_external_url() {
        let doc: Document = serde_json::from_value(serde_json::json!({
            "id": 1,
            "doc_type": "PROJECT",
            "file": "/media/shot.png",
            "external_url": "https://github.com/me/demo",
        }))
        .unwrap();
        assert_eq!(doc.link(), Some("/media/shot.png"));
    }

    #[test]
    fn test_new_project_trims_fields_in_body() {
        let project = NewProject::new(" demo ", " https://github.com/me/demo ", " toy ");
        let body = project.to_body();
        assert_eq!(body["title"], "demo");
        assert_eq!(body["external_url"], "https://github.com/me/demo");
        assert_eq!(body["description"], "toy");
        assert_eq!(body["doc_type"], "PROJECT");
    }

    #[test]
    fn test_new_project_requires_title_and_url() {
        assert!(NewProject::new("", "https://x", "").validate().is_err());
        assert!(NewProject::new("demo", " ", "").validate().is_err());
        assert!(NewProject::new("demo", "https://x", "").validate().is_ok());
    }

    #[test]
    fn test_rename_patch_serializes_title_only() {
        let body = serde_json::to_value(DocumentPatch::rename("New")).unwrap();
        assert_eq!(body, serde_json::json!({ "title": "New" }));
    }

    #[test]
    fn test_upload_validation_extension_by_type() {
        let pdf = FileUpload::new("cv.pdf", Bytes::from_static(b"x"), DocType::Cv);
        assert!(pdf.validate().is_ok());

        let pdf_avatar = FileUpload::new("me.pdf", Bytes::from_static(b"x"), DocType::ProfileImage);
        assert!(pdf_avatar.validate().is_err());

        let png_avatar = FileUpload::new("me.PNG", Bytes::from_static(b"x"), DocType::ProfileImage);
        assert!(png_avatar.validate().is_ok());

        let no_ext = FileUpload::new("README", Bytes::from_static(b"x"), DocType::Other);
        assert!(no_ext.validate().is_err());
    }

    #[test]
    fn test_upload_validation_size_ceiling() {
        let big = FileUpload::new(
            "huge.pdf",
            Bytes::from(vec![0u8; (MAX_UPLOAD_BYTES + 1) as usize]),
            DocType::Cv,
        );
        assert!(big.validate().is_err());

        let exactly = FileUpload::new(
            "fits.pdf",
            Bytes::from(vec![0u8; MAX_UPLOAD_BYTES as usize]),
            DocType::Cv,
        );
        assert!(exactly.validate().is_ok());
    }

    #[test]
    fn test_matches_type_normalizes_both_sides() {
        let doc: Document =
            serde_json::from_value(serde_json::json!({ "id": 1, "doc_type": " cv " })).unwrap();
        assert!(doc.matches_type("CV"));
        assert!(doc.matches_type("cv "));
        assert!(!doc.matches_type("CERTIFICATE"));
    }
}
