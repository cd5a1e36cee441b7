use std::fmt;

use serde::{Deserialize, Serialize};

use crate::metadata::Metadata;

/// Processing outcome of one document, as written by the downstream system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DocumentStatus {
    Succeeded,
    Failed,
    /// Any other status text; tallied as an error.
    Other(String),
}

impl DocumentStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Succeeded => "Succeeded",
            Self::Failed => "Failed",
            Self::Other(s) => s,
        }
    }
}

impl Default for DocumentStatus {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

impl From<String> for DocumentStatus {
    fn from(s: String) -> Self {
        match s.trim() {
            "Succeeded" => Self::Succeeded,
            "Failed" => Self::Failed,
            _ => Self::Other(s),
        }
    }
}

impl From<DocumentStatus> for String {
    fn from(status: DocumentStatus) -> Self {
        match status {
            DocumentStatus::Other(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportDocument {
    #[serde(rename = "@ID", default)]
    pub id: String,
    #[serde(rename = "@FileName", default)]
    pub file_name: String,
    #[serde(rename = "Status", default)]
    pub status: DocumentStatus,
    #[serde(rename = "ContentID", default, skip_serializing_if = "Option::is_none")]
    pub content_id: Option<String>,
    #[serde(rename = "ErrorCode", default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(rename = "ErrorMessage", default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(rename = "Metadata", default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl ReportDocument {
    /// `"<id> - <fileName>"`, the document reference shown in reconcile output.
    pub fn doc_ref(&self) -> String {
        format!("{} - {}", self.id, self.file_name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportHeader {
    #[serde(rename = "SubmissionDate", default)]
    pub submission_date: String,
    #[serde(rename = "SubmissionTime", default)]
    pub submission_time: String,
    #[serde(rename = "RequestApplication", default)]
    pub request_application: String,
    #[serde(rename = "PackageName", default)]
    pub package_name: String,
    #[serde(rename = "ContentType", default)]
    pub content_type: String,
    #[serde(rename = "ProcessingDuration", default)]
    pub processing_duration: String,
    #[serde(rename = "ProcessingDate", default)]
    pub processing_date: String,
    #[serde(rename = "ProcessingTime", default)]
    pub processing_time: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportTrailer {
    #[serde(rename = "DocumentCount", default, deserialize_with = "count_or_zero")]
    pub document_count: u32,
    #[serde(rename = "SuccessCount", default, deserialize_with = "count_or_zero")]
    pub success_count: u32,
    #[serde(rename = "ErrorCount", default, deserialize_with = "count_or_zero")]
    pub error_count: u32,
}

/// Trailer counts are informational; empty text reads as zero.
fn count_or_zero<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    let text = text.trim();
    if text.is_empty() {
        return Ok(0);
    }
    text.parse().map_err(serde::de::Error::custom)
}

/// Root `REPORT` element of one processing report file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename = "REPORT")]
pub struct Report {
    #[serde(rename = "@ID", default)]
    pub id: String,
    #[serde(rename = "Header", default)]
    pub header: ReportHeader,
    #[serde(rename = "Documents", default, with = "document_list")]
    pub documents: Vec<ReportDocument>,
    #[serde(rename = "Trailer", default)]
    pub trailer: ReportTrailer,
}

impl Report {
    /// Append a document and keep the trailer counts in step.
    pub fn push_document(&mut self, doc: ReportDocument) {
        self.trailer.document_count += 1;
        if doc.status.is_success() {
            self.trailer.success_count += 1;
        } else {
            self.trailer.error_count += 1;
        }
        self.documents.push(doc);
    }
}

mod document_list {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::ReportDocument;

    #[derive(Serialize)]
    struct Wrapped<'a> {
        #[serde(rename = "Document")]
        document: &'a [ReportDocument],
    }

    #[derive(Deserialize)]
    struct Unwrapped {
        #[serde(rename = "Document", default)]
        document: Vec<ReportDocument>,
    }

    #[allow(clippy::ptr_arg)]
    pub fn serialize<S: Serializer>(
        value: &Vec<ReportDocument>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        Wrapped { document: value }.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<ReportDocument>, D::Error> {
        Unwrapped::deserialize(deserializer).map(|list| list.document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_from_text() {
        assert_eq!(DocumentStatus::from("Succeeded".to_string()), DocumentStatus::Succeeded);
        assert_eq!(DocumentStatus::from("Failed".to_string()), DocumentStatus::Failed);
        assert_eq!(
            DocumentStatus::from("Pending".to_string()),
            DocumentStatus::Other("Pending".into())
        );
        assert!(!DocumentStatus::Other("succeeded".into()).is_success());
    }

    #[test]
    fn push_document_updates_trailer() {
        let mut report = Report::default();
        report.push_document(ReportDocument {
            id: "1".into(),
            file_name: "a.pdf".into(),
            status: DocumentStatus::Succeeded,
            ..Default::default()
        });
        report.push_document(ReportDocument {
            id: "2".into(),
            file_name: "b.pdf".into(),
            status: DocumentStatus::Failed,
            ..Default::default()
        });

        assert_eq!(report.trailer.document_count, 2);
        assert_eq!(report.trailer.success_count, 1);
        assert_eq!(report.trailer.error_count, 1);
        assert_eq!(report.documents[1].doc_ref(), "2 - b.pdf");
    }
}
