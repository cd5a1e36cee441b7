use serde::{Deserialize, Serialize};

use crate::metadata::Metadata;

/// One spreadsheet row describing one file to package.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    /// 0-based source row, for traceability only.
    #[serde(skip)]
    pub row_number: usize,
    #[serde(rename = "@ID")]
    pub id: String,
    #[serde(rename = "@FileName")]
    pub file_name: String,
    #[serde(rename = "@MimeType", default)]
    pub mime_type: String,
    #[serde(rename = "@DocName", default, skip_serializing_if = "Option::is_none")]
    pub doc_name: Option<String>,
    #[serde(rename = "Metadata", default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl Request {
    pub fn tag_value(&self, name: &str) -> Option<&str> {
        self.metadata.as_ref()?.tag_value(name)
    }

    pub fn group_tag_value(
        &self,
        group_id: Option<&str>,
        group_name: &str,
        tag_name: &str,
    ) -> Option<&str> {
        self.metadata
            .as_ref()?
            .group_tag_value(group_id, group_name, tag_name)
    }
}

// ---------------------------------------------------------------------------
// Package manifest
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PkgHeader {
    #[serde(rename = "SubmissionDate", default)]
    pub submission_date: String,
    #[serde(rename = "SubmissionTime", default)]
    pub submission_time: String,
    #[serde(rename = "Source", default)]
    pub source: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PkgTrailer {
    #[serde(rename = "RequestCount", default)]
    pub request_count: i16,
}

/// Largest request count the manifest trailer can carry.
pub const MAX_PKG_REQUESTS: usize = i16::MAX as usize;

/// The `Package` manifest: either a whole parsed batch or one archive split.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename = "Package")]
pub struct Pkg {
    #[serde(rename = "@ID", default)]
    pub id: String,
    #[serde(rename = "Header", default)]
    pub header: PkgHeader,
    #[serde(rename = "Requests", default, with = "request_list")]
    pub requests: Vec<Request>,
    #[serde(rename = "Trailer", default)]
    pub trailer: PkgTrailer,
}

impl Pkg {
    /// Manifest for exactly `requests`, with the trailer count filled in.
    /// The count saturates at [`MAX_PKG_REQUESTS`].
    pub fn new(id: impl Into<String>, header: PkgHeader, requests: Vec<Request>) -> Self {
        let request_count = i16::try_from(requests.len()).unwrap_or_else(|_| {
            log::warn!(
                "{} requests exceed the manifest limit of {MAX_PKG_REQUESTS}; RequestCount is capped",
                requests.len()
            );
            i16::MAX
        });
        Self {
            id: id.into(),
            header,
            requests,
            trailer: PkgTrailer { request_count },
        }
    }
}

mod request_list {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::Request;

    #[derive(Serialize)]
    struct Wrapped<'a> {
        #[serde(rename = "Request")]
        request: &'a [Request],
    }

    #[derive(Deserialize)]
    struct Unwrapped {
        #[serde(rename = "Request", default)]
        request: Vec<Request>,
    }

    #[allow(clippy::ptr_arg)]
    pub fn serialize<S: Serializer>(value: &Vec<Request>, serializer: S) -> Result<S::Ok, S::Error> {
        Wrapped { request: value }.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Request>, D::Error> {
        Unwrapped::deserialize(deserializer).map(|list| list.request)
    }
}
