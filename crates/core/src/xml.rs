//! Marshal / unmarshal the manifest and report trees.

use std::fmt;

use quick_xml::de::from_str;
use quick_xml::se::Serializer;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::report::Report;
use crate::request::Pkg;

const INDENT: usize = 4;

#[derive(Debug)]
pub enum XmlError {
    /// Value could not be written as XML.
    Serialize(String),
    /// Text is not a well-formed document of the expected shape.
    Deserialize(String),
}

impl fmt::Display for XmlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Serialize(msg) => write!(f, "XML serialization error: {msg}"),
            Self::Deserialize(msg) => write!(f, "XML parse error: {msg}"),
        }
    }
}

impl std::error::Error for XmlError {}

/// Serialize with the type's root element name and four-space indentation.
pub fn to_xml<T: Serialize>(value: &T) -> Result<String, XmlError> {
    let mut out = String::new();
    let mut ser = Serializer::new(&mut out);
    ser.indent(' ', INDENT);
    value
        .serialize(ser)
        .map_err(|e| XmlError::Serialize(e.to_string()))?;
    Ok(out)
}

pub fn from_xml<T: DeserializeOwned>(text: &str) -> Result<T, XmlError> {
    from_str(text).map_err(|e| XmlError::Deserialize(e.to_string()))
}

impl Pkg {
    pub fn to_xml(&self) -> Result<String, XmlError> {
        to_xml(self)
    }

    pub fn from_xml(text: &str) -> Result<Self, XmlError> {
        from_xml(text)
    }
}

impl Report {
    pub fn to_xml(&self) -> Result<String, XmlError> {
        to_xml(self)
    }

    pub fn from_xml(text: &str) -> Result<Self, XmlError> {
        from_xml(text)
    }
}
