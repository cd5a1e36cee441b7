// Validated settings built from a Properties file

use std::fmt;
use std::path::{Path, PathBuf};

use zippkg_core::{HeaderSyntax, ParseOptions};
use zippkg_io::package::{
    DEFAULT_FILE_NAME_PATTERN, DEFAULT_MAX_SIZE, DEFAULT_META_XML_FILE_NAME, DEFAULT_SOURCE_ID,
};
use zippkg_io::PackageOptions;

use crate::properties::Properties;

pub const KEY_MAX_SIZE: &str = "zip-package-max-size";
pub const KEY_FILE_NAME_PATTERN: &str = "zip-package-target-file-name-pattern";
pub const KEY_SOURCE_ID: &str = "zip-package-source-id";
pub const KEY_META_XML_FILE_NAME: &str = "zip-package-meta-xml-file-name";
pub const KEY_GROUP_PREFIX: &str = "group-name-prefix";
pub const KEY_GROUP_SUFFIX: &str = "group-name-suffix";
pub const KEY_GROUP_ID_DELIMITER: &str = "group-id-name-delimiter";
pub const KEY_EMPTY_COL_LIMIT: &str = "continuous-empty-col-limit";
pub const KEY_EMPTY_ROW_LIMIT: &str = "continuous-empty-row-limit";
pub const KEY_DEFAULT_MIME_TYPE: &str = "default-mime-type";
pub const KEY_DEFAULT_DOC_NAME: &str = "default-doc-name";

const MB: u64 = 1024 * 1024;

/// A config key after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Setting<T> {
    Absent,
    Valid(T),
    Invalid { raw: String, reason: String },
}

impl<T> Setting<T> {
    pub fn read(props: &Properties, key: &str, parse: impl FnOnce(&str) -> Result<T, String>) -> Self {
        match props.get(key) {
            None => Self::Absent,
            Some(raw) => match parse(raw) {
                Ok(value) => Self::Valid(value),
                Err(reason) => Self::Invalid { raw: raw.to_string(), reason },
            },
        }
    }

    /// The valid value or `default`; an invalid value is recorded in `warnings`.
    fn or_default(self, key: &str, default: T, warnings: &mut Vec<ConfigWarning>) -> T {
        match self {
            Self::Absent => default,
            Self::Valid(value) => value,
            Self::Invalid { raw, reason } => {
                warnings.push(ConfigWarning::InvalidValue { key: key.to_string(), raw, reason });
                default
            }
        }
    }
}

/// A config problem that was worked around by keeping a default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// Config file missing or unreadable; all defaults apply.
    Unreadable { path: PathBuf, message: String },
    InvalidValue { key: String, raw: String, reason: String },
    /// One of a pair of keys that only apply together.
    Unpaired { key: String, missing: String },
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unreadable { path, message } => {
                write!(f, "cannot read config {} ({message}), using defaults", path.display())
            }
            Self::InvalidValue { key, raw, reason } => {
                write!(f, "ignoring {key}={raw}: {reason}")
            }
            Self::Unpaired { key, missing } => {
                write!(f, "ignoring {key}: {missing} must be set as well")
            }
        }
    }
}

impl std::error::Error for ConfigWarning {}

/// Archive settings from the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSettings {
    pub max_size: u64,
    pub file_name_pattern: String,
    pub source_id: String,
    pub meta_xml_file_name: String,
}

impl Default for PackageSettings {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_SIZE,
            file_name_pattern: DEFAULT_FILE_NAME_PATTERN.into(),
            source_id: DEFAULT_SOURCE_ID.into(),
            meta_xml_file_name: DEFAULT_META_XML_FILE_NAME.into(),
        }
    }
}

impl PackageSettings {
    /// Full packaging options for the given directories.
    pub fn to_options(&self, src_dir: &Path, dst_dir: &Path, unzip: bool) -> PackageOptions {
        PackageOptions {
            src_dir: src_dir.to_path_buf(),
            dst_dir: dst_dir.to_path_buf(),
            max_size: self.max_size,
            file_name_pattern: self.file_name_pattern.clone(),
            unzip,
            source_id: self.source_id.clone(),
            meta_xml_file_name: self.meta_xml_file_name.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub parse: ParseOptions,
    pub package: PackageSettings,
}

impl Settings {
    /// Load `path`. A missing or unreadable file yields defaults and a warning.
    pub fn load(path: &Path) -> (Self, Vec<ConfigWarning>) {
        match Properties::load(path) {
            Ok(props) => Self::from_properties(&props),
            Err(e) => {
                let warning = ConfigWarning::Unreadable {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                };
                log::warn!("{warning}");
                (Self::default(), vec![warning])
            }
        }
    }

    pub fn from_properties(props: &Properties) -> (Self, Vec<ConfigWarning>) {
        let mut warnings = Vec::new();
        let parse_defaults = ParseOptions::default();
        let package_defaults = PackageSettings::default();
        let syntax_defaults = HeaderSyntax::default();

        let (group_prefix, group_suffix) = group_delimiters(props, &syntax_defaults, &mut warnings);
        let syntax = HeaderSyntax {
            group_prefix,
            group_suffix,
            group_id_delimiter: Setting::read(props, KEY_GROUP_ID_DELIMITER, |raw| Ok(raw.to_string()))
                .or_default(KEY_GROUP_ID_DELIMITER, syntax_defaults.group_id_delimiter, &mut warnings),
        };

        let parse = ParseOptions {
            sheet_name: parse_defaults.sheet_name,
            syntax,
            empty_col_limit: Setting::read(props, KEY_EMPTY_COL_LIMIT, parse_limit)
                .or_default(KEY_EMPTY_COL_LIMIT, parse_defaults.empty_col_limit, &mut warnings),
            empty_row_limit: Setting::read(props, KEY_EMPTY_ROW_LIMIT, parse_limit)
                .or_default(KEY_EMPTY_ROW_LIMIT, parse_defaults.empty_row_limit, &mut warnings),
            default_mime_type: Setting::read(props, KEY_DEFAULT_MIME_TYPE, non_empty)
                .or_default(KEY_DEFAULT_MIME_TYPE, None, &mut warnings),
            default_doc_name: Setting::read(props, KEY_DEFAULT_DOC_NAME, non_empty)
                .or_default(KEY_DEFAULT_DOC_NAME, None, &mut warnings),
        };

        let package = PackageSettings {
            max_size: Setting::read(props, KEY_MAX_SIZE, parse_max_size)
                .or_default(KEY_MAX_SIZE, package_defaults.max_size, &mut warnings),
            file_name_pattern: Setting::read(props, KEY_FILE_NAME_PATTERN, required_text)
                .or_default(KEY_FILE_NAME_PATTERN, package_defaults.file_name_pattern, &mut warnings),
            source_id: Setting::read(props, KEY_SOURCE_ID, |raw| Ok(raw.to_string()))
                .or_default(KEY_SOURCE_ID, package_defaults.source_id, &mut warnings),
            meta_xml_file_name: Setting::read(props, KEY_META_XML_FILE_NAME, required_text)
                .or_default(KEY_META_XML_FILE_NAME, package_defaults.meta_xml_file_name, &mut warnings),
        };

        for warning in &warnings {
            log::warn!("{warning}");
        }
        (Self { parse, package }, warnings)
    }
}

/// Prefix and suffix apply only as a pair; the suffix may not be empty.
fn group_delimiters(
    props: &Properties,
    defaults: &HeaderSyntax,
    warnings: &mut Vec<ConfigWarning>,
) -> (String, String) {
    let fallback = (defaults.group_prefix.clone(), defaults.group_suffix.clone());
    match (props.get(KEY_GROUP_PREFIX), props.get(KEY_GROUP_SUFFIX)) {
        (None, None) => fallback,
        (Some(_), None) => {
            warnings.push(ConfigWarning::Unpaired {
                key: KEY_GROUP_PREFIX.into(),
                missing: KEY_GROUP_SUFFIX.into(),
            });
            fallback
        }
        (None, Some(_)) => {
            warnings.push(ConfigWarning::Unpaired {
                key: KEY_GROUP_SUFFIX.into(),
                missing: KEY_GROUP_PREFIX.into(),
            });
            fallback
        }
        (Some(_), Some("")) => {
            warnings.push(ConfigWarning::InvalidValue {
                key: KEY_GROUP_SUFFIX.into(),
                raw: String::new(),
                reason: "must not be empty".into(),
            });
            fallback
        }
        (Some(prefix), Some(suffix)) => (prefix.to_string(), suffix.to_string()),
    }
}

/// Size with an optional `k`/`kb`/`m`/`mb`/`g`/`gb` suffix; bare numbers are MB.
pub fn parse_max_size(raw: &str) -> Result<u64, String> {
    let lower = raw.trim().to_ascii_lowercase();
    let (digits, unit) = [("gb", 1024 * MB), ("mb", MB), ("kb", 1024), ("g", 1024 * MB), ("m", MB), ("k", 1024)]
        .iter()
        .find_map(|(suffix, unit)| lower.strip_suffix(*suffix).map(|d| (d, *unit)))
        .unwrap_or((lower.as_str(), MB));

    let count: u64 = digits
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a positive whole number", digits.trim()))?;
    if count == 0 {
        return Err("must be greater than zero".into());
    }
    count
        .checked_mul(unit)
        .ok_or_else(|| "size is too large".to_string())
}

fn parse_limit(raw: &str) -> Result<i8, String> {
    raw.parse::<i8>()
        .map_err(|_| format!("must be a whole number between {} and {}", i8::MIN, i8::MAX))
}

fn non_empty(raw: &str) -> Result<Option<String>, String> {
    required_text(raw).map(Some)
}

fn required_text(raw: &str) -> Result<String, String> {
    if raw.is_empty() {
        Err("must not be empty".into())
    } else {
        Ok(raw.to_string())
    }
}
