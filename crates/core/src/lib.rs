//! `zippkg-core`: data model and sheet parsing for document packages.
//!
//! Pure crate: works on rows of string cells and in-memory XML text.
//! Reading workbooks and writing archives lives in `zippkg-io`.

pub mod column;
pub mod metadata;
pub mod parse;
pub mod report;
pub mod request;
pub mod xml;

pub use column::{cell_address, col_to_letter, ColumnHeader, ColumnKind, ColumnSchema, HeaderSyntax};
pub use metadata::{Metadata, Tag, TagGroup};
pub use parse::{parse_requests, ParseOptions, ParsedSheet};
pub use report::{DocumentStatus, Report, ReportDocument};
pub use request::{Pkg, PkgHeader, PkgTrailer, Request, MAX_PKG_REQUESTS};
pub use xml::XmlError;
