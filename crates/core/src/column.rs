//! Header-row classification.
//!
//! Each non-blank header cell becomes exactly one [`ColumnHeader`]. Group
//! columns are written `<prefix><group part><suffix><tag name>`, where the
//! group part is either `name` or `id<delimiter>name`.

use std::collections::BTreeMap;

/// Semantic role of one input column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKind {
    Skip,
    FileName,
    MimeType,
    DocName,
    Id,
    Tag,
    GroupTag,
}

impl ColumnKind {
    /// Exact, case-sensitive keyword match.
    fn from_keyword(value: &str) -> Option<Self> {
        match value {
            "Skip" => Some(Self::Skip),
            "FileName" => Some(Self::FileName),
            "MimeType" => Some(Self::MimeType),
            "DocName" => Some(Self::DocName),
            "RefID" => Some(Self::Id),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnHeader {
    pub index: usize,
    /// Trimmed header cell text.
    pub raw_name: String,
    pub kind: ColumnKind,
    pub group_id: Option<String>,
    pub group_name: Option<String>,
    pub tag_name: String,
}

/// Delimiters for group columns, e.g. `[id:Name]Tag` or `Name.Tag`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderSyntax {
    pub group_prefix: String,
    pub group_suffix: String,
    pub group_id_delimiter: String,
}

impl Default for HeaderSyntax {
    fn default() -> Self {
        Self {
            group_prefix: "[".into(),
            group_suffix: "]".into(),
            group_id_delimiter: ":".into(),
        }
    }
}

impl HeaderSyntax {
    /// Classify one header cell. Returns `None` for blank cells.
    pub fn classify(&self, index: usize, cell: &str) -> Option<ColumnHeader> {
        let value = cell.trim();
        if value.is_empty() {
            return None;
        }

        let mut header = ColumnHeader {
            index,
            raw_name: value.to_string(),
            kind: ColumnKind::Tag,
            group_id: None,
            group_name: None,
            tag_name: value.to_string(),
        };

        if let Some(kind) = ColumnKind::from_keyword(value) {
            header.kind = kind;
        } else if let Some((group_id, group_name, tag_name)) = self.split_group(value) {
            header.kind = ColumnKind::GroupTag;
            header.group_id = group_id;
            header.group_name = Some(group_name);
            header.tag_name = tag_name;
        }
        Some(header)
    }

    /// `(group id, group name, tag name)` when `value` is a well-formed group column.
    fn split_group(&self, value: &str) -> Option<(Option<String>, String, String)> {
        let rest = value.strip_prefix(self.group_prefix.as_str())?;
        let end = rest.find(self.group_suffix.as_str())?;
        let group = rest[..end].trim();
        let tag = rest[end + self.group_suffix.len()..].trim();
        if group.is_empty() || tag.is_empty() {
            return None;
        }

        let delim = self.group_id_delimiter.as_str();
        let split = if delim.is_empty() { None } else { group.find(delim) };
        match split {
            // Delimiter strictly inside the group part
            Some(at) if at > 0 && at + delim.len() < group.len() => Some((
                Some(group[..at].trim().to_string()),
                group[at + delim.len()..].trim().to_string(),
                tag.to_string(),
            )),
            _ => Some((None, group.to_string(), tag.to_string())),
        }
    }
}

/// Recognized columns of one sheet, keyed by column index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnSchema {
    pub columns: BTreeMap<usize, ColumnHeader>,
    /// Highest index holding a recognized header.
    pub max_col: Option<usize>,
}

impl ColumnSchema {
    /// Classify a header row. More than `empty_col_limit` consecutive blank
    /// cells end the scan; the rest of the row is treated as absent.
    pub fn resolve<S: AsRef<str>>(row: &[S], syntax: &HeaderSyntax, empty_col_limit: i8) -> Self {
        let mut schema = Self::default();
        let mut empty_run: i32 = 0;

        for (index, cell) in row.iter().enumerate() {
            match syntax.classify(index, cell.as_ref()) {
                Some(header) => {
                    schema.columns.insert(index, header);
                    schema.max_col = Some(index);
                    empty_run = 0;
                }
                None => {
                    empty_run += 1;
                    if empty_run > i32::from(empty_col_limit) {
                        break;
                    }
                }
            }
        }
        schema
    }

    pub fn get(&self, index: usize) -> Option<&ColumnHeader> {
        self.columns.get(&index)
    }

    /// Recognized headers in column order.
    pub fn headers(&self) -> Vec<ColumnHeader> {
        self.columns.values().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Spreadsheet column letters for a 0-based index (0 = A, 25 = Z, 26 = AA).
///
/// Bijective base-26: there is no zero digit, so 26 is `AA`, not `A0`.
pub fn col_to_letter(col: usize) -> String {
    let mut result = String::new();
    let mut n = col;
    loop {
        result.insert(0, (b'A' + (n % 26) as u8) as char);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    result
}

/// A1-style address for 0-based row and column.
pub fn cell_address(row: usize, col: usize) -> String {
    format!("{}{}", col_to_letter(col), row + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dotted() -> HeaderSyntax {
        HeaderSyntax {
            group_prefix: String::new(),
            group_suffix: ".".into(),
            group_id_delimiter: ":".into(),
        }
    }

    #[test]
    fn keywords_are_exact() {
        let syntax = HeaderSyntax::default();
        let kinds: Vec<ColumnKind> = ["Skip", "FileName", "MimeType", "DocName", "RefID", "filename", "Id"]
            .iter()
            .enumerate()
            .map(|(i, c)| syntax.classify(i, c).unwrap().kind)
            .collect();
        assert_eq!(
            kinds,
            [
                ColumnKind::Skip,
                ColumnKind::FileName,
                ColumnKind::MimeType,
                ColumnKind::DocName,
                ColumnKind::Id,
                ColumnKind::Tag,
                ColumnKind::Tag,
            ]
        );
    }

    #[test]
    fn blank_cells_are_not_columns() {
        let syntax = HeaderSyntax::default();
        assert_eq!(syntax.classify(0, ""), None);
        assert_eq!(syntax.classify(0, "   "), None);
    }

    #[test]
    fn bracket_group_with_and_without_id() {
        let syntax = HeaderSyntax::default();

        let h = syntax.classify(3, " [IssueInfo] IssueDate ").unwrap();
        assert_eq!(h.kind, ColumnKind::GroupTag);
        assert_eq!(h.raw_name, "[IssueInfo] IssueDate");
        assert_eq!(h.group_id, None);
        assert_eq!(h.group_name.as_deref(), Some("IssueInfo"));
        assert_eq!(h.tag_name, "IssueDate");

        let h = syntax.classify(4, "[a1 : Address]City").unwrap();
        assert_eq!(h.group_id.as_deref(), Some("a1"));
        assert_eq!(h.group_name.as_deref(), Some("Address"));
        assert_eq!(h.tag_name, "City");
    }

    #[test]
    fn delimiter_at_edge_is_part_of_name() {
        let syntax = HeaderSyntax::default();
        let h = syntax.classify(0, "[:Address]City").unwrap();
        assert_eq!(h.group_id, None);
        assert_eq!(h.group_name.as_deref(), Some(":Address"));

        let h = syntax.classify(0, "[Address:]City").unwrap();
        assert_eq!(h.group_id, None);
        assert_eq!(h.group_name.as_deref(), Some("Address:"));
    }

    #[test]
    fn incomplete_group_falls_back_to_tag() {
        let syntax = HeaderSyntax::default();
        for raw in ["[]City", "[Address]", "[Address City", "[  ] City"] {
            let h = syntax.classify(0, raw).unwrap();
            assert_eq!(h.kind, ColumnKind::Tag, "{raw}");
            assert_eq!(h.tag_name, raw.trim());
            assert_eq!(h.group_name, None);
        }
    }

    #[test]
    fn dotted_syntax_with_empty_prefix() {
        let syntax = dotted();
        let h = syntax.classify(0, "IssueInfo.IssueDate").unwrap();
        assert_eq!(h.kind, ColumnKind::GroupTag);
        assert_eq!(h.group_name.as_deref(), Some("IssueInfo"));
        assert_eq!(h.tag_name, "IssueDate");

        let h = syntax.classify(1, "7:Contact.Email").unwrap();
        assert_eq!(h.group_id.as_deref(), Some("7"));
        assert_eq!(h.group_name.as_deref(), Some("Contact"));

        assert_eq!(syntax.classify(2, "FirstName").unwrap().kind, ColumnKind::Tag);
    }

    #[test]
    fn resolve_tracks_max_col_and_stops_on_blank_run() {
        let syntax = HeaderSyntax::default();
        let row = ["RefID", "", "FileName", "", "", "", "Late"];

        let schema = ColumnSchema::resolve(&row, &syntax, 10);
        assert_eq!(schema.columns.len(), 3);
        assert_eq!(schema.max_col, Some(6));

        // Three blanks exceed a limit of 2
        let schema = ColumnSchema::resolve(&row, &syntax, 2);
        assert_eq!(schema.columns.len(), 2);
        assert_eq!(schema.max_col, Some(2));
        assert!(schema.get(6).is_none());
    }

    #[test]
    fn resolve_is_deterministic() {
        let syntax = HeaderSyntax::default();
        let row = ["Skip", "FileName", "[1:G]T", "Free", "[G]T"];
        let a = ColumnSchema::resolve(&row, &syntax, 10);
        let b = ColumnSchema::resolve(&row, &syntax, 10);
        assert_eq!(a, b);
        assert_eq!(a.headers().len(), row.len());
    }

    #[test]
    fn empty_header_row() {
        let schema = ColumnSchema::resolve::<&str>(&[], &HeaderSyntax::default(), 10);
        assert!(schema.is_empty());
        assert_eq!(schema.max_col, None);
    }

    #[test]
    fn col_letters_known_values() {
        assert_eq!(col_to_letter(0), "A");
        assert_eq!(col_to_letter(25), "Z");
        assert_eq!(col_to_letter(26), "AA");
        assert_eq!(col_to_letter(27), "AB");
        assert_eq!(col_to_letter(51), "AZ");
        assert_eq!(col_to_letter(52), "BA");
        assert_eq!(col_to_letter(701), "ZZ");
        assert_eq!(col_to_letter(702), "AAA");
        assert_eq!(cell_address(0, 0), "A1");
        assert_eq!(cell_address(9, 28), "AC10");
    }

    #[test]
    fn col_letters_are_injective() {
        let letters: std::collections::HashSet<String> = (0..20_000).map(col_to_letter).collect();
        assert_eq!(letters.len(), 20_000);
    }

    proptest::proptest! {
        #[test]
        fn col_letters_invert(col in 0usize..1_000_000) {
            let letters = col_to_letter(col);
            let back = letters
                .bytes()
                .fold(0usize, |acc, b| acc * 26 + usize::from(b - b'A') + 1)
                - 1;
            proptest::prop_assert_eq!(back, col);
            proptest::prop_assert!(letters.bytes().all(|b| b.is_ascii_uppercase()));
        }
    }
}
