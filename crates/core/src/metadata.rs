use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

/// A leaf name/value pair. Names are not unique; lookups return the first match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Value", default)]
    pub value: String,
}

impl Tag {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A named, optionally identified, ordered run of tags.
///
/// The id is a sheet-side routing key only; it is never written to XML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagGroup {
    #[serde(skip)]
    pub group_id: Option<String>,
    #[serde(rename = "GroupName")]
    pub group_name: String,
    #[serde(rename = "Tag", default)]
    pub tags: Vec<Tag>,
}

impl TagGroup {
    fn matches(&self, group_id: Option<&str>, group_name: &str) -> bool {
        match group_id {
            Some(id) => self.group_id.as_deref() == Some(id),
            None => self.group_id.is_none() && self.group_name == group_name,
        }
    }

    pub fn tag_value(&self, name: &str) -> Option<&str> {
        first_value(&self.tags, name)
    }
}

// ---------------------------------------------------------------------------
// Metadata
// ---------------------------------------------------------------------------

/// Flat tags plus tag groups, owned by exactly one request or report document.
///
/// `Clone` is a deep copy: no tag container is ever shared between owners.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(rename = "Tag", default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
    #[serde(rename = "TagGroup", default, skip_serializing_if = "Vec::is_empty")]
    pub tag_groups: Vec<TagGroup>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty() && self.tag_groups.is_empty()
    }

    /// Route a value to a flat tag (no group name) or to a group tag.
    pub fn add_tag_or_group_tag(
        &mut self,
        group_id: Option<&str>,
        group_name: Option<&str>,
        tag_name: &str,
        tag_value: &str,
    ) {
        match group_name.filter(|n| !n.is_empty()) {
            None => self.add_tag(tag_name, tag_value),
            Some(name) => self.add_group_tag(group_id, name, tag_name, tag_value),
        }
    }

    pub fn add_tag(&mut self, tag_name: &str, tag_value: &str) {
        self.tags.push(Tag::new(tag_name, tag_value));
    }

    /// Append to the group located by id (when present) or by name, creating
    /// the group at the end if absent. Existing tags are never merged by name.
    pub fn add_group_tag(
        &mut self,
        group_id: Option<&str>,
        group_name: &str,
        tag_name: &str,
        tag_value: &str,
    ) {
        let group = self.group_or_insert(group_id, group_name);
        group.tags.push(Tag::new(tag_name, tag_value));
    }

    fn group_or_insert(&mut self, group_id: Option<&str>, group_name: &str) -> &mut TagGroup {
        let group_id = group_id.filter(|id| !id.is_empty());
        let pos = match self
            .tag_groups
            .iter()
            .position(|g| g.matches(group_id, group_name))
        {
            Some(pos) => pos,
            None => {
                self.tag_groups.push(TagGroup {
                    group_id: group_id.map(str::to_string),
                    group_name: group_name.to_string(),
                    tags: Vec::new(),
                });
                self.tag_groups.len() - 1
            }
        };
        &mut self.tag_groups[pos]
    }

    /// Locate a group without creating it.
    pub fn find_group(&self, group_id: Option<&str>, group_name: &str) -> Option<&TagGroup> {
        let group_id = group_id.filter(|id| !id.is_empty());
        self.tag_groups
            .iter()
            .find(|g| g.matches(group_id, group_name))
    }

    pub fn tag_value(&self, name: &str) -> Option<&str> {
        first_value(&self.tags, name)
    }

    pub fn group_tag_value(
        &self,
        group_id: Option<&str>,
        group_name: &str,
        tag_name: &str,
    ) -> Option<&str> {
        self.find_group(group_id, group_name)?.tag_value(tag_name)
    }
}

fn first_value<'a>(tags: &'a [Tag], name: &str) -> Option<&'a str> {
    tags.iter()
        .find(|t| t.name == name)
        .map(|t| t.value.as_str())
}
