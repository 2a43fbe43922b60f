//! Typed view of resource tags.
//!
//! Upstream resources carry free-form string tags. Two prefixes matter here:
//!
//! | Tag | Meaning |
//! |-----|---------|
//! | `perm:<action>` | caller needs a permission ending in `.<action>` |
//! | `cat:<name>` | resource belongs to category `<name>` |
//!
//! Everything else is ignored.

use serde_json::Value;

pub const PERMISSION_PREFIX: &str = "perm:";
pub const CATEGORY_PREFIX: &str = "cat:";
pub const TAGS_FIELD: &str = "tags";

/// Tags of one resource, split by meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet {
    pub required_actions: Vec<String>,
    pub categories: Vec<String>,
}

impl TagSet {
    pub fn parse<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::default();
        for tag in tags {
            let tag = tag.as_ref();
            if let Some(action) = tag.strip_prefix(PERMISSION_PREFIX) {
                set.required_actions.push(action.to_string());
            } else if let Some(category) = tag.strip_prefix(CATEGORY_PREFIX) {
                set.categories.push(category.to_string());
            }
        }
        set
    }

    /// `true` when no `perm:` tag is present, i.e. the resource is public.
    pub fn is_public(&self) -> bool {
        self.required_actions.is_empty()
    }

    /// Case-insensitive category membership.
    pub fn has_category(&self, wanted: &str) -> bool {
        self.categories
            .iter()
            .any(|c| c.to_lowercase() == wanted.to_lowercase())
    }
}

/// What a JSON resource says about its tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceTags {
    /// No `tags` member at all (or `null`): the payload does not tell.
    Absent,
    /// A `tags` member exists. `raw_count` is the number of entries, so an
    /// empty list can be told apart from a list of unrelated tags.
    Present { set: TagSet, raw_count: usize },
}

impl ResourceTags {
    pub fn of(resource: &Value) -> Self {
        match resource.get(TAGS_FIELD) {
            None | Some(Value::Null) => Self::Absent,
            Some(Value::Array(items)) => Self::Present {
                set: TagSet::parse(items.iter().filter_map(Value::as_str)),
                raw_count: items.len(),
            },
            // A scalar `tags` member carries no access requirement.
            Some(_) => Self::Present {
                set: TagSet::default(),
                raw_count: 0,
            },
        }
    }

    /// `true` when the resource has at least one tag of any kind.
    pub fn is_tagged(&self) -> bool {
        matches!(self, Self::Present { raw_count, .. } if *raw_count > 0)
    }
}
