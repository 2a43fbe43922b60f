//! Tag-based access decisions.
//!
//! A caller holds permissions shaped `<namespace>.<action>` (for example
//! `forms.read`). A resource tagged `perm:read` is visible to any caller
//! holding a permission that ends in `.read`. Several `perm:` tags are
//! alternatives: one match is enough.
//!
//! Untagged resources follow two different defaults:
//!
//! - a single resource without `perm:` tags is public;
//! - inside a list, an element without any tags is dropped.

use std::collections::BTreeSet;

use serde_json::Value;

use crate::tags::{ResourceTags, TagSet};

/// The authenticated caller, as supplied by the surrounding auth layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub email: String,
    pub permissions: BTreeSet<String>,
}

impl Principal {
    pub fn new<I, S>(email: impl Into<String>, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            email: email.into(),
            permissions: permissions.into_iter().map(Into::into).collect(),
        }
    }

    /// `true` if the caller holds at least one of `required` verbatim.
    pub fn has_any(&self, required: &[&str]) -> bool {
        required.iter().any(|p| self.permissions.contains(*p))
    }

    /// `true` if some permission ends in `.<action>`.
    pub fn grants_action(&self, action: &str) -> bool {
        self.permissions
            .iter()
            .any(|p| p.strip_suffix(action).is_some_and(|rest| rest.ends_with('.')))
    }
}

/// Whether `principal` may see a resource carrying `tags`.
pub fn is_authorized(principal: &Principal, tags: &TagSet) -> bool {
    tags.is_public()
        || tags
            .required_actions
            .iter()
            .any(|action| principal.grants_action(action))
}

/// Keep the list elements the caller may see. Elements without tags are
/// excluded.
pub fn filter_list(principal: &Principal, items: Vec<Value>) -> Vec<Value> {
    items
        .into_iter()
        .filter(|item| {
            let tags = ResourceTags::of(item);
            match &tags {
                ResourceTags::Present { set, .. } if tags.is_tagged() => {
                    is_authorized(principal, set)
                }
                _ => false,
            }
        })
        .collect()
}

/// Outcome of checking a single resource against its own payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SingleDecision {
    Allow,
    Deny,
    /// The payload has no `tags` member; the tags must be fetched separately.
    LookupTags,
}

pub fn check_single(principal: &Principal, resource: &Value) -> SingleDecision {
    match ResourceTags::of(resource) {
        ResourceTags::Absent => SingleDecision::LookupTags,
        ResourceTags::Present { set, .. } if is_authorized(principal, &set) => {
            SingleDecision::Allow
        }
        ResourceTags::Present { .. } => SingleDecision::Deny,
    }
}
