use std::cmp::Ordering;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::record::{Target, ValidationError};

/// A browser workspace plus the 1-based index of the pinned tab to select.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContextSelectorTarget {
    pub context_name: String,
    pub selector: u32,
    pub keywords: Vec<String>,
}

impl ContextSelectorTarget {
    pub fn new(context_name: impl Into<String>, selector: u32) -> Self {
        Self {
            context_name: context_name.into(),
            selector,
            keywords: Vec::new(),
        }
    }

    pub fn with_keywords(mut self, keywords: Vec<String>) -> Self {
        self.keywords = keywords;
        self
    }

    /// Builds a target from raw form input. `keywords` is comma-separated.
    pub fn from_input(
        context_name: &str,
        selector: &str,
        keywords: &str,
    ) -> Result<Self, ValidationError> {
        let context_name = context_name.trim();
        if context_name.is_empty() {
            return Err(ValidationError::MissingField("workspace name"));
        }
        let selector_text = selector.trim();
        if selector_text.is_empty() {
            return Err(ValidationError::MissingField("tab index"));
        }
        let selector = parse_selector(selector_text)?;
        Ok(Self {
            context_name: context_name.to_string(),
            selector,
            keywords: split_keywords(keywords),
        })
    }
}

/// Parses a tab index, rejecting zero, negatives and non-numbers.
pub fn parse_selector(raw: &str) -> Result<u32, ValidationError> {
    match raw.trim().parse::<i64>() {
        Ok(n) if n >= 1 && n <= u32::MAX as i64 => Ok(n as u32),
        _ => Err(ValidationError::InvalidIndex(raw.trim().to_string())),
    }
}

pub fn split_keywords(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabEntry {
    pub alias: String,
    pub workspace_name: String,
    pub tab: TabSpec,
    #[serde(default, deserialize_with = "lenient_keywords")]
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TabSpec {
    pub selector: SelectorSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorSpec {
    pub index: i64,
}

// Anything other than an array of strings is read as "no keywords".
fn lenient_keywords<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|v| v.as_str().map(|s| s.to_string()))
            .collect(),
        _ => Vec::new(),
    })
}

impl Target for ContextSelectorTarget {
    const STORAGE_KEY: &'static str = "arc_shortcuts";
    const CATALOG: &'static str = "tabs";
    const REQUIRE_STORED_ID: bool = false;

    type Entry = TabEntry;

    fn to_entry(alias: &str, target: &Self) -> TabEntry {
        TabEntry {
            alias: alias.to_string(),
            workspace_name: target.context_name.clone(),
            tab: TabSpec {
                selector: SelectorSpec {
                    index: i64::from(target.selector),
                },
            },
            keywords: target.keywords.clone(),
        }
    }

    fn from_entry(entry: TabEntry) -> Option<(String, Self)> {
        let alias = entry.alias.trim();
        let context_name = entry.workspace_name.trim();
        if alias.is_empty() || context_name.is_empty() {
            return None;
        }
        let index = entry.tab.selector.index;
        if index < 1 || index > u32::MAX as i64 {
            return None;
        }
        let mut target = ContextSelectorTarget {
            context_name: context_name.to_string(),
            selector: index as u32,
            keywords: entry.keywords,
        };
        target.normalize();
        Some((alias.to_string(), target))
    }

    fn normalize(&mut self) {
        self.context_name = self.context_name.trim().to_string();
        self.keywords = self
            .keywords
            .iter()
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .collect();
    }

    fn search_terms(&self) -> Vec<String> {
        let mut terms = Vec::with_capacity(self.keywords.len() + 2);
        terms.push(self.context_name.to_lowercase());
        terms.push(self.selector.to_string());
        terms.extend(self.keywords.iter().map(|k| k.to_lowercase()));
        terms
    }

    fn listing_order(&self, other: &Self) -> Ordering {
        self.context_name
            .to_lowercase()
            .cmp(&other.context_name.to_lowercase())
            .then_with(|| self.context_name.cmp(&other.context_name))
            .then(self.selector.cmp(&other.selector))
    }

    fn describe(&self) -> String {
        format!("{} → Tab #{}", self.context_name, self.selector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_input_validates_required_fields_and_index() {
        let target = ContextSelectorTarget::from_input(" Work ", "2", "mail, inbox , ,")
            .expect("valid input");
        assert_eq!(target.context_name, "Work");
        assert_eq!(target.selector, 2);
        assert_eq!(target.keywords, vec!["mail", "inbox"]);

        assert_eq!(
            ContextSelectorTarget::from_input("", "1", ""),
            Err(ValidationError::MissingField("workspace name"))
        );
        assert_eq!(
            ContextSelectorTarget::from_input("Work", " ", ""),
            Err(ValidationError::MissingField("tab index"))
        );
        assert_eq!(
            ContextSelectorTarget::from_input("Work", "0", ""),
            Err(ValidationError::InvalidIndex("0".into()))
        );
        assert_eq!(
            ContextSelectorTarget::from_input("Work", "-3", ""),
            Err(ValidationError::InvalidIndex("-3".into()))
        );
        assert_eq!(
            ContextSelectorTarget::from_input("Work", "two", ""),
            Err(ValidationError::InvalidIndex("two".into()))
        );
    }

    #[test]
    fn entry_wire_format_matches_persisted_shape() {
        let target = ContextSelectorTarget::new("Work", 3).with_keywords(vec!["mail".into()]);
        let entry = ContextSelectorTarget::to_entry("Gmail", &target);
        let value = serde_json::to_value(entry).expect("serialize entry");
        assert_eq!(
            value,
            json!({
                "alias": "Gmail",
                "workspaceName": "Work",
                "tab": {"selector": {"index": 3}},
                "keywords": ["mail"]
            })
        );
    }

    #[test]
    fn from_entry_rejects_non_positive_index() {
        let entry: TabEntry = serde_json::from_value(json!({
            "alias": "Gmail",
            "workspaceName": "Work",
            "tab": {"selector": {"index": 0}}
        }))
        .expect("entry parses");
        assert!(ContextSelectorTarget::from_entry(entry).is_none());
    }

    #[test]
    fn keywords_tolerate_missing_or_malformed_values() {
        let entry: TabEntry = serde_json::from_value(json!({
            "alias": "Gmail",
            "workspaceName": "Work",
            "tab": {"selector": {"index": 1}},
            "keywords": "mail"
        }))
        .expect("entry parses");
        assert!(entry.keywords.is_empty());

        let entry: TabEntry = serde_json::from_value(json!({
            "alias": "Gmail",
            "workspaceName": "Work",
            "tab": {"selector": {"index": 1}}
        }))
        .expect("entry parses");
        assert!(entry.keywords.is_empty());
    }

    #[test]
    fn search_terms_and_listing_order() {
        let a = ContextSelectorTarget::new("Work", 2).with_keywords(vec!["Inbox".into()]);
        let b = ContextSelectorTarget::new("Work", 1);
        let c = ContextSelectorTarget::new("Home", 9);
        assert_eq!(a.search_terms(), vec!["work", "2", "inbox"]);
        assert_eq!(a.listing_order(&b), Ordering::Greater);
        assert_eq!(c.listing_order(&b), Ordering::Less);
        assert_eq!(a.describe(), "Work → Tab #2");
    }

    #[test]
    fn listing_order_ignores_case() {
        let work = ContextSelectorTarget::new("Work", 1);
        let home = ContextSelectorTarget::new("home", 1);
        assert_eq!(home.listing_order(&work), Ordering::Less);
        assert_eq!(work.listing_order(&home), Ordering::Greater);
    }
}
