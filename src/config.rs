/*---------------------------------------------------------------------------------------------
 *  Copyright (c) RIDE Contributors. All rights reserved.
 *  Licensed under the MIT License. See License.txt in the project root for license information.
 *--------------------------------------------------------------------------------------------*/

//! Options for a bound control. Defaults are overlaid with caller overrides,
//! field by field, each time a control is attached or re-configured.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const DEFAULT_STORE_NAME: &str = "recentOptionValues";
pub const DEFAULT_TITLE: &str = "Recently selected:";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LufoOptions {
    /// Keep a valueless first entry pinned at the top as a placeholder.
    pub check_initial_value: bool,
    /// Clear the selected flag on cloned recent entries.
    pub strip_selected: bool,
    pub recents_list_title_enabled: bool,
    pub recents_list_title: String,
    pub divider_enabled: bool,
    pub divider_text: String,
    /// Number of remembered values.
    pub recents_list_length: usize,
    /// Number of options the control needs before recents are shown.
    pub list_minimum_length: usize,
    /// Render recents as a labelled group instead of under a header entry.
    pub group_list: bool,
    pub ignored_values: Vec<String>,
    #[serde(alias = "cookieName")]
    pub list_store_name: String,
    /// Days before remembered values expire (cookie storage only).
    pub cookie_age: f64,
    /// Bind one more change handler on every re-configuration, like the
    /// jQuery plugin did.
    pub stack_change_handlers: bool,
}

impl Default for LufoOptions {
    fn default() -> Self {
        Self {
            check_initial_value: true,
            strip_selected: false,
            recents_list_title_enabled: true,
            recents_list_title: DEFAULT_TITLE.to_string(),
            divider_enabled: true,
            divider_text: "\u{2013}".repeat(24),
            recents_list_length: 5,
            list_minimum_length: 5,
            group_list: false,
            ignored_values: Vec::new(),
            list_store_name: DEFAULT_STORE_NAME.to_string(),
            cookie_age: 30.0,
            stack_change_handlers: false,
        }
    }
}

impl LufoOptions {
    pub fn with_overrides(overrides: &LufoOverrides) -> Self {
        let mut options = Self::default();
        options.merge(overrides);
        options
    }

    pub fn merge(&mut self, o: &LufoOverrides) {
        if let Some(v) = o.check_initial_value {
            self.check_initial_value = v;
        }
        if let Some(v) = o.strip_selected {
            self.strip_selected = v;
        }
        if let Some(v) = o.recents_list_title_enabled {
            self.recents_list_title_enabled = v;
        }
        if let Some(v) = &o.recents_list_title {
            self.recents_list_title = v.clone();
        }
        if let Some(v) = o.divider_enabled {
            self.divider_enabled = v;
        }
        if let Some(v) = &o.divider_text {
            self.divider_text = v.clone();
        }
        if let Some(v) = o.recents_list_length {
            self.recents_list_length = v;
        }
        if let Some(v) = o.list_minimum_length {
            self.list_minimum_length = v;
        }
        if let Some(v) = o.group_list {
            self.group_list = v;
        }
        if let Some(v) = &o.ignored_values {
            self.ignored_values = v.clone();
        }
        if let Some(v) = &o.list_store_name {
            self.list_store_name = v.clone();
        }
        if let Some(v) = o.cookie_age {
            self.cookie_age = v;
        }
        if let Some(v) = o.stack_change_handlers {
            self.stack_change_handlers = v;
        }
    }

    pub fn is_ignored(&self, value: &str) -> bool {
        self.ignored_values.iter().any(|v| v == value)
    }
}

/// Partial options as supplied by the caller; unset fields keep their
/// current value on merge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LufoOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_initial_value: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strip_selected: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recents_list_title_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recents_list_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub divider_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub divider_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recents_list_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_minimum_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_list: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignored_values: Option<Vec<String>>,
    #[serde(alias = "cookieName", skip_serializing_if = "Option::is_none")]
    pub list_store_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cookie_age: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack_change_handlers: Option<bool>,
}

impl LufoOverrides {
    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(Error::Config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let o = LufoOptions::default();
        assert!(o.check_initial_value);
        assert!(!o.strip_selected);
        assert_eq!(o.recents_list_title, "Recently selected:");
        assert_eq!(o.divider_text.chars().count(), 24);
        assert_eq!(o.recents_list_length, 5);
        assert_eq!(o.list_minimum_length, 5);
        assert_eq!(o.list_store_name, "recentOptionValues");
        assert_eq!(o.cookie_age, 30.0);
    }

    #[test]
    fn test_merge_is_cumulative() {
        let mut o = LufoOptions::default();
        o.merge(&LufoOverrides { recents_list_length: Some(3), ..Default::default() });
        o.merge(&LufoOverrides { group_list: Some(true), ..Default::default() });
        assert_eq!(o.recents_list_length, 3);
        assert!(o.group_list);
        assert!(o.divider_enabled);
    }

    #[test]
    fn test_from_json_camel_case() {
        let ov = LufoOverrides::from_json(
            r#"{"recentsListLength": 3, "ignoredValues": ["One", "Two"], "cookieName": "colors"}"#,
        )
        .unwrap();
        let o = LufoOptions::with_overrides(&ov);
        assert_eq!(o.recents_list_length, 3);
        assert!(o.is_ignored("Two"));
        assert!(!o.is_ignored("Three"));
        assert_eq!(o.list_store_name, "colors");
    }

    #[test]
    fn test_from_json_rejects_unknown_keys() {
        let err = LufoOverrides::from_json(r#"{"recentListLength": 3}"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
