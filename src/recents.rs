/*---------------------------------------------------------------------------------------------
 *  Copyright (c) RIDE Contributors. All rights reserved.
 *  Licensed under the MIT License. See License.txt in the project root for license information.
 *--------------------------------------------------------------------------------------------*/

//! The recency list: oldest value first, newest last, no duplicates, capped
//! at `recentsListLength`. Persisted as a JSON array of percent-encoded
//! strings.

use crate::config::LufoOptions;
use crate::error::{Error, Result};
use crate::store::{RecencyStore, decode_component, encode_component};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecencyList {
    values: Vec<String>,
}

impl RecencyList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn contains(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }

    /// Most recent value, if any.
    pub fn newest(&self) -> Option<&str> {
        self.values.last().map(String::as_str)
    }

    /// Records a selection. Returns `false` and leaves the list alone when the
    /// value is blank or ignored.
    pub fn record(&mut self, value: Option<&str>, options: &LufoOptions) -> bool {
        let Some(value) = value.filter(|v| !v.trim().is_empty()) else {
            return false;
        };
        if options.is_ignored(value) {
            return false;
        }

        self.values.retain(|v| v != value);
        let keep = options.recents_list_length.saturating_sub(1);
        if self.values.len() > keep {
            self.values.drain(..self.values.len() - keep);
        }
        if options.recents_list_length > 0 {
            self.values.push(value.to_string());
        }
        true
    }

    pub fn to_record(&self) -> String {
        let encoded: Vec<String> = self.values.iter().map(|v| encode_component(v)).collect();
        serde_json::to_string(&encoded).unwrap_or_else(|_| "[]".to_string())
    }

    pub fn from_record(record: &str) -> Result<Self> {
        let encoded: Vec<String> = serde_json::from_str(record).map_err(Error::Record)?;
        Ok(Self {
            values: encoded.iter().map(|v| decode_component(v)).collect(),
        })
    }

    /// Reads the list stored under `listStoreName`. `None` when nothing is
    /// stored or the record cannot be parsed.
    pub fn load(store: &RecencyStore, options: &LufoOptions) -> Option<Self> {
        let record = store.get(&options.list_store_name)?;
        match Self::from_record(&record) {
            Ok(list) => Some(list),
            Err(e) => {
                log::warn!("discarding recents under {:?}: {}", options.list_store_name, e);
                None
            }
        }
    }

    /// Replaces the stored record with this list.
    pub fn save(&self, store: &RecencyStore, options: &LufoOptions) {
        store.remove(&options.list_store_name);
        store.set(&options.list_store_name, &self.to_record(), Some(options.cookie_age));
    }
}

impl FromIterator<String> for RecencyList {
    /// Builds a list from values oldest first, keeping the last occurrence of
    /// any repeated value.
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut values: Vec<String> = Vec::new();
        for v in iter {
            values.retain(|existing| existing != &v);
            values.push(v);
        }
        Self { values }
    }
}

/// Load, record and save in one step, the reaction to a change notification.
/// Returns the list as it stands afterwards.
pub fn record_selection(store: &RecencyStore, value: Option<&str>, options: &LufoOptions) -> RecencyList {
    let mut list = RecencyList::load(store, options).unwrap_or_default();
    if list.record(value, options) {
        log::debug!("recorded {:?} under {:?} ({} kept)", value, options.list_store_name, list.len());
        list.save(store, options);
    }
    list
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LufoOverrides;
    use crate::store::{CookieJar, MemoryStore};
    use std::sync::Arc;

    fn options(len: usize) -> LufoOptions {
        LufoOptions::with_overrides(&LufoOverrides {
            recents_list_length: Some(len),
            ..Default::default()
        })
    }

    fn list(values: &[&str]) -> RecencyList {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn store() -> RecencyStore {
        RecencyStore::new(Some(Arc::new(MemoryStore::new())), Arc::new(CookieJar::new()))
    }

    #[test]
    fn test_record_caps_length() {
        let opts = options(3);
        let mut l = RecencyList::new();
        for v in ["A", "B", "C", "D"] {
            assert!(l.record(Some(v), &opts));
        }
        assert_eq!(l.values(), ["B", "C", "D"]);
    }

    #[test]
    fn test_record_promotes_existing() {
        let mut l = list(&["A", "B"]);
        l.record(Some("A"), &options(5));
        assert_eq!(l.values(), ["B", "A"]);
        assert_eq!(l.newest(), Some("A"));
    }

    #[test]
    fn test_promotion_at_cap_keeps_length() {
        let mut l = list(&["A", "B", "C"]);
        l.record(Some("A"), &options(3));
        assert_eq!(l.values(), ["B", "C", "A"]);
    }

    #[test]
    fn test_blank_and_ignored_are_skipped() {
        let opts = LufoOptions::with_overrides(&LufoOverrides {
            ignored_values: Some(vec!["none".into()]),
            ..Default::default()
        });
        let mut l = list(&["A"]);
        assert!(!l.record(None, &opts));
        assert!(!l.record(Some(""), &opts));
        assert!(!l.record(Some("   "), &opts));
        assert!(!l.record(Some("none"), &opts));
        assert_eq!(l.values(), ["A"]);
    }

    #[test]
    fn test_shrunk_cap_trims_oldest() {
        let mut l = list(&["A", "B", "C", "D", "E"]);
        l.record(Some("F"), &options(2));
        assert_eq!(l.values(), ["E", "F"]);
    }

    #[test]
    fn test_zero_cap_keeps_nothing() {
        let mut l = list(&["A"]);
        assert!(l.record(Some("B"), &options(0)));
        assert!(l.is_empty());
    }

    #[test]
    fn test_invariants_over_long_sequence() {
        let opts = options(4);
        let mut l = RecencyList::new();
        let picks = ["a", "b", "a", "c", "d", "e", "b", "b", "f", "a", "g", "c"];
        for p in picks {
            l.record(Some(p), &opts);
            assert!(l.len() <= 4);
            let mut sorted = l.values().to_vec();
            sorted.sort();
            sorted.dedup();
            assert_eq!(sorted.len(), l.len());
            assert_eq!(l.newest(), Some(p));
        }
    }

    #[test]
    fn test_record_format() {
        let l = list(&["Red wine", "50%", "a;b"]);
        let record = l.to_record();
        assert_eq!(record, r#"["Red%20wine","50%25","a%3Bb"]"#);
        assert_eq!(RecencyList::from_record(&record).unwrap(), l);
    }

    #[test]
    fn test_malformed_record() {
        assert!(matches!(RecencyList::from_record("{oops"), Err(Error::Record(_))));
        assert!(RecencyList::from_record("[1, 2]").is_err());
    }

    #[test]
    fn test_record_selection_persists() {
        let store = store();
        let opts = options(3);
        for v in ["A", "B", "C", "D"] {
            record_selection(&store, Some(v), &opts);
        }
        let loaded = RecencyList::load(&store, &opts).unwrap();
        assert_eq!(loaded.values(), ["B", "C", "D"]);
    }

    #[test]
    fn test_record_selection_recovers_from_garbage() {
        let store = store();
        let opts = options(5);
        store.set(&opts.list_store_name, "not json", None);
        assert!(RecencyList::load(&store, &opts).is_none());
        let l = record_selection(&store, Some("A"), &opts);
        assert_eq!(l.values(), ["A"]);
    }

    #[test]
    fn test_record_selection_with_huge_cookie_age() {
        let store = RecencyStore::cookies_only(Arc::new(CookieJar::new()));
        let opts = LufoOptions::with_overrides(&LufoOverrides::from_json(r#"{"cookieAge": 100000000}"#).unwrap());
        assert_eq!(record_selection(&store, Some("A"), &opts).values(), ["A"]);
        assert_eq!(RecencyList::load(&store, &opts).unwrap().values(), ["A"]);
    }

    #[test]
    fn test_ignored_selection_writes_nothing() {
        let store = store();
        let opts = options(5);
        record_selection(&store, Some(""), &opts);
        assert_eq!(store.get(&opts.list_store_name), None);
    }
}
