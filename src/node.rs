/*---------------------------------------------------------------------------------------------
 *  Copyright (c) RIDE Contributors. All rights reserved.
 *  Licensed under the MIT License. See License.txt in the project root for license information.
 *--------------------------------------------------------------------------------------------*/

//! N-API surface for JavaScript hosts. Options travel as JSON objects in the
//! jQuery plugin's camelCase shape; render plans come back as JSON.

use napi::bindgen_prelude::*;
use napi_derive::napi;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::{LufoOptions, LufoOverrides};
use crate::logger::{self, LoggerConfig};
use crate::recents::{RecencyList, record_selection};
use crate::render::{OptionEntry, render};
use crate::store::{CookieJar, FileStore, KeyValueStore, RecencyStore};

#[napi(object)]
pub struct JsOptionEntry {
    pub value: Option<String>,
    pub label: String,
    pub disabled: Option<bool>,
    pub selected: Option<bool>,
    pub group: Option<String>,
}

impl From<JsOptionEntry> for OptionEntry {
    fn from(js: JsOptionEntry) -> Self {
        OptionEntry {
            value: js.value,
            label: js.label,
            disabled: js.disabled.unwrap_or(false),
            selected: js.selected.unwrap_or(false),
            group: js.group,
        }
    }
}

fn parse_options(config: Option<String>) -> Result<LufoOptions> {
    match config {
        Some(json) => LufoOverrides::from_json(&json)
            .map(|o| LufoOptions::with_overrides(&o))
            .map_err(|e| Error::from_reason(e.to_string())),
        None => Ok(LufoOptions::default()),
    }
}

#[napi]
pub struct RecentsEngine {
    store: RecencyStore,
}

#[napi]
impl RecentsEngine {
    /// Uses a JSON file at `store_path`, or the default data location, with
    /// cookies as the fallback.
    #[napi(constructor)]
    pub fn new(store_path: Option<String>) -> Self {
        let local = store_path
            .map(PathBuf::from)
            .or_else(FileStore::default_path)
            .map(|p| Arc::new(FileStore::open(p)) as Arc<dyn KeyValueStore>);
        Self {
            store: RecencyStore::new(local, Arc::new(CookieJar::new())),
        }
    }

    /// Render plan as JSON, or `null` when the control should stay as is.
    #[napi]
    pub fn render(&self, options: Vec<JsOptionEntry>, config: Option<String>) -> Result<Option<String>> {
        let opts = parse_options(config)?;
        let entries: Vec<OptionEntry> = options.into_iter().map(Into::into).collect();
        if !crate::render::is_eligible(entries.len(), &opts) {
            return Ok(None);
        }
        let list = RecencyList::load(&self.store, &opts);
        render(&entries, list.as_ref(), &opts)
            .map(|plan| serde_json::to_string(&plan))
            .transpose()
            .map_err(|e| Error::from_reason(e.to_string()))
    }

    /// Records a selection and returns the stored values, oldest first.
    #[napi]
    pub fn record(&self, value: Option<String>, config: Option<String>) -> Result<Vec<String>> {
        let opts = parse_options(config)?;
        let list = record_selection(&self.store, value.as_deref(), &opts);
        Ok(list.values().to_vec())
    }

    #[napi]
    pub fn recents(&self, config: Option<String>) -> Result<Vec<String>> {
        let opts = parse_options(config)?;
        Ok(RecencyList::load(&self.store, &opts)
            .map(|l| l.values().to_vec())
            .unwrap_or_default())
    }

    #[napi]
    pub fn clear(&self, config: Option<String>) -> Result<bool> {
        let opts = parse_options(config)?;
        Ok(self.store.remove(&opts.list_store_name).is_some())
    }
}

#[napi]
pub fn init_lufo_logger(min_level: Option<String>, file_path: Option<String>) -> Result<()> {
    let mut config = LoggerConfig::default();
    if let Some(level) = min_level {
        config.min_level = level
            .parse()
            .map_err(|_| Error::from_reason(format!("unknown log level: {level}")))?;
    }
    config.file_path = file_path.map(PathBuf::from);
    logger::init(config);
    Ok(())
}

/// Recent log entries as JSON lines, newest first.
#[napi]
pub fn get_recent_logs(count: Option<u32>, target_filter: Option<String>) -> Vec<String> {
    logger::recent_logs(count.unwrap_or(100) as usize, target_filter.as_deref())
        .iter()
        .filter_map(|e| serde_json::to_string(e).ok())
        .collect()
}
