/*---------------------------------------------------------------------------------------------
 *  Copyright (c) RIDE Contributors. All rights reserved.
 *  Licensed under the MIT License. See License.txt in the project root for license information.
 *--------------------------------------------------------------------------------------------*/

//! Storage for recents records: a persistent key-value store when one is
//! usable, otherwise an expiring cookie scoped to `/`.

use chrono::{DateTime, Datelike, Duration, NaiveDateTime, Utc};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use regex::Regex;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use crate::error::{Error, Result};

/// Characters left alone by JavaScript's `encodeURIComponent`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

const PROBE_KEY: &str = "tryLufo";
const COOKIE_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

pub(crate) fn encode_component(s: &str) -> String {
    utf8_percent_encode(s, COMPONENT).to_string()
}

pub(crate) fn decode_component(s: &str) -> String {
    percent_decode_str(s).decode_utf8_lossy().to_string()
}

// ─── Key-value backends ────────────────────────────────────────────────────

pub trait KeyValueStore: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> Result<()>;
    fn remove_item(&self, key: &str) -> Result<()>;
}

/// JSON file holding every key, cached in memory and rewritten on each
/// mutation.
pub struct FileStore {
    db_path: PathBuf,
    cache: Mutex<HashMap<String, String>>,
}

impl FileStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let db_path = path.into();
        let mut cache = HashMap::new();

        if db_path.exists() {
            match fs::read_to_string(&db_path) {
                Ok(content) => match serde_json::from_str::<HashMap<String, String>>(&content) {
                    Ok(data) => cache = data,
                    Err(e) => log::warn!("ignoring unreadable store {}: {}", db_path.display(), e),
                },
                Err(e) => log::warn!("cannot read store {}: {}", db_path.display(), e),
            }
        }

        Self {
            db_path,
            cache: Mutex::new(cache),
        }
    }

    /// `<local data dir>/lufo/recents.json`, if the platform has one.
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_local_dir().map(|d| d.join("lufo").join("recents.json"))
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    fn persist(&self, cache: &HashMap<String, String>) -> Result<()> {
        if let Some(parent) = self.db_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(cache)
            .map_err(|e| Error::Unavailable(e.to_string()))?;
        fs::write(&self.db_path, content)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        Ok(cache.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        let previous = cache.insert(key.to_string(), value.to_string());
        if let Err(e) = self.persist(&cache) {
            match previous {
                Some(p) => cache.insert(key.to_string(), p),
                None => cache.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = cache.remove(key) {
            if let Err(e) = self.persist(&cache) {
                cache.insert(key.to_string(), previous);
                return Err(e);
            }
        }
        Ok(())
    }
}

/// In-memory store. Can be marked unavailable, in which case every call
/// fails the way a disabled or full browser store does.
pub struct MemoryStore {
    items: RwLock<HashMap<String, String>>,
    available: AtomicBool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            items: RwLock::new(HashMap::new()),
            available: AtomicBool::new(true),
        }
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn check(&self) -> Result<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(Error::Unavailable("memory store disabled".into()))
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        self.check()?;
        let items = self.items.read().unwrap_or_else(|e| e.into_inner());
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.check()?;
        let mut items = self.items.write().unwrap_or_else(|e| e.into_inner());
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.check()?;
        let mut items = self.items.write().unwrap_or_else(|e| e.into_inner());
        items.remove(key);
        Ok(())
    }
}

// ─── Cookies ───────────────────────────────────────────────────────────────

/// The `document.cookie` accessor pair: reading yields `name=value` pairs
/// joined by `"; "`, writing takes one cookie with its attributes.
pub trait CookieDocument: Send + Sync {
    fn cookie(&self) -> String;
    fn set_cookie(&self, raw: &str);

    /// The time expiry dates are measured against.
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

struct Cookie {
    name: String,
    value: String,
    expires: Option<DateTime<Utc>>,
}

/// In-memory cookie jar with browser expiry rules.
pub struct CookieJar {
    cookies: Mutex<Vec<Cookie>>,
    clock: Clock,
}

impl Default for CookieJar {
    fn default() -> Self {
        Self::new()
    }
}

impl CookieJar {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(Utc::now))
    }

    pub fn with_clock(clock: Clock) -> Self {
        Self {
            cookies: Mutex::new(Vec::new()),
            clock,
        }
    }
}

impl CookieDocument for CookieJar {
    fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    fn cookie(&self) -> String {
        let now = self.now();
        let cookies = self.cookies.lock().unwrap_or_else(|e| e.into_inner());
        cookies
            .iter()
            .filter(|c| c.expires.is_none_or(|exp| exp > now))
            .map(|c| format!("{}={}", c.name, c.value))
            .collect::<Vec<_>>()
            .join("; ")
    }

    fn set_cookie(&self, raw: &str) {
        let mut parts = raw.split(';');
        let Some((name, value)) = parts.next().and_then(|p| p.split_once('=')) else {
            log::trace!("ignoring cookie without a name: {raw:?}");
            return;
        };
        let name = name.trim().to_string();
        let value = value.trim().to_string();

        let mut expires = None;
        for attr in parts {
            if let Some((key, val)) = attr.split_once('=') {
                if key.trim().eq_ignore_ascii_case("expires") {
                    match NaiveDateTime::parse_from_str(val.trim(), COOKIE_DATE_FORMAT) {
                        Ok(dt) => expires = Some(dt.and_utc()),
                        Err(e) => log::trace!("ignoring cookie expiry {val:?}: {e}"),
                    }
                }
            }
        }

        let mut cookies = self.cookies.lock().unwrap_or_else(|e| e.into_inner());
        cookies.retain(|c| c.name != name);
        if expires.is_some_and(|exp| exp <= self.now()) {
            return;
        }
        cookies.push(Cookie { name, value, expires });
    }
}

// ─── Recency store ─────────────────────────────────────────────────────────

enum Backend<'a> {
    Local(&'a dyn KeyValueStore),
    Cookie(&'a dyn CookieDocument),
}

/// Named string records with optional expiry. The key-value store is probed
/// on every call; cookies take over whenever it refuses a write.
#[derive(Clone)]
pub struct RecencyStore {
    local: Option<Arc<dyn KeyValueStore>>,
    cookies: Arc<dyn CookieDocument>,
}

impl RecencyStore {
    pub fn new(local: Option<Arc<dyn KeyValueStore>>, cookies: Arc<dyn CookieDocument>) -> Self {
        Self { local, cookies }
    }

    pub fn cookies_only(cookies: Arc<dyn CookieDocument>) -> Self {
        Self::new(None, cookies)
    }

    fn backend(&self) -> Backend<'_> {
        if let Some(local) = self.local.as_deref() {
            match probe(local) {
                Ok(()) => return Backend::Local(local),
                Err(e) => log::debug!("key-value store unavailable, using cookies: {e}"),
            }
        }
        Backend::Cookie(self.cookies.as_ref())
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match self.backend() {
            Backend::Local(store) => store.get_item(key).unwrap_or_else(|e| {
                log::debug!("reading {key:?} failed: {e}");
                None
            }),
            Backend::Cookie(doc) => read_cookie(doc, key),
        }
    }

    pub fn set(&self, key: &str, value: &str, ttl_days: Option<f64>) {
        if let Backend::Local(store) = self.backend() {
            match store.set_item(key, value) {
                Ok(()) => return,
                Err(e) => log::debug!("writing {key:?} failed, using cookies: {e}"),
            }
        }
        self.write_cookie(key, value, ttl_days);
    }

    /// Removes the record and returns what it held.
    pub fn remove(&self, key: &str) -> Option<String> {
        match self.backend() {
            Backend::Local(store) => {
                let previous = store.get_item(key).ok().flatten();
                if let Err(e) = store.remove_item(key) {
                    log::debug!("removing {key:?} failed: {e}");
                }
                previous
            }
            Backend::Cookie(doc) => {
                let previous = read_cookie(doc, key);
                self.write_cookie(key, "", Some(-1.0));
                previous
            }
        }
    }

    fn write_cookie(&self, key: &str, value: &str, ttl_days: Option<f64>) {
        let mut attrs = String::from("; path=/");
        if let Some(expires) = ttl_days.and_then(|days| self.cookie_expiry(days)) {
            attrs.push_str("; expires=");
            attrs.push_str(&expires.format(COOKIE_DATE_FORMAT).to_string());
        }
        self.cookies.set_cookie(&format!(
            "{}={}{}",
            encode_component(key),
            encode_component(value),
            attrs
        ));
    }
}

impl RecencyStore {
    /// `days` from the jar's clock. Out-of-range ages become session cookies,
    /// or an epoch date when the age is negative.
    fn cookie_expiry(&self, days: f64) -> Option<DateTime<Utc>> {
        let expires = Duration::try_milliseconds((86_400_000.0 * days) as i64)
            .and_then(|age| self.cookies.now().checked_add_signed(age))
            .filter(|dt| (0..=9999).contains(&dt.year()));
        match expires {
            Some(dt) => Some(dt),
            None if days < 0.0 => Some(DateTime::UNIX_EPOCH),
            None => {
                log::debug!("cookie age of {days} days is out of range, writing a session cookie");
                None
            }
        }
    }
}

fn probe(store: &dyn KeyValueStore) -> Result<()> {
    store.set_item(PROBE_KEY, PROBE_KEY)?;
    store.remove_item(PROBE_KEY)
}

fn read_cookie(doc: &dyn CookieDocument, key: &str) -> Option<String> {
    let pattern = format!(r"(^|;)\s*{}=([^;\s]*)", regex::escape(&encode_component(key)));
    let re = Regex::new(&pattern).ok()?;
    let jar = doc.cookie();
    re.captures(&jar)
        .and_then(|caps| caps.get(2))
        .map(|m| decode_component(m.as_str()))
}
