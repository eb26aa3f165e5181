/*---------------------------------------------------------------------------------------------
 *  Copyright (c) RIDE Contributors. All rights reserved.
 *  Licensed under the MIT License. See License.txt in the project root for license information.
 *--------------------------------------------------------------------------------------------*/

//! `log` backend keeping recent records in a ring buffer, with optional
//! JSON-lines file output and rotation.

use log::{Level, LevelFilter, Log, Metadata, Record};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: f64,
    pub level: String,
    pub target: String,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub max_buffer_size: usize,
    pub min_level: LevelFilter,
    pub file_path: Option<PathBuf>,
    pub max_file_size: u64,
    pub max_rotated_files: u32,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            max_buffer_size: 5000,
            min_level: LevelFilter::Info,
            file_path: None,
            max_file_size: 10_000_000,
            max_rotated_files: 5,
        }
    }
}

struct LoggerState {
    buffer: VecDeque<LogEntry>,
    config: LoggerConfig,
    total_logged: u64,
}

pub struct RingLogger {
    state: RwLock<Option<LoggerState>>,
}

static LOGGER: RingLogger = RingLogger::new();

fn now_ms() -> f64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs_f64() * 1000.0
}

fn rotate_log_files(base: &Path, max: u32) {
    let _ = fs::remove_file(format!("{}.{}", base.display(), max));
    for i in (1..max).rev() {
        let _ = fs::rename(format!("{}.{}", base.display(), i), format!("{}.{}", base.display(), i + 1));
    }
    let _ = fs::rename(base, format!("{}.1", base.display()));
}

impl Default for RingLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl RingLogger {
    pub const fn new() -> Self {
        Self {
            state: RwLock::new(None),
        }
    }

    pub fn configure(&self, config: LoggerConfig) {
        if let Some(parent) = config.file_path.as_deref().and_then(Path::parent) {
            let _ = fs::create_dir_all(parent);
        }
        *self.state.write().unwrap_or_else(|e| e.into_inner()) = Some(LoggerState {
            buffer: VecDeque::with_capacity(config.max_buffer_size.min(1024)),
            config,
            total_logged: 0,
        });
    }

    /// Newest first, at most `count`, optionally only at `min_level` or more
    /// severe and only for targets containing `target_filter`.
    pub fn recent(&self, count: usize, min_level: Option<Level>, target_filter: Option<&str>) -> Vec<LogEntry> {
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        let Some(state) = state.as_ref() else {
            return Vec::new();
        };
        state
            .buffer
            .iter()
            .rev()
            .filter(|e| match (min_level, e.level.parse::<Level>()) {
                (Some(min), Ok(level)) => level <= min,
                _ => true,
            })
            .filter(|e| target_filter.is_none_or(|t| e.target.contains(t)))
            .take(count)
            .cloned()
            .collect()
    }

    pub fn total_logged(&self) -> u64 {
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        state.as_ref().map(|s| s.total_logged).unwrap_or(0)
    }

    pub fn clear(&self) {
        if let Some(s) = self.state.write().unwrap_or_else(|e| e.into_inner()).as_mut() {
            s.buffer.clear();
        }
    }
}

impl Log for RingLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        state.as_ref().is_some_and(|s| metadata.level() <= s.config.min_level)
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let mut guard = self.state.write().unwrap_or_else(|e| e.into_inner());
        let Some(state) = guard.as_mut() else {
            return;
        };

        let entry = LogEntry {
            timestamp: now_ms(),
            level: record.level().to_string(),
            target: record.target().to_string(),
            message: record.args().to_string(),
        };

        if state.buffer.len() >= state.config.max_buffer_size {
            state.buffer.pop_front();
        }
        if state.config.max_buffer_size > 0 {
            state.buffer.push_back(entry.clone());
        }
        state.total_logged += 1;

        if let Some(fp) = &state.config.file_path {
            if let Ok(meta) = fs::metadata(fp) {
                if meta.len() >= state.config.max_file_size {
                    rotate_log_files(fp, state.config.max_rotated_files);
                }
            }
            if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(fp) {
                let _ = writeln!(f, "{}", serde_json::to_string(&entry).unwrap_or_default());
            }
        }
    }

    fn flush(&self) {}
}

/// Installs the process-wide logger, or reconfigures it if already installed.
pub fn init(config: LoggerConfig) {
    let level = config.min_level;
    LOGGER.configure(config);
    if log::set_logger(&LOGGER).is_err() {
        log::debug!("logger already installed, configuration replaced");
    }
    log::set_max_level(level);
}

pub fn recent_logs(count: usize, target_filter: Option<&str>) -> Vec<LogEntry> {
    LOGGER.recent(count, None, target_filter)
}
