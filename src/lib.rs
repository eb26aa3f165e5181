/*---------------------------------------------------------------------------------------------
 *  Copyright (c) RIDE Contributors. All rights reserved.
 *  Licensed under the MIT License. See License.txt in the project root for license information.
 *--------------------------------------------------------------------------------------------*/

//! Lufo Native Module
//!
//! Remembers the values most recently chosen on a single-select control and
//! moves them to the top of its option list:
//! - bounded, de-duplicated recency list with JSON/percent-encoded persistence
//! - render plans that place recents, header, divider and placeholder
//! - key-value / cookie storage with automatic fallback
//! - a registry binding engine instances to controls

mod error;

pub mod config;
pub mod control;
pub mod logger;
pub mod recents;
pub mod render;
pub mod store;

#[cfg(feature = "node")]
mod node;

pub use config::{LufoOptions, LufoOverrides};
pub use control::{ControlId, Lufo, Registry, SelectControl};
pub use error::{Error, Result};
pub use recents::RecencyList;
pub use render::{OptionEntry, RenderEntry, RenderPlan, render};
pub use store::{CookieDocument, CookieJar, FileStore, KeyValueStore, MemoryStore, RecencyStore};

#[cfg(feature = "node")]
pub use node::*;
