/*---------------------------------------------------------------------------------------------
 *  Copyright (c) RIDE Contributors. All rights reserved.
 *  Licensed under the MIT License. See License.txt in the project root for license information.
 *--------------------------------------------------------------------------------------------*/

//! Projection of a recency list onto a control's options.
//!
//! Rendering never touches a live control: it yields a [`RenderPlan`], the
//! full top-to-bottom sequence of entries the control should show. Original
//! options are never dropped, only moved below the recents block.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::config::LufoOptions;
use crate::recents::RecencyList;

/// One selectable choice as reported by the control.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionEntry {
    pub value: Option<String>,
    pub label: String,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub selected: bool,
    /// Label of the group the option sits in, if any.
    #[serde(default)]
    pub group: Option<String>,
}

impl OptionEntry {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            label: label.into(),
            ..Default::default()
        }
    }

    /// A valueless prompt entry such as "Choose one...".
    pub fn placeholder(label: impl Into<String>) -> Self {
        Self {
            value: None,
            label: label.into(),
            ..Default::default()
        }
    }

    pub fn is_valueless(&self) -> bool {
        self.value.as_deref().is_none_or(str::is_empty)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RenderEntry {
    /// Pinned valueless first entry.
    Placeholder { entry: OptionEntry },
    /// Disabled label above the recents block.
    Header { label: String },
    /// Copy of an original option, shown because it was chosen recently.
    /// Sits at the top level, never inside the original's group.
    Recent { entry: OptionEntry },
    /// Labelled group holding the recents block.
    RecentsGroup { label: String, entries: Vec<OptionEntry> },
    /// Disabled separator between recents and the full list.
    Divider { text: String },
    /// Original option, unchanged.
    Original { entry: OptionEntry },
}

impl RenderEntry {
    fn recent_entries(&self) -> &[OptionEntry] {
        match self {
            RenderEntry::Recent { entry } => std::slice::from_ref(entry),
            RenderEntry::RecentsGroup { entries, .. } => entries,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderPlan {
    pub entries: Vec<RenderEntry>,
}

impl RenderPlan {
    /// Values of the recents block, top to bottom.
    pub fn recent_values(&self) -> Vec<&str> {
        self.entries
            .iter()
            .flat_map(RenderEntry::recent_entries)
            .filter_map(|e| e.value.as_deref())
            .collect()
    }

    pub fn placeholder(&self) -> Option<&OptionEntry> {
        match self.entries.first() {
            Some(RenderEntry::Placeholder { entry }) => Some(entry),
            _ => None,
        }
    }

    /// Originals in the order they will appear.
    pub fn originals(&self) -> impl Iterator<Item = &OptionEntry> {
        self.entries.iter().filter_map(|e| match e {
            RenderEntry::Original { entry } => Some(entry),
            _ => None,
        })
    }
}

/// Whether a control with `option_count` options is long enough for recents.
pub fn is_eligible(option_count: usize, options: &LufoOptions) -> bool {
    option_count >= options.list_minimum_length
}

/// Computes the plan for `entries` given the stored recents. `None` means the
/// control should be left exactly as it is: it is too short, or nothing has
/// been recorded yet.
pub fn render(entries: &[OptionEntry], list: Option<&RecencyList>, options: &LufoOptions) -> Option<RenderPlan> {
    if !is_eligible(entries.len(), options) {
        return None;
    }
    let list = list?;

    let (placeholder, originals) = match entries.split_first() {
        Some((first, rest)) if options.check_initial_value && first.is_valueless() => (Some(first), rest),
        _ => (None, entries),
    };

    let shown = list.len().saturating_sub(options.recents_list_length);
    let mut seen = HashSet::new();
    let mut recents: Vec<OptionEntry> = Vec::new();
    for value in &list.values()[shown..] {
        if !seen.insert(value.as_str()) {
            continue;
        }
        let Some(matched) = originals.iter().find(|o| o.value.as_deref() == Some(value.as_str())) else {
            log::trace!("no option for stored value {value:?}");
            continue;
        };
        let mut copy = OptionEntry {
            group: None,
            ..matched.clone()
        };
        if options.strip_selected {
            copy.selected = false;
        }
        recents.insert(0, copy);
    }

    let mut plan = Vec::with_capacity(originals.len() + recents.len() + 3);
    if let Some(p) = placeholder {
        plan.push(RenderEntry::Placeholder { entry: p.clone() });
    }
    if options.group_list {
        plan.push(RenderEntry::RecentsGroup {
            label: options.recents_list_title.clone(),
            entries: recents,
        });
    } else {
        if options.recents_list_title_enabled {
            plan.push(RenderEntry::Header {
                label: options.recents_list_title.clone(),
            });
        }
        plan.extend(recents.into_iter().map(|entry| RenderEntry::Recent { entry }));
    }
    if options.divider_enabled {
        plan.push(RenderEntry::Divider {
            text: options.divider_text.clone(),
        });
    }
    plan.extend(originals.iter().cloned().map(|entry| RenderEntry::Original { entry }));

    Some(RenderPlan { entries: plan })
}
