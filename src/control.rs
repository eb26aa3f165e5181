/*---------------------------------------------------------------------------------------------
 *  Copyright (c) RIDE Contributors. All rights reserved.
 *  Licensed under the MIT License. See License.txt in the project root for license information.
 *--------------------------------------------------------------------------------------------*/

//! Binding of engine instances to select controls.
//!
//! The [`Registry`] owns one [`Lufo`] per control, keyed by [`ControlId`].
//! Attaching again merges new options into the existing instance and
//! re-renders from the options the control had when it was first bound, so
//! repeated attaches never stack headers or copies on top of each other.

use std::collections::HashMap;

use crate::config::{LufoOptions, LufoOverrides};
use crate::recents::{RecencyList, record_selection};
use crate::render::{OptionEntry, RenderPlan, is_eligible, render};
use crate::store::RecencyStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ControlId(pub u64);

/// The UI side of a select element.
pub trait SelectControl {
    fn id(&self) -> ControlId;

    /// Only single-select controls can be bound.
    fn is_single_select(&self) -> bool;

    /// Current options, top to bottom, including those inside groups.
    fn options(&self) -> Vec<OptionEntry>;

    fn selected_value(&self) -> Option<String>;

    /// Replace the displayed options with `plan`.
    fn apply(&mut self, plan: &RenderPlan);
}

/// Engine state for one bound control.
#[derive(Debug, Clone)]
pub struct Lufo {
    options: LufoOptions,
    original: Vec<OptionEntry>,
    handlers: usize,
}

impl Lufo {
    fn new(original: Vec<OptionEntry>, overrides: Option<&LufoOverrides>) -> Self {
        Self {
            options: overrides.map(LufoOptions::with_overrides).unwrap_or_default(),
            original,
            handlers: 0,
        }
    }

    pub fn options(&self) -> &LufoOptions {
        &self.options
    }

    /// Options captured when the control was first bound.
    pub fn original_options(&self) -> &[OptionEntry] {
        &self.original
    }

    /// Number of change handlers bound. More than one only happens with
    /// `stackChangeHandlers`.
    pub fn handlers(&self) -> usize {
        self.handlers
    }

    pub fn is_watching(&self) -> bool {
        self.handlers > 0
    }

    /// The plan for the stored recents, or `None` to leave the control alone.
    pub fn plan(&self, store: &RecencyStore) -> Option<RenderPlan> {
        if !is_eligible(self.original.len(), &self.options) {
            return None;
        }
        let list = RecencyList::load(store, &self.options)?;
        render(&self.original, Some(&list), &self.options)
    }

    fn init(&mut self, store: &RecencyStore, control: &mut dyn SelectControl, overrides: Option<&LufoOverrides>) {
        if let Some(o) = overrides {
            self.options.merge(o);
        }
        if !is_eligible(self.original.len(), &self.options) {
            log::debug!(
                "control {:?} has {} options, {} needed",
                control.id(),
                self.original.len(),
                self.options.list_minimum_length
            );
            return;
        }

        if let Some(plan) = self.plan(store) {
            control.apply(&plan);
        }
        if self.handlers == 0 || self.options.stack_change_handlers {
            self.handlers += 1;
        }
    }
}

pub struct Registry {
    store: RecencyStore,
    instances: HashMap<ControlId, Lufo>,
}

impl Registry {
    pub fn new(store: RecencyStore) -> Self {
        Self {
            store,
            instances: HashMap::new(),
        }
    }

    pub fn store(&self) -> &RecencyStore {
        &self.store
    }

    /// Binds `control`, or re-configures it when already bound. Controls that
    /// are not single-selects are declined. Re-attaching without overrides
    /// only returns the existing instance.
    pub fn attach(&mut self, control: &mut dyn SelectControl, overrides: Option<&LufoOverrides>) -> Option<&mut Lufo> {
        let id = control.id();
        if self.instances.contains_key(&id) {
            let lufo = self.instances.get_mut(&id)?;
            if overrides.is_some() {
                lufo.init(&self.store, control, overrides);
            }
            return Some(lufo);
        }

        if !control.is_single_select() {
            log::debug!("control {id:?} is not a single select, not binding");
            return None;
        }

        let mut lufo = Lufo::new(control.options(), overrides);
        lufo.init(&self.store, control, None);
        Some(self.instances.entry(id).or_insert(lufo))
    }

    pub fn instance(&self, id: ControlId) -> Option<&Lufo> {
        self.instances.get(&id)
    }

    /// Change notification from `control`. Runs the record cycle once per
    /// bound handler and returns the stored list afterwards, or `None` when
    /// the control is not being watched.
    pub fn notify_change(&mut self, control: &dyn SelectControl) -> Option<RecencyList> {
        let lufo = self.instances.get(&control.id()).filter(|l| l.is_watching())?;
        let value = control.selected_value();
        let mut list = None;
        for _ in 0..lufo.handlers {
            list = Some(record_selection(&self.store, value.as_deref(), &lufo.options));
        }
        list
    }

    /// Stored recents for a bound control.
    pub fn recents(&self, id: ControlId) -> Option<RecencyList> {
        let lufo = self.instances.get(&id)?;
        RecencyList::load(&self.store, &lufo.options)
    }

    /// Forgets the recents of a bound control. Returns whether anything was
    /// stored.
    pub fn clear(&mut self, id: ControlId) -> bool {
        match self.instances.get(&id) {
            Some(lufo) => self.store.remove(&lufo.options.list_store_name).is_some(),
            None => false,
        }
    }

    pub fn detach(&mut self, id: ControlId) -> Option<Lufo> {
        self.instances.remove(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RenderEntry;
    use crate::store::{CookieJar, MemoryStore};
    use std::sync::Arc;

    struct FakeSelect {
        id: u64,
        multiple: bool,
        options: Vec<OptionEntry>,
        selected: Option<String>,
        applied: Vec<RenderPlan>,
    }

    impl FakeSelect {
        fn new(id: u64, count: usize) -> Self {
            let mut options = vec![OptionEntry::placeholder("Choose...")];
            options.extend((1..count).map(|i| OptionEntry::new(format!("v{i}"), format!("Value {i}"))));
            Self {
                id,
                multiple: false,
                options,
                selected: None,
                applied: Vec::new(),
            }
        }

        fn select(&mut self, value: &str) {
            self.selected = Some(value.to_string());
        }
    }

    impl SelectControl for FakeSelect {
        fn id(&self) -> ControlId {
            ControlId(self.id)
        }

        fn is_single_select(&self) -> bool {
            !self.multiple
        }

        fn options(&self) -> Vec<OptionEntry> {
            self.options.clone()
        }

        fn selected_value(&self) -> Option<String> {
            self.selected.clone()
        }

        fn apply(&mut self, plan: &RenderPlan) {
            self.applied.push(plan.clone());
        }
    }

    fn registry() -> Registry {
        Registry::new(RecencyStore::new(Some(Arc::new(MemoryStore::new())), Arc::new(CookieJar::new())))
    }

    #[test]
    fn test_declines_multi_select() {
        let mut reg = registry();
        let mut control = FakeSelect::new(1, 8);
        control.multiple = true;
        assert!(reg.attach(&mut control, None).is_none());
        assert!(reg.instance(ControlId(1)).is_none());
    }

    #[test]
    fn test_first_attach_without_record_changes_nothing() {
        let mut reg = registry();
        let mut control = FakeSelect::new(1, 8);
        let lufo = reg.attach(&mut control, None).unwrap();
        assert!(lufo.is_watching());
        assert!(control.applied.is_empty());
    }

    #[test]
    fn test_short_control_is_not_watched() {
        let mut reg = registry();
        let mut control = FakeSelect::new(1, 4);
        let lufo = reg.attach(&mut control, None).unwrap();
        assert!(!lufo.is_watching());

        control.select("v1");
        assert!(reg.notify_change(&control).is_none());
        assert!(reg.store().get("recentOptionValues").is_none());
    }

    #[test]
    fn test_changes_feed_next_render() {
        let mut reg = registry();
        let mut control = FakeSelect::new(1, 8);
        reg.attach(&mut control, None);

        for v in ["v2", "v5", "v2", "v7"] {
            control.select(v);
            reg.notify_change(&control);
        }
        assert_eq!(reg.recents(ControlId(1)).unwrap().values(), ["v5", "v2", "v7"]);

        // a page reload: fresh control, fresh registry over the same store
        let mut reloaded = Registry::new(reg.store().clone());
        let mut control = FakeSelect::new(1, 8);
        reloaded.attach(&mut control, None);
        let plan = control.applied.last().unwrap();
        assert_eq!(plan.recent_values(), ["v7", "v2", "v5"]);
        assert!(matches!(plan.entries[0], RenderEntry::Placeholder { .. }));
    }

    #[test]
    fn test_reattach_merges_and_rerenders_from_original() {
        let mut reg = registry();
        let mut control = FakeSelect::new(1, 8);
        reg.attach(&mut control, None);
        control.select("v3");
        reg.notify_change(&control);

        let overrides = LufoOverrides { group_list: Some(true), ..Default::default() };
        reg.attach(&mut control, Some(&overrides));
        let overrides = LufoOverrides { divider_enabled: Some(false), ..Default::default() };
        let lufo = reg.attach(&mut control, Some(&overrides)).unwrap();
        assert!(lufo.options().group_list);
        assert!(!lufo.options().divider_enabled);
        assert_eq!(lufo.handlers(), 1);

        let plan = control.applied.last().unwrap();
        assert_eq!(plan.originals().count(), 7);
        assert_eq!(plan.entries.len(), 1 + 1 + 7);
    }

    #[test]
    fn test_reattach_without_overrides_is_noop() {
        let mut reg = registry();
        let mut control = FakeSelect::new(1, 8);
        reg.store().set("recentOptionValues", r#"["v1"]"#, None);
        reg.attach(&mut control, None);
        reg.attach(&mut control, None);
        assert_eq!(control.applied.len(), 1);
    }

    #[test]
    fn test_stacked_handlers() {
        let mut reg = registry();
        let mut control = FakeSelect::new(1, 8);
        let stack = LufoOverrides { stack_change_handlers: Some(true), ..Default::default() };
        reg.attach(&mut control, Some(&stack));
        reg.attach(&mut control, Some(&stack));
        assert_eq!(reg.instance(ControlId(1)).unwrap().handlers(), 2);

        control.select("v1");
        let list = reg.notify_change(&control).unwrap();
        assert_eq!(list.values(), ["v1"]);
    }

    #[test]
    fn test_separate_store_names() {
        let mut reg = registry();
        let mut a = FakeSelect::new(1, 6);
        let mut b = FakeSelect::new(2, 6);
        reg.attach(&mut a, Some(&LufoOverrides { list_store_name: Some("a".into()), ..Default::default() }));
        reg.attach(&mut b, Some(&LufoOverrides { list_store_name: Some("b".into()), ..Default::default() }));

        a.select("v1");
        reg.notify_change(&a);
        b.select("v2");
        reg.notify_change(&b);
        assert_eq!(reg.recents(ControlId(1)).unwrap().values(), ["v1"]);
        assert_eq!(reg.recents(ControlId(2)).unwrap().values(), ["v2"]);

        assert!(reg.clear(ControlId(1)));
        assert!(reg.recents(ControlId(1)).is_none());
        assert!(!reg.clear(ControlId(1)));
        assert!(reg.detach(ControlId(2)).is_some());
        assert!(reg.recents(ControlId(2)).is_none());
    }
}
