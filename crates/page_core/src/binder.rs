//! Bidirectional sync between one namespaced state and the control tree.
//!
//! The binder owns a private working copy of its namespace's state. Inbound
//! snapshots overwrite controls without firing edit paths; outbound edits fold
//! into the working copy, run the caller's cross-field rules, and hand the
//! result back for the upstream push. Per-binding `last` and `dirty`
//! bookkeeping suppresses redundant rewrites and protects in-flight edits
//! from being clobbered by an inbound update in the same tick.

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::{
    controls::{write_control, ControlKind, ControlTree, ControlValue, TriState},
    path::{get_path, set_path, Path, StateError},
};

#[derive(Debug, Error)]
pub enum BinderError {
    #[error("unknown control '{0}'")]
    UnknownControl(String),
    #[error("control '{0}' is not bound under this binder's namespace")]
    NotBound(String),
    #[error("control '{0}' is display-only")]
    DisplayOnly(String),
    #[error("control '{0}' rejected value of the wrong kind")]
    KindMismatch(String),
    #[error(transparent)]
    State(#[from] StateError),
}

/// Cross-field derivation hook, invoked synchronously on every user edit with
/// the working copy and the edited path; returns the additionally-changed
/// paths.
pub type EditRules<'a> = &'a dyn Fn(&mut Value, &Path) -> Vec<Path>;

#[derive(Debug)]
struct Binding {
    node_id: String,
    /// Path relative to the namespace root.
    rel: Path,
    /// Full path as written in the tree, kept for display formatting.
    full: Path,
    last: Option<Value>,
    dirty: bool,
}

pub struct UiBinder {
    namespace: String,
    bindings: Vec<Binding>,
    working: Value,
}

impl UiBinder {
    /// Walk `tree` for controls whose path lives under `namespace`, record
    /// one binding per control, and render initial values from `initial`.
    pub fn bind(namespace: &str, tree: &mut ControlTree, initial: Value) -> Self {
        let mut bindings = Vec::new();
        for id in tree.ids_under(namespace) {
            let Some(full) = tree.node(&id).and_then(|node| node.path().cloned()) else {
                continue;
            };
            let Some(rel) = full.strip_head() else {
                continue;
            };
            bindings.push(Binding {
                node_id: id,
                rel,
                full,
                last: None,
                dirty: false,
            });
        }
        let mut binder = Self {
            namespace: namespace.to_owned(),
            bindings,
            working: Value::Null,
        };
        binder.apply(tree, initial);
        binder
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The binder's current working copy of its namespace's state.
    pub fn working(&self) -> &Value {
        &self.working
    }

    pub fn owns(&self, node_id: &str) -> bool {
        self.bindings.iter().any(|b| b.node_id == node_id)
    }

    pub fn is_dirty(&self, node_id: &str) -> bool {
        self.bindings
            .iter()
            .any(|b| b.node_id == node_id && b.dirty)
    }

    /// Overwrite all bound controls from `state` without firing edit
    /// listeners. Controls dirty from an edit still in flight keep their
    /// displayed value; dirty marks clear once the full state has been
    /// applied.
    pub fn apply(&mut self, tree: &mut ControlTree, state: Value) {
        self.working = state;
        for binding in &mut self.bindings {
            let Some(value) = get_path(&self.working, &binding.rel) else {
                continue;
            };
            if binding.dirty {
                binding.last = Some(value.clone());
                continue;
            }
            if binding.last.as_ref() == Some(value) {
                continue;
            }
            if let Some(node) = tree.node_mut(&binding.node_id) {
                write_control(node, &binding.full, value);
            }
            binding.last = Some(value.clone());
        }
        for binding in &mut self.bindings {
            binding.dirty = false;
        }
    }

    /// Fold a user edit into the working copy, run the cross-field rules, and
    /// return the state to push upstream.
    pub fn user_edit(
        &mut self,
        tree: &mut ControlTree,
        node_id: &str,
        input: ControlValue,
        rules: EditRules<'_>,
    ) -> Result<Value, BinderError> {
        let slot = self
            .bindings
            .iter()
            .position(|b| b.node_id == node_id)
            .ok_or_else(|| BinderError::NotBound(node_id.to_owned()))?;
        let node = tree
            .node_mut(node_id)
            .ok_or_else(|| BinderError::UnknownControl(node_id.to_owned()))?;
        let compatible = matches!(
            (node.kind(), &input),
            (ControlKind::Text, ControlValue::Text(_))
                | (ControlKind::Number, ControlValue::Number(_))
                | (ControlKind::Checkbox, ControlValue::Bool(_))
                | (ControlKind::TriState, ControlValue::Tri(_))
        );
        if node.kind() == ControlKind::Display {
            return Err(BinderError::DisplayOnly(node_id.to_owned()));
        }
        if !compatible {
            return Err(BinderError::KindMismatch(node_id.to_owned()));
        }
        node.write(input.clone());

        let edited = self.bindings[slot].rel.clone();
        let leaf = input.to_json();
        set_path(&mut self.working, &edited, leaf.clone())?;
        self.bindings[slot].last = Some(leaf);
        self.bindings[slot].dirty = true;

        let changed = rules(&mut self.working, &edited);
        for path in &changed {
            let Some(value) = get_path(&self.working, path).cloned() else {
                continue;
            };
            for binding in self.bindings.iter_mut().filter(|b| b.rel == *path) {
                if let Some(node) = tree.node_mut(&binding.node_id) {
                    write_control(node, &binding.full, &value);
                }
                binding.last = Some(value.clone());
                binding.dirty = true;
            }
        }
        debug!(
            namespace = %self.namespace,
            control = node_id,
            edited = %edited,
            side_effects = changed.len(),
            "local edit folded into working copy"
        );
        Ok(self.working.clone())
    }

    /// Cycle a checkbox or tri-state control as a direct user toggle.
    pub fn toggle(
        &mut self,
        tree: &mut ControlTree,
        node_id: &str,
        rules: EditRules<'_>,
    ) -> Result<Value, BinderError> {
        let next = match tree
            .node(node_id)
            .ok_or_else(|| BinderError::UnknownControl(node_id.to_owned()))?
            .value()
        {
            ControlValue::Bool(flag) => ControlValue::Bool(!flag),
            ControlValue::Tri(tri) => ControlValue::Tri(tri.toggled()),
            _ => return Err(BinderError::KindMismatch(node_id.to_owned())),
        };
        self.user_edit(tree, node_id, next, rules)
    }

    /// Programmatic tri-state write: render-side only, never folded into the
    /// working copy or pushed upstream. The only way a control reaches
    /// indeterminate.
    pub fn set_tri(
        &mut self,
        tree: &mut ControlTree,
        node_id: &str,
        tri: TriState,
    ) -> Result<(), BinderError> {
        if !self.owns(node_id) {
            return Err(BinderError::NotBound(node_id.to_owned()));
        }
        let node = tree
            .node_mut(node_id)
            .ok_or_else(|| BinderError::UnknownControl(node_id.to_owned()))?;
        if node.kind() != ControlKind::TriState {
            return Err(BinderError::KindMismatch(node_id.to_owned()));
        }
        node.write(ControlValue::Tri(tri));
        Ok(())
    }
}
