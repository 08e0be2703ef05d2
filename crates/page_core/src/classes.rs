//! Visibility/enablement markers derived from state.
//!
//! The engine owns exactly the markers named in its rule table; any other
//! class on the target node is left untouched. Evaluation is a pure function
//! of state, so applying the same state twice yields the same marker set.

use std::collections::BTreeMap;

use crate::{controls::ControlTree, page::PageState};

pub struct ClassRule {
    pub marker: &'static str,
    expr: Box<dyn Fn(&PageState) -> bool + Send + Sync>,
}

impl ClassRule {
    pub fn new(
        marker: &'static str,
        expr: impl Fn(&PageState) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            marker,
            expr: Box::new(expr),
        }
    }
}

pub struct ConditionalClassEngine {
    target: String,
    rules: Vec<ClassRule>,
}

impl ConditionalClassEngine {
    pub fn new(target: impl Into<String>, rules: Vec<ClassRule>) -> Self {
        Self {
            target: target.into(),
            rules,
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Marker set for `state`. Pure: no history, no tree access.
    pub fn evaluate(&self, state: &PageState) -> BTreeMap<&'static str, bool> {
        self.rules
            .iter()
            .map(|rule| (rule.marker, (rule.expr)(state)))
            .collect()
    }

    /// Apply the evaluated marker set to the target node.
    pub fn recompute(&self, tree: &mut ControlTree, state: &PageState) {
        let markers = self.evaluate(state);
        if let Some(node) = tree.node_mut(&self.target) {
            for (marker, on) in markers {
                node.set_class(marker, on);
            }
        }
    }
}
