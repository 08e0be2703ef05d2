//! Toolkit-neutral control tree: the binder and the class engine operate on
//! these nodes instead of any concrete widget toolkit.

use std::collections::{BTreeSet, HashMap};

use serde_json::Value;
use shared::domain::NodeId;

use crate::{format, path::Path};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriState {
    True,
    False,
    Indeterminate,
}

impl TriState {
    /// Direct user toggling cycles strictly true→false→true. Indeterminate is
    /// only ever set programmatically; a toggle leaves it for true.
    pub fn toggled(self) -> TriState {
        match self {
            TriState::True => TriState::False,
            TriState::False => TriState::True,
            TriState::Indeterminate => TriState::True,
        }
    }

    pub fn marker_class(self) -> &'static str {
        match self {
            TriState::True => "checked",
            TriState::False => "unchecked",
            TriState::Indeterminate => "indeterminate",
        }
    }

    pub fn from_json(value: &Value) -> Option<TriState> {
        match value {
            Value::Bool(true) => Some(TriState::True),
            Value::Bool(false) => Some(TriState::False),
            Value::Null => Some(TriState::Indeterminate),
            _ => None,
        }
    }

    pub fn to_json(self) -> Value {
        match self {
            TriState::True => Value::Bool(true),
            TriState::False => Value::Bool(false),
            TriState::Indeterminate => Value::Null,
        }
    }
}

/// The three mutually exclusive tri-state markers.
pub const TRI_MARKERS: [&str; 3] = ["checked", "unchecked", "indeterminate"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    Text,
    Number,
    Checkbox,
    TriState,
    /// Rendered from state, never editable, never round-tripped.
    Display,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ControlValue {
    Text(String),
    Number(i64),
    Bool(bool),
    Tri(TriState),
}

impl ControlValue {
    pub fn to_json(&self) -> Value {
        match self {
            ControlValue::Text(text) => Value::String(text.clone()),
            ControlValue::Number(n) => Value::Number((*n).into()),
            ControlValue::Bool(flag) => Value::Bool(*flag),
            ControlValue::Tri(tri) => tri.to_json(),
        }
    }

    pub fn from_json(kind: ControlKind, value: &Value) -> Option<ControlValue> {
        match kind {
            ControlKind::Text => value.as_str().map(|s| ControlValue::Text(s.to_owned())),
            ControlKind::Number => value.as_i64().map(ControlValue::Number),
            ControlKind::Checkbox => value.as_bool().map(ControlValue::Bool),
            ControlKind::TriState => TriState::from_json(value).map(ControlValue::Tri),
            ControlKind::Display => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ControlNode {
    id: String,
    path: Option<Path>,
    kind: ControlKind,
    value: ControlValue,
    classes: BTreeSet<String>,
}

impl ControlNode {
    pub fn new(id: impl Into<String>, kind: ControlKind) -> Self {
        let value = match kind {
            ControlKind::Text | ControlKind::Display => ControlValue::Text(String::new()),
            ControlKind::Number => ControlValue::Number(0),
            ControlKind::Checkbox => ControlValue::Bool(false),
            ControlKind::TriState => ControlValue::Tri(TriState::False),
        };
        let mut node = Self {
            id: id.into(),
            path: None,
            kind,
            value,
            classes: BTreeSet::new(),
        };
        if kind == ControlKind::TriState {
            node.sync_tri_markers(TriState::False);
        }
        node
    }

    /// A control bound to one state leaf.
    pub fn bound(id: impl Into<String>, kind: ControlKind, path: Path) -> Self {
        let mut node = Self::new(id, kind);
        node.path = Some(path);
        node
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_ref()
    }

    pub fn kind(&self) -> ControlKind {
        self.kind
    }

    pub fn value(&self) -> &ControlValue {
        &self.value
    }

    pub fn classes(&self) -> &BTreeSet<String> {
        &self.classes
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    pub fn set_class(&mut self, class: &str, on: bool) {
        if on {
            self.classes.insert(class.to_owned());
        } else {
            self.classes.remove(class);
        }
    }

    pub(crate) fn write(&mut self, value: ControlValue) {
        if let ControlValue::Tri(tri) = value {
            self.sync_tri_markers(tri);
        }
        self.value = value;
    }

    fn sync_tri_markers(&mut self, tri: TriState) {
        for marker in TRI_MARKERS {
            self.classes.remove(marker);
        }
        self.classes.insert(tri.marker_class().to_owned());
    }
}

#[derive(Debug, Default)]
pub struct ControlTree {
    nodes: Vec<ControlNode>,
    index: HashMap<String, usize>,
    focused: Option<NodeId>,
    highlighted: Option<NodeId>,
}

impl ControlTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, node: ControlNode) {
        if let Some(&slot) = self.index.get(node.id()) {
            self.nodes[slot] = node;
            return;
        }
        self.index.insert(node.id().to_owned(), self.nodes.len());
        self.nodes.push(node);
    }

    pub fn node(&self, id: &str) -> Option<&ControlNode> {
        self.index.get(id).map(|&slot| &self.nodes[slot])
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut ControlNode> {
        let slot = *self.index.get(id)?;
        Some(&mut self.nodes[slot])
    }

    pub fn iter(&self) -> impl Iterator<Item = &ControlNode> {
        self.nodes.iter()
    }

    /// Ids of controls whose path lives under `namespace`, in tree order.
    pub fn ids_under(&self, namespace: &str) -> Vec<String> {
        self.nodes
            .iter()
            .filter(|node| node.path().is_some_and(|path| path.head() == namespace))
            .map(|node| node.id().to_owned())
            .collect()
    }

    pub fn focus(&mut self, node: NodeId) {
        self.focused = Some(node);
    }

    pub fn focused(&self) -> Option<&NodeId> {
        self.focused.as_ref()
    }

    pub fn set_highlight(&mut self, node: Option<NodeId>) {
        self.highlighted = node;
    }

    pub fn highlighted(&self) -> Option<&NodeId> {
        self.highlighted.as_ref()
    }

    /// Rendered value of a display control, for the page's own output.
    pub fn display_text(&self, id: &str) -> Option<&str> {
        match self.node(id)?.value() {
            ControlValue::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }
}

/// Render one leaf into a control of the given kind.
pub(crate) fn write_control(node: &mut ControlNode, path: &Path, value: &Value) {
    match node.kind() {
        ControlKind::Display => {
            node.write(ControlValue::Text(format::display_leaf(path, value)));
        }
        kind => {
            if let Some(control_value) = ControlValue::from_json(kind, value) {
                node.write(control_value);
            } else {
                tracing::warn!(
                    control = node.id(),
                    path = %path,
                    "state leaf does not fit control kind; leaving control untouched"
                );
            }
        }
    }
}
