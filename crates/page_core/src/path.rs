//! Dotted addresses into a state tree.
//!
//! A path always denotes exactly one leaf: resolution never guesses, never
//! auto-creates intermediate objects, and editing through a path only accepts
//! scalar leaves.

use std::fmt;

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    #[error("empty path")]
    Empty,
    #[error("empty segment at position {0}")]
    EmptySegment(usize),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StateError {
    #[error("path '{0}' does not resolve to a value")]
    Unresolvable(Path),
    #[error("path '{0}' does not denote a scalar leaf")]
    NotALeaf(Path),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path(Vec<String>);

impl Path {
    pub fn parse(dotted: &str) -> Result<Self, PathError> {
        if dotted.is_empty() {
            return Err(PathError::Empty);
        }
        let segments: Vec<String> = dotted.split('.').map(str::to_owned).collect();
        for (index, segment) in segments.iter().enumerate() {
            if segment.is_empty() {
                return Err(PathError::EmptySegment(index));
            }
        }
        Ok(Self(segments))
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn head(&self) -> &str {
        &self.0[0]
    }

    pub fn leaf(&self) -> &str {
        self.0.last().map(String::as_str).unwrap_or_default()
    }

    /// Everything but the head segment; `None` for a single-segment path.
    pub fn strip_head(&self) -> Option<Path> {
        if self.0.len() < 2 {
            return None;
        }
        Some(Path(self.0[1..].to_vec()))
    }

    pub fn parent(&self) -> Option<Path> {
        if self.0.len() < 2 {
            return None;
        }
        Some(Path(self.0[..self.0.len() - 1].to_vec()))
    }

    /// Another leaf in the same scope.
    pub fn sibling(&self, name: &str) -> Path {
        let mut segments = self.0[..self.0.len() - 1].to_vec();
        segments.push(name.to_owned());
        Path(segments)
    }

    pub fn child(&self, name: &str) -> Path {
        let mut segments = self.0.clone();
        segments.push(name.to_owned());
        Path(segments)
    }

    /// Single-segment path for a statically-known, non-empty field name.
    pub fn field(name: &str) -> Path {
        debug_assert!(!name.is_empty() && !name.contains('.'));
        Path(vec![name.to_owned()])
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

fn is_scalar(value: &Value) -> bool {
    matches!(
        value,
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_)
    )
}

pub fn get_path<'a>(root: &'a Value, path: &Path) -> Option<&'a Value> {
    let mut current = root;
    for segment in path.segments() {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Replace the scalar leaf at `path`. Intermediate objects must already
/// exist; a missing leaf or a non-scalar slot is an error, never a silent
/// insertion.
pub fn set_path(root: &mut Value, path: &Path, new: Value) -> Result<(), StateError> {
    if !is_scalar(&new) {
        return Err(StateError::NotALeaf(path.clone()));
    }
    let mut current = root;
    let segments = path.segments();
    for segment in &segments[..segments.len() - 1] {
        current = current
            .as_object_mut()
            .and_then(|object| object.get_mut(segment.as_str()))
            .ok_or_else(|| StateError::Unresolvable(path.clone()))?;
    }
    let slot = current
        .as_object_mut()
        .and_then(|object| object.get_mut(path.leaf()))
        .ok_or_else(|| StateError::Unresolvable(path.clone()))?;
    if !is_scalar(slot) {
        return Err(StateError::NotALeaf(path.clone()));
    }
    *slot = new;
    Ok(())
}
