//! Cell value classification and the expandable tree shown for nested values.

use std::collections::HashSet;
use std::fmt;

use serde_json::Value;

const IMAGE_EXTENSIONS: [&str; 6] = [".jpeg", ".jpg", ".gif", ".png", ".webp", ".svg"];

/// How a JSON value is presented in a cell.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderNode {
    Empty,
    ScalarText(String),
    Boolean(bool),
    Link(String),
    Image(String),
    List(Vec<RenderNode>),
    Map(Vec<(String, RenderNode)>),
}

/// Classify `value` for rendering. Total over all JSON values.
pub fn classify(value: &Value) -> RenderNode {
    match value {
        Value::Null => RenderNode::Empty,
        Value::Bool(flag) => RenderNode::Boolean(*flag),
        Value::Number(number) => RenderNode::ScalarText(number.to_string()),
        Value::String(text) => classify_text(text),
        Value::Array(items) => RenderNode::List(items.iter().map(classify).collect()),
        Value::Object(fields) => RenderNode::Map(
            fields
                .iter()
                .map(|(key, value)| (key.clone(), classify(value)))
                .collect(),
        ),
    }
}

fn classify_text(text: &str) -> RenderNode {
    let lowered = text.to_ascii_lowercase();
    if !(lowered.starts_with("http://") || lowered.starts_with("https://")) {
        return RenderNode::ScalarText(text.to_string());
    }
    if IMAGE_EXTENSIONS.iter().any(|extension| lowered.ends_with(extension)) {
        RenderNode::Image(text.to_string())
    } else {
        RenderNode::Link(text.to_string())
    }
}

impl RenderNode {
    /// Lists (even empty ones) and non-empty maps hide their children until expanded.
    pub fn is_collapsible(&self) -> bool {
        match self {
            RenderNode::List(_) => true,
            RenderNode::Map(fields) => !fields.is_empty(),
            _ => false,
        }
    }

    /// Single-line text for this node when its children are not shown.
    pub fn summary(&self) -> String {
        match self {
            RenderNode::Empty => "-".to_string(),
            RenderNode::ScalarText(text) | RenderNode::Link(text) | RenderNode::Image(text) => text.clone(),
            RenderNode::Boolean(flag) => flag.to_string(),
            RenderNode::List(items) if items.is_empty() => "[]".to_string(),
            RenderNode::List(items) => plural(items.len(), "item"),
            RenderNode::Map(fields) if fields.is_empty() => "{}".to_string(),
            RenderNode::Map(fields) => plural(fields.len(), "field"),
        }
    }

    fn child(&self, segment: &PathSegment) -> Option<&RenderNode> {
        match (self, segment) {
            (RenderNode::List(items), PathSegment::Index(index)) => items.get(*index),
            (RenderNode::Map(fields), PathSegment::Key(key)) => {
                fields.iter().find(|(field, _)| field == key).map(|(_, node)| node)
            }
            _ => None,
        }
    }

    /// The node reached by following `path` from here.
    pub fn descendant(&self, path: &NodePath) -> Option<&RenderNode> {
        path.segments().iter().try_fold(self, |node, segment| node.child(segment))
    }
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("1 {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Index(usize),
    Key(String),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Index(index) => write!(f, "[{index}]"),
            PathSegment::Key(key) => write!(f, ".{key}"),
        }
    }
}

/// Location of a node below a cell's root value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NodePath(Vec<PathSegment>);

impl NodePath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn join(&self, segment: PathSegment) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment);
        Self(segments)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("$")?;
        self.0.iter().try_for_each(|segment| write!(f, "{segment}"))
    }
}

/// A table cell: row index in fetched order plus column key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CellId {
    pub row: usize,
    pub column: String,
}

impl CellId {
    pub fn new(row: usize, column: impl Into<String>) -> Self {
        Self {
            row,
            column: column.into(),
        }
    }
}

/// Expanded flags for collapsible nodes. Everything starts collapsed.
#[derive(Debug, Clone, Default)]
pub struct ExpansionState {
    expanded: HashSet<(CellId, NodePath)>,
}

impl ExpansionState {
    pub fn is_expanded(&self, cell: &CellId, path: &NodePath) -> bool {
        self.expanded.contains(&(cell.clone(), path.clone()))
    }

    /// Flip one node and return its new state. Children keep their own flags,
    /// so re-expanding a parent restores what was open beneath it.
    pub fn toggle(&mut self, cell: &CellId, path: &NodePath) -> bool {
        let key = (cell.clone(), path.clone());
        if self.expanded.remove(&key) {
            false
        } else {
            self.expanded.insert(key);
            true
        }
    }

    pub fn clear(&mut self) {
        self.expanded.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.expanded.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disclosure {
    None,
    Collapsed,
    Expanded,
}

impl Disclosure {
    pub fn marker(self) -> &'static str {
        match self {
            Disclosure::None => " ",
            Disclosure::Collapsed => "▸",
            Disclosure::Expanded => "▾",
        }
    }
}

/// One visible line of a flattened tree.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeLine {
    pub depth: usize,
    pub path: NodePath,
    /// Field name for map entries; list items and the root have none.
    pub label: Option<String>,
    pub text: String,
    pub disclosure: Disclosure,
    pub kind: LineKind,
}

/// Styling hint for front ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Muted,
    Text,
    True,
    False,
    Link,
    Image,
    Composite,
}

impl LineKind {
    fn of(node: &RenderNode) -> Self {
        match node {
            RenderNode::Empty => LineKind::Muted,
            RenderNode::ScalarText(_) => LineKind::Text,
            RenderNode::Boolean(true) => LineKind::True,
            RenderNode::Boolean(false) => LineKind::False,
            RenderNode::Link(_) => LineKind::Link,
            RenderNode::Image(_) => LineKind::Image,
            RenderNode::List(items) if items.is_empty() => LineKind::Muted,
            RenderNode::Map(fields) if fields.is_empty() => LineKind::Muted,
            RenderNode::List(_) | RenderNode::Map(_) => LineKind::Composite,
        }
    }
}

/// Lay out the visible part of `node` for `cell` as indented lines.
///
/// The root is always the first line. An expanded node contributes one line
/// per child at the next depth; a collapsed one contributes nothing beyond its
/// own line. An expanded empty list shows a single `[]` line.
pub fn flatten_tree(node: &RenderNode, expansion: &ExpansionState, cell: &CellId) -> Vec<TreeLine> {
    let mut lines = Vec::new();
    push_node(node, None, NodePath::root(), expansion, cell, &mut lines);
    lines
}

fn push_node(
    node: &RenderNode,
    label: Option<String>,
    path: NodePath,
    expansion: &ExpansionState,
    cell: &CellId,
    lines: &mut Vec<TreeLine>,
) {
    let depth = path.depth();
    let expanded = node.is_collapsible() && expansion.is_expanded(cell, &path);
    let disclosure = match (node.is_collapsible(), expanded) {
        (false, _) => Disclosure::None,
        (true, false) => Disclosure::Collapsed,
        (true, true) => Disclosure::Expanded,
    };
    lines.push(TreeLine {
        depth,
        path: path.clone(),
        label,
        text: node.summary(),
        disclosure,
        kind: LineKind::of(node),
    });
    if !expanded {
        return;
    }

    match node {
        RenderNode::List(items) if items.is_empty() => lines.push(TreeLine {
            depth: depth + 1,
            path: path.clone(),
            label: None,
            text: "[]".to_string(),
            disclosure: Disclosure::None,
            kind: LineKind::Muted,
        }),
        RenderNode::List(items) => {
            for (index, item) in items.iter().enumerate() {
                push_node(item, None, path.join(PathSegment::Index(index)), expansion, cell, lines);
            }
        }
        RenderNode::Map(fields) => {
            for (key, value) in fields {
                let child_path = path.join(PathSegment::Key(key.clone()));
                push_node(value, Some(key.clone()), child_path, expansion, cell, lines);
            }
        }
        _ => {}
    }
}

/// Text for a table cell: the value's summary, prefixed with a disclosure
/// marker when the value can be expanded in the detail pane.
pub fn cell_text(value: &Value) -> String {
    let node = classify(value);
    if node.is_collapsible() {
        format!("{} {}", Disclosure::Collapsed.marker(), node.summary())
    } else {
        node.summary()
    }
}
