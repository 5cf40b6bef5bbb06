//! Arena-backed stylesheet nodes.

/// Handle to a node inside a [`Stylesheet`].
///
/// Handles are only meaningful for the stylesheet that created them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Position of the node in the arena.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Node type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Root,
    Rule,
    AtRule,
    Declaration,
    Comment,
}

/// Raw formatting fragments kept for lossless serialization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Raws {
    /// Whitespace (and stray semicolons) before the node.
    pub before: String,
    /// Whitespace between a selector or at-rule params and `{` / `;`.
    pub between: String,
    /// Whitespace before the closing `}` of a block, or after a declaration value.
    pub after: String,
    /// Whitespace between an at-rule name and its params.
    pub after_name: String,
    /// Whether the statement was terminated with `;`.
    pub semicolon: bool,
}

/// Style rule: `selector { ... }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub selector: String,
}

/// At-rule: `@name params;` or `@name params { ... }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtRule {
    pub name: String,
    pub params: String,
    pub has_block: bool,
}

/// Declaration: `property: value !important`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub property: String,
    /// Raw text between the property and the value, including the colon.
    pub between: String,
    /// Value with embedded comments removed.
    pub value: String,
    /// Original value text when it contained comments.
    pub raw_value: Option<String>,
    /// Raw importance marker including leading whitespace, e.g. ` !important`.
    pub important: Option<String>,
}

impl Declaration {
    /// Create a declaration with default `: ` spacing.
    #[must_use]
    pub fn new(property: impl Into<String>, value: impl Into<String>) -> Self {
        let mut decl = Self {
            property: property.into(),
            between: ": ".to_owned(),
            value: String::new(),
            raw_value: None,
            important: None,
        };
        decl.set_raw_value(value);
        decl
    }

    /// Value as written, preferring the raw form with comments.
    #[must_use]
    pub fn value_text(&self) -> &str {
        self.raw_value.as_deref().unwrap_or(&self.value)
    }

    /// Replace the value, dropping any preserved raw form.
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.raw_value = None;
    }

    /// Replace the value with text that may contain comments.
    ///
    /// The comment-free form is derived and the raw text is kept only when
    /// the two differ.
    pub fn set_raw_value(&mut self, raw: impl Into<String>) {
        let raw = raw.into();
        let stripped = strip_comments(&raw);
        if stripped == raw {
            self.value = raw;
            self.raw_value = None;
        } else {
            self.value = stripped;
            self.raw_value = Some(raw);
        }
    }
}

/// Remove `/* ... */` comments and trim the result.
fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("/*") {
        out.push_str(&rest[..start]);
        match rest[start + 2..].find("*/") {
            Some(end) => rest = &rest[start + 2 + end + 2..],
            None => {
                rest = "";
                break;
            }
        }
    }
    out.push_str(rest);
    out.trim().to_owned()
}

/// Comment: `/* text */`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    /// Text between the comment delimiters, untrimmed.
    pub text: String,
}

/// Node payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    Root,
    Rule(Rule),
    AtRule(AtRule),
    Declaration(Declaration),
    Comment(Comment),
}

impl NodeData {
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Root => NodeKind::Root,
            Self::Rule(_) => NodeKind::Rule,
            Self::AtRule(_) => NodeKind::AtRule,
            Self::Declaration(_) => NodeKind::Declaration,
            Self::Comment(_) => NodeKind::Comment,
        }
    }
}

/// A node stored in the arena.
#[derive(Debug, Clone)]
pub struct Node {
    pub data: NodeData,
    pub raws: Raws,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Stylesheet tree stored as an arena of nodes.
///
/// Removed nodes stay in the arena (so handles held elsewhere remain valid)
/// but are detached from their parent and skipped by serialization.
#[derive(Debug, Clone)]
pub struct Stylesheet {
    nodes: Vec<Node>,
}

impl Default for Stylesheet {
    fn default() -> Self {
        Self::new()
    }
}

impl Stylesheet {
    /// Create an empty stylesheet containing only the root node.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                data: NodeData::Root,
                raws: Raws::default(),
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    #[must_use]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    #[must_use]
    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.node(id).data.kind()
    }

    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// Append a new node as the last child of `parent`.
    pub fn append(&mut self, parent: NodeId, data: NodeData, raws: Raws) -> NodeId {
        let id = self.alloc(Some(parent), data, raws);
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Insert a new node immediately before `anchor`.
    ///
    /// Returns `None` if `anchor` has no parent (the root or a removed node).
    pub fn insert_before(&mut self, anchor: NodeId, data: NodeData, raws: Raws) -> Option<NodeId> {
        let parent = self.parent(anchor)?;
        let position = self.position(parent, anchor)?;
        let id = self.alloc(Some(parent), data, raws);
        self.nodes[parent.0].children.insert(position, id);
        Some(id)
    }

    /// Copy the top-level nodes of `fragment` (with their descendants) in
    /// front of `anchor`.
    ///
    /// Returns the handles of every inserted node, descendants included.
    pub fn graft_before(&mut self, anchor: NodeId, fragment: &Stylesheet) -> Vec<NodeId> {
        let mut inserted = Vec::new();
        for &child in fragment.children(fragment.root()) {
            let source = fragment.node(child);
            let Some(id) = self.insert_before(anchor, source.data.clone(), source.raws.clone())
            else {
                break;
            };
            inserted.push(id);
            self.copy_children(fragment, child, id, &mut inserted);
        }
        inserted
    }

    fn copy_children(
        &mut self,
        fragment: &Stylesheet,
        from: NodeId,
        to: NodeId,
        inserted: &mut Vec<NodeId>,
    ) {
        for &child in fragment.children(from) {
            let source = fragment.node(child);
            let id = self.append(to, source.data.clone(), source.raws.clone());
            inserted.push(id);
            self.copy_children(fragment, child, id, inserted);
        }
    }

    /// Detach a node from its parent.
    pub fn remove(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|&child| child != id);
        }
    }

    /// Deepest last descendant of `id`, or `id` itself when it has no children.
    #[must_use]
    pub fn last_descendant(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(&last) = self.children(current).last() {
            current = last;
        }
        current
    }

    /// Whether no later sibling has the same node kind.
    #[must_use]
    pub fn is_last_of_kind(&self, id: NodeId) -> bool {
        let Some(parent) = self.parent(id) else {
            return true;
        };
        let kind = self.kind(id);
        let siblings = self.children(parent);
        let Some(position) = siblings.iter().position(|&sibling| sibling == id) else {
            return true;
        };
        !siblings[position + 1..]
            .iter()
            .any(|&sibling| self.kind(sibling) == kind)
    }

    #[must_use]
    pub fn rule(&self, id: NodeId) -> Option<&Rule> {
        match &self.node(id).data {
            NodeData::Rule(rule) => Some(rule),
            _ => None,
        }
    }

    pub fn rule_mut(&mut self, id: NodeId) -> Option<&mut Rule> {
        match &mut self.node_mut(id).data {
            NodeData::Rule(rule) => Some(rule),
            _ => None,
        }
    }

    #[must_use]
    pub fn at_rule(&self, id: NodeId) -> Option<&AtRule> {
        match &self.node(id).data {
            NodeData::AtRule(at_rule) => Some(at_rule),
            _ => None,
        }
    }

    pub fn at_rule_mut(&mut self, id: NodeId) -> Option<&mut AtRule> {
        match &mut self.node_mut(id).data {
            NodeData::AtRule(at_rule) => Some(at_rule),
            _ => None,
        }
    }

    #[must_use]
    pub fn declaration(&self, id: NodeId) -> Option<&Declaration> {
        match &self.node(id).data {
            NodeData::Declaration(decl) => Some(decl),
            _ => None,
        }
    }

    pub fn declaration_mut(&mut self, id: NodeId) -> Option<&mut Declaration> {
        match &mut self.node_mut(id).data {
            NodeData::Declaration(decl) => Some(decl),
            _ => None,
        }
    }

    #[must_use]
    pub fn comment(&self, id: NodeId) -> Option<&Comment> {
        match &self.node(id).data {
            NodeData::Comment(comment) => Some(comment),
            _ => None,
        }
    }

    fn alloc(&mut self, parent: Option<NodeId>, data: NodeData, raws: Raws) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            data,
            raws,
            parent,
            children: Vec::new(),
        });
        id
    }

    fn position(&self, parent: NodeId, child: NodeId) -> Option<usize> {
        self.children(parent).iter().position(|&c| c == child)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(sheet: &mut Stylesheet, parent: NodeId, selector: &str) -> NodeId {
        sheet.append(
            parent,
            NodeData::Rule(Rule {
                selector: selector.to_owned(),
            }),
            Raws::default(),
        )
    }

    fn decl(sheet: &mut Stylesheet, parent: NodeId, property: &str, value: &str) -> NodeId {
        sheet.append(
            parent,
            NodeData::Declaration(Declaration::new(property, value)),
            Raws::default(),
        )
    }

    #[test]
    fn test_append_and_navigate() {
        let mut sheet = Stylesheet::new();
        let root = sheet.root();
        let a = rule(&mut sheet, root, ".a");
        let left = decl(&mut sheet, a, "left", "0");

        assert_eq!(sheet.children(root), &[a]);
        assert_eq!(sheet.parent(left), Some(a));
        assert_eq!(sheet.kind(left), NodeKind::Declaration);
        assert_eq!(sheet.rule(a).unwrap().selector, ".a");
    }

    #[test]
    fn test_remove_detaches_subtree() {
        let mut sheet = Stylesheet::new();
        let root = sheet.root();
        let a = rule(&mut sheet, root, ".a");
        let left = decl(&mut sheet, a, "left", "0");

        sheet.remove(a);

        assert!(sheet.children(root).is_empty());
        assert_eq!(sheet.parent(a), None);
        // Handles stay valid after removal
        assert_eq!(sheet.declaration(left).unwrap().property, "left");
    }

    #[test]
    fn test_is_last_of_kind_ignores_other_kinds() {
        let mut sheet = Stylesheet::new();
        let root = sheet.root();
        let a = rule(&mut sheet, root, ".a");
        let first = decl(&mut sheet, a, "left", "0");
        let second = decl(&mut sheet, a, "color", "red");
        let nested = rule(&mut sheet, a, ".b");

        assert!(!sheet.is_last_of_kind(first));
        assert!(sheet.is_last_of_kind(second));
        assert!(sheet.is_last_of_kind(nested));
    }

    #[test]
    fn test_last_descendant() {
        let mut sheet = Stylesheet::new();
        let root = sheet.root();
        let a = rule(&mut sheet, root, ".a");
        let empty = rule(&mut sheet, root, ".empty");
        decl(&mut sheet, a, "left", "0");
        let last = decl(&mut sheet, a, "right", "0");

        assert_eq!(sheet.last_descendant(a), last);
        assert_eq!(sheet.last_descendant(empty), empty);
        assert_eq!(sheet.last_descendant(root), empty);
    }

    #[test]
    fn test_insert_before() {
        let mut sheet = Stylesheet::new();
        let root = sheet.root();
        let b = rule(&mut sheet, root, ".b");
        let a = sheet
            .insert_before(
                b,
                NodeData::Rule(Rule {
                    selector: ".a".to_owned(),
                }),
                Raws::default(),
            )
            .unwrap();

        assert_eq!(sheet.children(root), &[a, b]);
        assert!(sheet.insert_before(root, NodeData::Root, Raws::default()).is_none());
    }

    #[test]
    fn test_set_raw_value_keeps_comments() {
        let mut decl = Declaration::new("left", "1px");
        assert_eq!(decl.raw_value, None);

        decl.set_raw_value("1px /* note */");
        assert_eq!(decl.value, "1px");
        assert_eq!(decl.value_text(), "1px /* note */");

        decl.set_value("2px");
        assert_eq!(decl.value_text(), "2px");
    }
}
