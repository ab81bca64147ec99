//! Arena-based storage for the document tree.
//!
//! All nodes live in a single `Vec` and refer to each other through 4-byte
//! indices. Structural edits rewire the index links; detached subtrees stay
//! allocated for the lifetime of the arena and are simply unreachable from
//! the root. That matches the ownership story of the crate: the arena owns
//! every node ever created, selections only hold indices.
//!
//! ```text
//! Arena: Vec<DomNode>
//!        [Node0][Node1][Node2]...
//!         parent/children are NodeId indices, not pointers
//! ```

use crate::error::{DomError, Result};
use crate::types::{DomNode, NodeId, NodeType};

#[derive(Debug, Default)]
pub struct DomArena {
    /// All nodes stored sequentially.
    nodes: Vec<DomNode>,

    /// Root node ID (if set).
    root_id: Option<NodeId>,
}

impl DomArena {
    pub fn new() -> Self {
        Self {
            nodes: Vec::with_capacity(64),
            root_id: None,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            root_id: None,
        }
    }

    /// Creates a detached node, returns its ID.
    pub fn alloc(&mut self, node_type: NodeType, name: impl Into<String>) -> NodeId {
        let node_id = self.nodes.len() as NodeId;
        self.nodes.push(DomNode::new(node_id, node_type, name));
        node_id
    }

    pub fn get(&self, node_id: NodeId) -> Result<&DomNode> {
        self.nodes
            .get(node_id as usize)
            .ok_or(DomError::NodeNotFound(node_id))
    }

    pub fn get_mut(&mut self, node_id: NodeId) -> Result<&mut DomNode> {
        self.nodes
            .get_mut(node_id as usize)
            .ok_or(DomError::NodeNotFound(node_id))
    }

    pub fn set_root(&mut self, node_id: NodeId) -> Result<()> {
        self.get(node_id)?;
        self.root_id = Some(node_id);
        Ok(())
    }

    pub fn root_id(&self) -> Option<NodeId> {
        self.root_id
    }

    /// Total number of nodes ever allocated, detached ones included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(|i| i as NodeId)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DomNode> {
        self.nodes.iter()
    }

    pub fn parent(&self, node_id: NodeId) -> Result<Option<NodeId>> {
        Ok(self.get(node_id)?.parent_id)
    }

    /// Detaches a node from its parent. A node without a parent is left
    /// untouched.
    pub fn detach(&mut self, node_id: NodeId) -> Result<()> {
        let parent_id = self.get(node_id)?.parent_id;
        if let Some(parent_id) = parent_id {
            let parent = self.get_mut(parent_id)?;
            if let Some(pos) = parent.children_ids.iter().position(|&c| c == node_id) {
                parent.children_ids.remove(pos);
            }
            self.get_mut(node_id)?.parent_id = None;
        }
        Ok(())
    }

    /// Appends `child` as the last child of `parent`, detaching it from any
    /// previous parent first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.get(parent)?;
        self.detach(child)?;
        self.get_mut(child)?.parent_id = Some(parent);
        self.get_mut(parent)?.children_ids.push(child);
        Ok(())
    }

    /// Inserts `child` as the first child of `parent`.
    pub fn insert_first(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.get(parent)?;
        self.detach(child)?;
        self.get_mut(child)?.parent_id = Some(parent);
        self.get_mut(parent)?.children_ids.insert(0, child);
        Ok(())
    }

    /// Orphans every child of `node_id`.
    pub fn remove_children(&mut self, node_id: NodeId) -> Result<()> {
        let children = std::mem::take(&mut self.get_mut(node_id)?.children_ids);
        for child in children {
            self.get_mut(child)?.parent_id = None;
        }
        Ok(())
    }

    /// Deep-copies a subtree. The copy is fully independent and detached.
    pub fn clone_subtree(&mut self, source: NodeId) -> Result<NodeId> {
        self.get(source)?;

        let mut copied_root = None;
        let mut work = vec![(source, None::<NodeId>)];

        while let Some((src, new_parent)) = work.pop() {
            let (node_type, name, value, attributes, children) = {
                let node = self.get(src)?;
                (
                    node.node_type,
                    node.name.clone(),
                    node.value.clone(),
                    node.attributes.clone(),
                    node.children_ids.clone(),
                )
            };

            let copy = self.alloc(node_type, name);
            {
                let node = self.get_mut(copy)?;
                node.value = value;
                node.attributes = attributes;
            }

            match new_parent {
                Some(parent) => self.append_child(parent, copy)?,
                None => copied_root = Some(copy),
            }

            // Reversed push so the stack pops children left-to-right.
            for &child in children.iter().rev() {
                work.push((child, Some(copy)));
            }
        }

        copied_root.ok_or(DomError::NodeNotFound(source))
    }

    /// Depth-first pre-order traversal (iterative, no recursion).
    pub fn traverse_df<F>(&self, start: NodeId, mut visit: F) -> Result<()>
    where
        F: FnMut(NodeId, &DomNode) -> Result<()>,
    {
        let mut stack = vec![start];

        while let Some(node_id) = stack.pop() {
            let node = self.get(node_id)?;
            visit(node_id, node)?;

            for &child_id in node.children_ids.iter().rev() {
                stack.push(child_id);
            }
        }

        Ok(())
    }

    /// Every node below `start` in document order, `start` excluded.
    pub fn descendants(&self, start: NodeId) -> Result<Vec<NodeId>> {
        let mut out = Vec::new();
        self.traverse_df(start, |node_id, _| {
            if node_id != start {
                out.push(node_id);
            }
            Ok(())
        })?;
        Ok(out)
    }

    /// Ancestor chain, nearest parent first.
    pub fn ancestors(&self, node_id: NodeId) -> Result<Vec<NodeId>> {
        let mut out = Vec::new();
        let mut current = self.get(node_id)?.parent_id;
        while let Some(parent_id) = current {
            out.push(parent_id);
            current = self.get(parent_id)?.parent_id;
        }
        Ok(out)
    }

    /// Concatenated text of every text node in the subtree.
    pub fn text_content(&self, node_id: NodeId) -> Result<String> {
        let mut text = String::new();
        self.traverse_df(node_id, |_, node| {
            if node.node_type == NodeType::Text {
                text.push_str(&node.value);
            }
            Ok(())
        })?;
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(arena: &mut DomArena, tag: &str) -> NodeId {
        arena.alloc(NodeType::Element, tag)
    }

    #[test]
    fn alloc_and_get() {
        let mut arena = DomArena::new();
        let id = element(&mut arena, "div");
        assert_eq!(id, 0);
        assert_eq!(arena.get(id).unwrap().name, "div");
        assert!(arena.get(99).is_err());
    }

    #[test]
    fn append_and_insert_order() {
        let mut arena = DomArena::new();
        let root = element(&mut arena, "ul");
        let a = element(&mut arena, "li");
        let b = element(&mut arena, "li");
        let c = element(&mut arena, "li");

        arena.append_child(root, a).unwrap();
        arena.append_child(root, b).unwrap();
        arena.insert_first(root, c).unwrap();

        let children: Vec<NodeId> = arena.get(root).unwrap().children_ids.to_vec();
        assert_eq!(children, vec![c, a, b]);
        assert_eq!(arena.parent(a).unwrap(), Some(root));
    }

    #[test]
    fn append_reparents() {
        let mut arena = DomArena::new();
        let first = element(&mut arena, "div");
        let second = element(&mut arena, "div");
        let child = element(&mut arena, "span");

        arena.append_child(first, child).unwrap();
        arena.append_child(second, child).unwrap();

        assert!(arena.get(first).unwrap().children_ids.is_empty());
        assert_eq!(arena.get(second).unwrap().children_ids.to_vec(), vec![child]);
        assert_eq!(arena.parent(child).unwrap(), Some(second));
    }

    #[test]
    fn remove_children_orphans() {
        let mut arena = DomArena::new();
        let root = element(&mut arena, "div");
        let child = element(&mut arena, "span");
        arena.append_child(root, child).unwrap();

        arena.remove_children(root).unwrap();
        assert!(arena.get(root).unwrap().children_ids.is_empty());
        assert_eq!(arena.parent(child).unwrap(), None);
    }

    #[test]
    fn clone_subtree_is_independent() {
        let mut arena = DomArena::new();
        let root = element(&mut arena, "div");
        let child = element(&mut arena, "span");
        arena.get_mut(child).unwrap().set_attr("class", "orig");
        arena.append_child(root, child).unwrap();

        let copy = arena.clone_subtree(root).unwrap();
        assert_ne!(copy, root);
        assert_eq!(arena.parent(copy).unwrap(), None);

        let copy_child = arena.get(copy).unwrap().children_ids[0];
        arena.get_mut(copy_child).unwrap().set_attr("class", "copy");
        assert_eq!(arena.get(child).unwrap().attr("class"), Some("orig"));
    }

    #[test]
    fn traverse_is_document_order() {
        let mut arena = DomArena::new();
        let root = element(&mut arena, "div");
        let first = element(&mut arena, "span");
        let second = element(&mut arena, "b");
        let nested = element(&mut arena, "i");
        arena.append_child(root, first).unwrap();
        arena.append_child(first, nested).unwrap();
        arena.append_child(root, second).unwrap();

        let mut visited = Vec::new();
        arena
            .traverse_df(root, |_, node| {
                visited.push(node.name.clone());
                Ok(())
            })
            .unwrap();
        assert_eq!(visited, vec!["div", "span", "i", "b"]);

        assert_eq!(arena.descendants(root).unwrap(), vec![first, nested, second]);
        assert_eq!(arena.ancestors(nested).unwrap(), vec![first, root]);
    }

    #[test]
    fn text_content_concatenates() {
        let mut arena = DomArena::new();
        let root = element(&mut arena, "p");
        let hello = arena.alloc(NodeType::Text, "#text");
        arena.get_mut(hello).unwrap().value = "hello ".to_string();
        let bold = element(&mut arena, "b");
        let world = arena.alloc(NodeType::Text, "#text");
        arena.get_mut(world).unwrap().value = "world".to_string();

        arena.append_child(root, hello).unwrap();
        arena.append_child(root, bold).unwrap();
        arena.append_child(bold, world).unwrap();

        assert_eq!(arena.text_content(root).unwrap(), "hello world");
    }
}
