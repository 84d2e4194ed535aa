use std;

/// A tree (or forest). Each node stores a T.
/// Nodes are stored in a flat array and referenced by indices. Links use
/// `NONE` (-1) for "no parent/child/sibling", which is also how they are
/// written out.
pub struct Tree<T> {
    nodes: Vec<Node<T>>,
}

pub type NodeIdx = i32;
pub const NONE: NodeIdx = -1;

struct Node<T> {
    val: T,
    parent: NodeIdx,
    first_child: NodeIdx,
    next_sibling: NodeIdx,
    prev_sibling: NodeIdx,
}

impl<T> Tree<T> {
    pub fn new() -> Tree<T> {
        Tree { nodes: vec![] }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn add_node(&mut self, val: T) -> NodeIdx {
        self.nodes.push(Node {
            val,
            parent: NONE,
            first_child: NONE,
            next_sibling: NONE,
            prev_sibling: NONE,
        });
        (self.nodes.len() - 1) as NodeIdx
    }

    /// Makes `children` the child list of `parent`, in the given order.
    /// Sibling links are chained through the slice; the first child has no
    /// previous sibling and the last has no next one.
    pub fn link_children(&mut self, parent: NodeIdx, children: &[NodeIdx]) {
        self.nodes[parent as usize].first_child =
            children.first().cloned().unwrap_or(NONE);

        for (i, &child) in children.iter().enumerate() {
            let prev = if i == 0 { NONE } else { children[i - 1] };
            let next = children.get(i + 1).cloned().unwrap_or(NONE);
            let node = &mut self.nodes[child as usize];
            node.parent = parent;
            node.prev_sibling = prev;
            node.next_sibling = next;
        }
    }

    pub fn parent(&self, node: NodeIdx) -> NodeIdx {
        self.nodes[node as usize].parent
    }

    pub fn first_child(&self, node: NodeIdx) -> NodeIdx {
        self.nodes[node as usize].first_child
    }

    pub fn next_sibling(&self, node: NodeIdx) -> NodeIdx {
        self.nodes[node as usize].next_sibling
    }

    pub fn prev_sibling(&self, node: NodeIdx) -> NodeIdx {
        self.nodes[node as usize].prev_sibling
    }

    // Iterator over all nodes indices (in insertion order).
    pub fn node_idxs(&self) -> std::ops::Range<NodeIdx> {
        0..self.nodes.len() as NodeIdx
    }

    pub fn values<'a>(&'a self) -> impl Iterator<Item=&'a T> + 'a {
        self.nodes.iter().map(|node| &node.val)
    }

    pub fn values_mut<'a>(&'a mut self) -> impl Iterator<Item=&'a mut T> + 'a {
        self.nodes.iter_mut().map(|node| &mut node.val)
    }
}

impl<T> std::ops::Index<NodeIdx> for Tree<T> {
    type Output = T;

    fn index(&self, node: NodeIdx) -> &T {
        &self.nodes[node as usize].val
    }
}

impl<T> std::ops::IndexMut<NodeIdx> for Tree<T> {
    fn index_mut(&mut self, node: NodeIdx) -> &mut T {
        &mut self.nodes[node as usize].val
    }
}

#[test]
fn test() {
    let mut tree = Tree::new();
    let root = tree.add_node("root");
    let a = tree.add_node("a");
    let b = tree.add_node("b");
    let c = tree.add_node("c");
    let d = tree.add_node("d");
    tree.link_children(root, &[a, b, c]);
    tree.link_children(b, &[d]);

    assert_eq!(tree.first_child(root), a);
    assert_eq!(tree.next_sibling(b), c);
    assert_eq!(tree.prev_sibling(a), NONE);
    assert_eq!(tree.next_sibling(a), b);
    assert_eq!(tree.prev_sibling(c), b);
    assert_eq!(tree.next_sibling(c), NONE);
    assert_eq!(tree.parent(d), b);
    assert_eq!(tree.first_child(d), NONE);
    assert_eq!(tree.parent(root), NONE);
    assert_eq!(tree[d], "d");
}
