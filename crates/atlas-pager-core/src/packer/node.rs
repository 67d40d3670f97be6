use crate::model::{Frame, Rect};

/// Index of a node inside a [`PackTree`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
pub enum NodeState<K> {
    Empty,
    /// Holds one placed item and where its pixels are written.
    Occupied(Frame<K>),
    /// The two children exactly partition this node's region.
    Split { first: NodeId, second: NodeId },
}

/// A node of the binary space-partition tree, covering `rect`.
#[derive(Debug, Clone)]
pub struct PackNode<K> {
    pub rect: Rect,
    pub state: NodeState<K>,
}

impl<K> PackNode<K> {
    fn empty(rect: Rect) -> Self {
        Self {
            rect,
            state: NodeState::Empty,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.state, NodeState::Empty)
    }
}

/// Binary space-partition tree stored as an arena; the root is always the first node.
///
/// Placement is first-fit in depth-first pre-order. Nodes only move forward from
/// `Empty` to `Split` or `Occupied`; nothing is ever removed.
#[derive(Debug, Clone)]
pub struct PackTree<K> {
    nodes: Vec<PackNode<K>>,
}

/// Size of the item being placed, before and after padding.
struct Candidate {
    w: u32,
    h: u32,
    padded_w: u32,
    padded_h: u32,
    pad: (u32, u32),
}

impl<K: Clone> PackTree<K> {
    pub fn new(bounds: Rect) -> Self {
        Self {
            nodes: vec![PackNode::empty(bounds)],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Returns the node behind `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not handed out by this tree. Use [`PackTree::get`] for ids
    /// of unknown origin.
    pub fn node(&self, id: NodeId) -> &PackNode<K> {
        &self.nodes[id.0]
    }

    /// Returns the node behind `id`, or `None` if this tree has no such node.
    pub fn get(&self, id: NodeId) -> Option<&PackNode<K>> {
        self.nodes.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes[0].is_empty()
    }

    /// Places `key` (unpadded `w x h`) somewhere in the tree.
    ///
    /// Returns the node that became occupied, or `None` if no empty region can hold
    /// the padded size. Existing placements are never moved.
    pub fn insert(&mut self, key: &K, w: u32, h: u32, pad: (u32, u32)) -> Option<NodeId> {
        let item = candidate(w, h, pad)?;
        self.insert_at(self.root(), key, &item)
    }

    /// Read-only probe with the same success condition as [`PackTree::insert`].
    pub fn fits(&self, w: u32, h: u32, pad: (u32, u32)) -> bool {
        match candidate(w, h, pad) {
            Some(item) => self.fits_at(self.root(), item.padded_w, item.padded_h),
            None => false,
        }
    }

    /// Occupied frames in depth-first pre-order (first child before second).
    pub fn frames(&self) -> Frames<'_, K> {
        Frames {
            tree: self,
            stack: vec![self.root()],
        }
    }

    fn insert_at(&mut self, id: NodeId, key: &K, item: &Candidate) -> Option<NodeId> {
        let node = &self.nodes[id.0];
        match node.state {
            NodeState::Empty => {
                if !node.rect.can_fit(item.padded_w, item.padded_h) {
                    return None;
                }
                self.place(id, key, item)
            }
            NodeState::Occupied(_) => None,
            NodeState::Split { first, second } => self
                .insert_at(first, key, item)
                .or_else(|| self.insert_at(second, key, item)),
        }
    }

    fn fits_at(&self, id: NodeId, w: u32, h: u32) -> bool {
        let node = &self.nodes[id.0];
        match node.state {
            NodeState::Empty => node.rect.can_fit(w, h),
            NodeState::Occupied(_) => false,
            NodeState::Split { first, second } => {
                self.fits_at(first, w, h) || self.fits_at(second, w, h)
            }
        }
    }

    // Caller guarantees `id` is empty and large enough.
    fn place(&mut self, id: NodeId, key: &K, item: &Candidate) -> Option<NodeId> {
        let region = self.nodes[id.0].rect;
        if item.padded_w == region.w && item.padded_h == region.h {
            self.occupy(id, key, item);
            return Some(id);
        }

        let plan = region.choose_split(item.padded_w, item.padded_h)?;
        let (a, b) = region.apply_split(plan);
        let first = self.push(a);
        let second = self.push(b);
        self.nodes[id.0].state = NodeState::Split { first, second };

        if item.padded_w < region.w && item.padded_h < region.h {
            self.place(first, key, item)
        } else {
            // The first child already matches the padded size exactly.
            self.occupy(first, key, item);
            Some(first)
        }
    }

    fn occupy(&mut self, id: NodeId, key: &K, item: &Candidate) {
        let region = self.nodes[id.0].rect;
        let frame = Rect::new(region.x + item.pad.0, region.y + item.pad.1, item.w, item.h);
        tracing::trace!(node = id.0, x = frame.x, y = frame.y, w = frame.w, h = frame.h, "occupy");
        self.nodes[id.0].state = NodeState::Occupied(Frame {
            key: key.clone(),
            frame,
        });
    }

    fn push(&mut self, rect: Rect) -> NodeId {
        self.nodes.push(PackNode::empty(rect));
        NodeId(self.nodes.len() - 1)
    }
}

fn candidate(w: u32, h: u32, pad: (u32, u32)) -> Option<Candidate> {
    let padded_w = pad.0.checked_mul(2)?.checked_add(w)?;
    let padded_h = pad.1.checked_mul(2)?.checked_add(h)?;
    Some(Candidate {
        w,
        h,
        padded_w,
        padded_h,
        pad,
    })
}

/// Padded size of a `w x h` item, or `None` on overflow.
pub fn padded_size(w: u32, h: u32, pad: (u32, u32)) -> Option<(u32, u32)> {
    candidate(w, h, pad).map(|c| (c.padded_w, c.padded_h))
}

/// Depth-first iterator over occupied frames, see [`PackTree::frames`].
pub struct Frames<'a, K> {
    tree: &'a PackTree<K>,
    stack: Vec<NodeId>,
}

impl<'a, K> Iterator for Frames<'a, K> {
    type Item = &'a Frame<K>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(id) = self.stack.pop() {
            match &self.tree.nodes[id.0].state {
                NodeState::Empty => {}
                NodeState::Occupied(frame) => return Some(frame),
                NodeState::Split { first, second } => {
                    self.stack.push(*second);
                    self.stack.push(*first);
                }
            }
        }
        None
    }
}
