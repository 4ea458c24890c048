//! Huffman tree construction.

use tracing::trace;

use crate::codeword::Codeword;
use crate::error::{Error, Result};
use crate::frequency::FrequencyTable;

/// A node of the code tree. `children[0]` is the `0` branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Leaf {
        symbol: u8,
        weight: u64,
    },
    Internal {
        weight: u64,
        children: [Option<Box<Node>>; 2],
    },
}

impl Node {
    pub fn leaf(symbol: u8, weight: u64) -> Self {
        Node::Leaf { symbol, weight }
    }

    /// Join two nodes; `left` takes the `0` branch.
    pub fn merge(left: Node, right: Node) -> Self {
        Node::Internal {
            weight: left.weight() + right.weight(),
            children: [Some(Box::new(left)), Some(Box::new(right))],
        }
    }

    fn empty_internal() -> Self {
        Node::Internal {
            weight: 0,
            children: [None, None],
        }
    }

    pub fn weight(&self) -> u64 {
        match self {
            Node::Leaf { weight, .. } | Node::Internal { weight, .. } => *weight,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }

    /// Child on the given branch; always `None` for a leaf.
    pub fn child(&self, bit: bool) -> Option<&Node> {
        match self {
            Node::Leaf { .. } => None,
            Node::Internal { children, .. } => children[bit as usize].as_deref(),
        }
    }

    fn leaf_count(&self) -> usize {
        match self {
            Node::Leaf { .. } => 1,
            Node::Internal { children, .. } => children
                .iter()
                .flatten()
                .map(|child| child.leaf_count())
                .sum(),
        }
    }

    fn depth(&self) -> usize {
        match self {
            Node::Leaf { .. } => 0,
            Node::Internal { children, .. } => {
                1 + children
                    .iter()
                    .flatten()
                    .map(|child| child.depth())
                    .max()
                    .unwrap_or(0)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanTree {
    root: Node,
}

impl HuffmanTree {
    /// Build the tree by greedy merging of the two lightest nodes.
    ///
    /// The working list is kept in descending weight order, seeded from
    /// [`FrequencyTable::by_weight`]. The lightest node popped becomes the
    /// left child. A merged node is inserted after every node whose weight is
    /// at least its own, so among equal weights it is merged again first.
    pub fn build(frequencies: &FrequencyTable) -> Result<Self> {
        let mut nodes: Vec<Node> = frequencies
            .by_weight()
            .into_iter()
            .map(|(symbol, count)| Node::leaf(symbol, count))
            .collect();

        if nodes.is_empty() {
            return Err(Error::EmptyInput);
        }

        while nodes.len() > 1 {
            let left = nodes.pop().unwrap();
            let right = nodes.pop().unwrap();
            let merged = Node::merge(left, right);
            let weight = merged.weight();
            let index = nodes.partition_point(|node| node.weight() >= weight);
            trace!(weight, index, "merged nodes");
            nodes.insert(index, merged);
        }

        let root = nodes.pop().ok_or(Error::EmptyInput)?;
        Ok(HuffmanTree { root })
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn leaf_count(&self) -> usize {
        self.root.leaf_count()
    }

    /// Length of the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    /// An empty tree used as the starting point for [`HuffmanTree::place`].
    pub(crate) fn for_reconstruction() -> Self {
        HuffmanTree {
            root: Node::empty_internal(),
        }
    }

    /// Place a leaf for `symbol` at the path spelled by `codeword`, creating
    /// internal nodes on the way. Internal weights count the leaves beneath.
    pub(crate) fn place(&mut self, symbol: u8, codeword: Codeword) -> Result<()> {
        self.check_path(symbol, codeword)?;

        let mut current = &mut self.root;
        for i in (0..codeword.len()).rev() {
            let Node::Internal { weight, children } = current else {
                return Err(Error::malformed(format!(
                    "codeword {codeword} for symbol 0x{symbol:02x} runs through an existing leaf"
                )));
            };
            *weight += 1;
            let slot = &mut children[codeword.bit(i) as usize];
            if i == 0 {
                if slot.is_some() {
                    return Err(Error::malformed(format!(
                        "codeword {codeword} for symbol 0x{symbol:02x} collides with another entry"
                    )));
                }
                *slot = Some(Box::new(Node::leaf(symbol, 1)));
                return Ok(());
            }
            current = &mut **slot.get_or_insert_with(|| Box::new(Node::empty_internal()));
        }
        Err(Error::malformed(format!(
            "zero-length codeword for symbol 0x{symbol:02x}"
        )))
    }

    /// Verify `codeword` can hold a new leaf without touching the tree.
    fn check_path(&self, symbol: u8, codeword: Codeword) -> Result<()> {
        let mut current = &self.root;
        for i in (0..codeword.len()).rev() {
            if current.is_leaf() {
                return Err(Error::malformed(format!(
                    "codeword {codeword} for symbol 0x{symbol:02x} runs through an existing leaf"
                )));
            }
            match current.child(codeword.bit(i)) {
                Some(_) if i == 0 => {
                    return Err(Error::malformed(format!(
                        "codeword {codeword} for symbol 0x{symbol:02x} collides with another entry"
                    )));
                }
                Some(child) => current = child,
                None => return Ok(()),
            }
        }
        Ok(())
    }
}
