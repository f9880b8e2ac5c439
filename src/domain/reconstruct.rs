//! Display tree reconstruction from the flat classifier graph.
//!
//! The classifier is a sequence of tests: each node's first child is the
//! "otherwise" continuation and the following children are the branches taken
//! when the test matches. Reconstruction walks that continuation (the spine) of
//! a start node, renders every spine node at the same level, and recurses into
//! branches with the rest of the spine as context. GOTO nodes that return to
//! the caller's next step are hidden, jump lists become one entry per target,
//! and chains of tests jumping to the same outcome are merged into one entry.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace};

use crate::domain::error::DomainResult;
use crate::domain::node::NodeStore;
use crate::domain::xref::{scan, segments_text, LinkKind, Segment};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Leaf,
    Parent,
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Node of a reconstructed tree, ready for a presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayNode {
    /// Classifier index, or a synthetic `"<index>-<n>"` id
    pub id: String,
    pub label: Vec<Segment>,
    pub kind: NodeKind,
    /// Sole entry of a branch, shown inline with its parent
    #[serde(default, skip_serializing_if = "is_false")]
    pub direct: bool,
    /// Ids of merged alternative tests
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    /// Set on synthetic leaves standing for an already displayed node
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jump_target: Option<usize>,
    pub children: Vec<DisplayNode>,
}

impl DisplayNode {
    fn new(id: impl ToString, text: &str) -> Self {
        Self {
            id: id.to_string(),
            label: scan(text),
            kind: NodeKind::Leaf,
            direct: false,
            aliases: Vec::new(),
            jump_target: None,
            children: Vec::new(),
        }
    }

    fn jump(id: String, target: usize) -> Self {
        Self {
            label: vec![
                Segment::text("jump to "),
                Segment::Link {
                    kind: LinkKind::Node,
                    id: target.to_string(),
                    text: format!("node {}", target),
                },
            ],
            jump_target: Some(target),
            ..Self::new(id, "")
        }
    }

    /// Append an alternative test as an extra label line.
    fn push_line(&mut self, id: usize, text: &str) {
        self.label.push(Segment::text("\n"));
        self.label.extend(scan(text));
        self.aliases.push(id.to_string());
    }

    /// Attach the result of one branch; a branch made of a single node is inlined.
    fn attach(&mut self, mut branch: Vec<DisplayNode>) {
        if let [only] = branch.as_mut_slice() {
            only.direct = only.children.iter().all(|c| c.direct);
        }
        self.children.extend(branch);
        self.kind = if self.children.iter().any(|c| !c.direct) {
            NodeKind::Parent
        } else {
            NodeKind::Leaf
        };
    }

    /// Label as plain text, OR-chain lines separated by `\n`.
    pub fn label_text(&self) -> String {
        segments_text(&self.label)
    }

    pub fn answers_to(&self, id: &str) -> bool {
        self.id == id || self.aliases.iter().any(|a| a == id)
    }

    /// Ids from this node down to the node answering to `id`, both included.
    pub fn find_path(&self, id: &str) -> Option<Vec<String>> {
        if self.answers_to(id) {
            return Some(vec![self.id.clone()]);
        }
        self.children.iter().find_map(|child| {
            child.find_path(id).map(|mut path| {
                path.insert(0, self.id.clone());
                path
            })
        })
    }

    /// Number of nodes in this subtree, this node included.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(DisplayNode::node_count).sum::<usize>()
    }
}

/// Ids from a forest root down to the node answering to `id`.
pub fn find_path(forest: &[DisplayNode], id: &str) -> Option<Vec<String>> {
    forest.iter().find_map(|node| node.find_path(id))
}

/// Spine of one reconstruction level and how far it has been rendered.
struct Frame<'a> {
    spine: &'a [usize],
    /// Position of the next unrendered spine entry
    cursor: usize,
    parent: Option<&'a Frame<'a>>,
}

impl Frame<'_> {
    fn next_step(&self) -> Option<usize> {
        self.spine.get(self.cursor).copied()
    }
}

/// How a node index relates to the levels being rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reentry {
    /// Natural fall-through to an enclosing level's next step
    Return,
    /// Back-edge into a node rendered elsewhere
    Jump,
}

fn reentry(frame: &Frame<'_>, target: usize) -> Option<Reentry> {
    let mut current = Some(frame);
    while let Some(f) = current {
        if f.spine.contains(&target) {
            return Some(if f.next_step() == Some(target) {
                Reentry::Return
            } else {
                Reentry::Jump
            });
        }
        current = f.parent;
    }
    None
}

/// Allocates `"<node>-<n>"` ids, unique per owner within one reconstruction.
#[derive(Default)]
struct SyntheticIds {
    last: HashMap<usize, usize>,
}

impl SyntheticIds {
    /// Next free id of `owner`; the first `reserved` numbers belong to its jump-list entries.
    fn next(&mut self, owner: usize, reserved: usize) -> String {
        let n = self.last.entry(owner).or_insert(reserved);
        *n += 1;
        format!("{}-{}", owner, n)
    }
}

/// Rebuilds display trees from one version's node store.
pub struct TreeReconstructor<'a> {
    store: &'a NodeStore,
}

impl<'a> TreeReconstructor<'a> {
    pub fn new(store: &'a NodeStore) -> Self {
        Self { store }
    }

    /// Reconstruct the subtree starting at `start`.
    ///
    /// `continuation` lists the nodes the caller renders after this subtree; a
    /// GOTO to its first entry ends the subtree, and reaching any of its other
    /// entries yields a "jump to node" leaf instead of rendering them twice.
    #[instrument(level = "debug", skip(self))]
    pub fn reconstruct(&self, start: usize, continuation: &[usize]) -> DomainResult<Vec<DisplayNode>> {
        self.store.get(start)?;
        let root = Frame {
            spine: continuation,
            cursor: 0,
            parent: None,
        };
        let forest = self.walk(start, &root, &mut SyntheticIds::default())?;
        debug!(start, roots = forest.len(), "reconstructed classifier tree");
        Ok(forest)
    }

    /// Follow first children from `start` until a GOTO, a leaf, or a node
    /// already on this or an enclosing spine.
    fn spine(&self, start: usize, parent: &Frame<'_>) -> DomainResult<Vec<usize>> {
        let mut spine = vec![start];
        let mut idx = start;
        while let Some(next) = self.store.get(idx)?.spine_next() {
            if spine.contains(&next) || reentry(parent, next).is_some() {
                break;
            }
            spine.push(next);
            idx = next;
        }
        trace!(?spine, "walked spine");
        Ok(spine)
    }

    /// Jump-list entries after the first, which own the ids `"<node>-1"` onwards.
    fn reserved_ids(&self, idx: usize) -> DomainResult<usize> {
        let node = self.store.get(idx)?;
        let children = node.children();
        if children.len() > 2 && self.store.get(children.start + 1)?.header.is_some() {
            Ok(children.len() - 2)
        } else {
            Ok(0)
        }
    }

    fn walk(&self, start: usize, parent: &Frame<'_>, ids: &mut SyntheticIds) -> DomainResult<Vec<DisplayNode>> {
        let store = self.store;
        let spine = self.spine(start, parent)?;
        let mut out = Vec::new();

        let mut i = 0;
        while i < spine.len() {
            let idx = spine[i];
            let node = store.get(idx)?;
            i += 1;

            if node.is_goto() && node.children_idx == parent.next_step() {
                break;
            }

            let frame = Frame {
                spine: &spine,
                cursor: i,
                parent: Some(parent),
            };
            let children = node.children();

            if children.len() > 2 && store.get(children.start + 1)?.header.is_some() {
                for j in 1..children.len() {
                    let entry = store.get(children.start + j)?;
                    let id = if j > 1 {
                        format!("{}-{}", idx, j - 1)
                    } else {
                        idx.to_string()
                    };
                    let text = format!("{} {}", node.text, entry.header.as_deref().unwrap_or_default());
                    let mut display = DisplayNode::new(id, &text);
                    display.attach(self.descend(idx, children.start + j, &frame, ids)?);
                    out.push(display);
                }
            } else if children.len() == 2 && node.reverse.is_some() {
                let text = node.reverse.as_deref().unwrap_or_default();
                let mut display = DisplayNode::new(idx, text);
                display.attach(self.descend(idx, children.start, &frame, ids)?);
                out.push(display);
            } else if children.len() == 2 {
                let target = children.start + 1;
                let branch = self.descend(idx, target, &frame, ids)?;
                let mut display = DisplayNode::new(idx, &node.text);

                // Tests whose matching branch jumps to the same outcome are alternatives
                while let Some(&next_idx) = spine.get(i) {
                    let next = store.get(next_idx)?;
                    let next_children = next.children();
                    if next_children.len() != 2 || next.reverse.is_some() {
                        break;
                    }
                    let matched = store.get(next_children.start + 1)?;
                    if !(matched.is_goto() && matched.children_idx == Some(target)) {
                        break;
                    }
                    trace!(node = idx, alternative = next_idx, "merged OR chain");
                    display.push_line(next_idx, &next.text);
                    i += 1;
                }

                display.attach(branch);
                out.push(display);
            } else {
                let mut display = DisplayNode::new(idx, &node.text);
                for child in children.skip(1) {
                    display.attach(self.descend(idx, child, &frame, ids)?);
                }
                out.push(display);
            }

            // An OR-chain may have consumed the rest of the spine
            if i == spine.len() {
                let last = spine[i - 1];
                if let Some(next) = store.get(last)?.spine_next() {
                    let back_edge = if spine.contains(&next) {
                        Some(Reentry::Jump)
                    } else {
                        reentry(parent, next)
                    };
                    if back_edge == Some(Reentry::Jump) {
                        debug!(node = last, target = next, "back-edge replaced by jump");
                        let id = ids.next(last, self.reserved_ids(last)?);
                        out.push(DisplayNode::jump(id, next));
                    }
                }
            }
        }

        Ok(out)
    }

    /// Reconstruct a branch of `owner`.
    ///
    /// A branch falling through to an enclosing level's next step is empty; one
    /// re-entering any other node of a level being rendered becomes a jump leaf.
    fn descend(
        &self,
        owner: usize,
        child: usize,
        frame: &Frame<'_>,
        ids: &mut SyntheticIds,
    ) -> DomainResult<Vec<DisplayNode>> {
        match reentry(frame, child) {
            Some(Reentry::Return) => {
                trace!(node = owner, target = child, "branch returns to caller");
                Ok(Vec::new())
            }
            Some(Reentry::Jump) => {
                debug!(node = owner, target = child, "branch re-enters rendered level");
                let id = ids.next(owner, self.reserved_ids(owner)?);
                Ok(vec![DisplayNode::jump(id, child)])
            }
            None => self.walk(child, frame, ids),
        }
    }
}

/// Reconstruct the display tree of `store` from `start`.
pub fn reconstruct(store: &NodeStore, start: usize, continuation: &[usize]) -> DomainResult<Vec<DisplayNode>> {
    TreeReconstructor::new(store).reconstruct(start, continuation)
}
