//! Flat classifier nodes as published for one classification version.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::domain::error::{DomainError, DomainResult};

/// Test code of an unconditional jump.
pub const GOTO_TEST: i32 = 20;

/// One entry of the flattened classifier graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionNode {
    pub test: i32,
    #[serde(default)]
    pub text: String,
    /// Caption of this node when it is an entry of a jump list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,
    /// First child, or the jump target of a GOTO node
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children_idx: Option<usize>,
    #[serde(default)]
    pub children_count: usize,
    /// Label used instead of `text` when the two branches are swapped
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reverse: Option<String>,
}

impl DecisionNode {
    pub fn leaf(test: i32, text: impl Into<String>) -> Self {
        Self {
            test,
            text: text.into(),
            header: None,
            children_idx: None,
            children_count: 0,
            reverse: None,
        }
    }

    pub fn branch(test: i32, text: impl Into<String>, children_idx: usize, children_count: usize) -> Self {
        Self {
            children_idx: Some(children_idx),
            children_count,
            ..Self::leaf(test, text)
        }
    }

    pub fn goto(target: usize) -> Self {
        Self::branch(GOTO_TEST, format!("Saut vers noeud {}", target), target, 1)
    }

    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    pub fn with_reverse(mut self, reverse: impl Into<String>) -> Self {
        self.reverse = Some(reverse.into());
        self
    }

    pub fn is_goto(&self) -> bool {
        self.test == GOTO_TEST
    }

    /// Structural children; empty for GOTO nodes, whose index is a jump target.
    pub fn children(&self) -> Range<usize> {
        match self.children_idx {
            Some(first) if !self.is_goto() => first..first + self.children_count,
            _ => 0..0,
        }
    }

    /// Next node along the spine: the first child, shifted by one when reversed.
    pub fn spine_next(&self) -> Option<usize> {
        if self.is_goto() {
            return None;
        }
        self.children_idx
            .map(|first| first + usize::from(self.reverse.is_some()))
    }
}

/// Immutable, validated node array of one classification version.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeStore {
    nodes: Vec<DecisionNode>,
}

impl NodeStore {
    /// Validate every child range, spine step and jump target against the array bounds.
    pub fn new(nodes: Vec<DecisionNode>) -> DomainResult<Self> {
        let len = nodes.len();
        for (idx, node) in nodes.iter().enumerate() {
            if node.is_goto() {
                match node.children_idx {
                    Some(target) if target < len => {}
                    Some(target) => {
                        return Err(DomainError::structural(
                            idx,
                            format!("jump target {} outside store of {} nodes", target, len),
                        ))
                    }
                    None => return Err(DomainError::structural(idx, "jump without target")),
                }
                continue;
            }

            if node.children_count > 0 && node.children_idx.is_none() {
                return Err(DomainError::structural(
                    idx,
                    format!("{} children declared without a first child", node.children_count),
                ));
            }
            let children = node.children();
            if children.end > len {
                return Err(DomainError::structural(
                    idx,
                    format!(
                        "children {}..{} outside store of {} nodes",
                        children.start, children.end, len
                    ),
                ));
            }
            if let Some(next) = node.spine_next() {
                if next >= len {
                    return Err(DomainError::structural(
                        idx,
                        format!("next node {} outside store of {} nodes", next, len),
                    ));
                }
            }
        }
        Ok(Self { nodes })
    }

    pub fn get(&self, idx: usize) -> DomainResult<&DecisionNode> {
        self.nodes.get(idx).ok_or_else(|| {
            DomainError::invalid_argument(format!(
                "node {} outside store of {} nodes",
                idx,
                self.nodes.len()
            ))
        })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DecisionNode> {
        self.nodes.iter()
    }
}
