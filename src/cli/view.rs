//! Terminal rendering of reconstructed trees.

use chrono::NaiveDate;
use termtree::Tree;

use crate::application::CollapseSet;
use crate::cli::output;
use crate::domain::DisplayNode;

/// Conversion of display nodes into printable trees.
pub trait TreeNodeConvert {
    fn to_tree_string(&self) -> Tree<String>;

    /// Like `to_tree_string`, hiding the children of collapsed nodes.
    fn to_collapsed_tree(&self, version: NaiveDate, collapse: &CollapseSet) -> Tree<String>;
}

fn node_line(node: &DisplayNode) -> String {
    let mut line = format!("[{}] {}", node.id, output::segments(&node.label));
    if !node.aliases.is_empty() {
        line.push_str(&format!(" (+{})", node.aliases.join(", ")));
    }
    line
}

impl TreeNodeConvert for DisplayNode {
    fn to_tree_string(&self) -> Tree<String> {
        let leaves: Vec<_> = self.children.iter().map(|c| c.to_tree_string()).collect();
        Tree::new(node_line(self)).with_leaves(leaves)
    }

    fn to_collapsed_tree(&self, version: NaiveDate, collapse: &CollapseSet) -> Tree<String> {
        if !self.children.is_empty() && collapse.is_collapsed(version, &self.id) {
            let hidden = self.node_count() - 1;
            return Tree::new(format!("{} [{} hidden]", node_line(self), hidden));
        }
        let leaves: Vec<_> = self
            .children
            .iter()
            .map(|c| c.to_collapsed_tree(version, collapse))
            .collect();
        Tree::new(node_line(self)).with_leaves(leaves)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{reconstruct, DecisionNode, NodeStore};

    fn forest() -> Vec<DisplayNode> {
        let store = NodeStore::new(vec![
            DecisionNode::branch(1, "Test 01C03", 1, 2),
            DecisionNode::leaf(0, "Erreur"),
            DecisionNode::branch(2, "Acte", 3, 2),
            DecisionNode::leaf(0, "B"),
            DecisionNode::leaf(0, "C"),
        ])
        .unwrap();
        reconstruct(&store, 0, &[]).unwrap()
    }

    #[test]
    fn test_collapsed_node_hides_children() {
        colored::control::set_override(false);
        let version = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let forest = forest();
        let collapse = CollapseSet::new();
        collapse.collapse(version, "2");

        let full = forest[0].to_tree_string().to_string();
        let folded = forest[0].to_collapsed_tree(version, &collapse).to_string();

        assert!(full.contains("[4] C"));
        assert!(!folded.contains("[4] C"));
        assert!(folded.contains("[2] Acte [1 hidden]"));
        assert!(folded.starts_with("[0] Test 01C03"));
    }
}
