//! Branching graph over the question sequence.
//!
//! Nodes are questions in respondent order. Edges are either a choice
//! override (`question, choice → target`) or the default step to the next
//! question in sequence. A choice whose target no longer names a question
//! (deleted, or pointing at itself) contributes no edge and falls back to the
//! default step.

use crate::id::ItemId;
use crate::model::Item;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Dfs, EdgeRef};
use std::collections::HashMap;

/// Why an edge exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Selecting this choice index jumps along the edge.
    Choice(usize),
    /// Default "next in sequence".
    Sequence,
}

#[derive(Debug, Clone, Default)]
pub struct BranchGraph {
    graph: DiGraph<ItemId, Transition>,
    /// Question id → node. Node indices equal sequence positions.
    nodes: HashMap<ItemId, NodeIndex>,
}

impl BranchGraph {
    /// Build the graph for `questions`, given in respondent order.
    pub fn build<'a>(questions: impl IntoIterator<Item = &'a Item>) -> Self {
        let questions: Vec<&Item> = questions.into_iter().collect();
        let mut graph = DiGraph::with_capacity(questions.len(), questions.len());
        let mut nodes = HashMap::with_capacity(questions.len());
        for question in &questions {
            let idx = graph.add_node(question.id);
            nodes.insert(question.id, idx);
        }

        for (position, question) in questions.iter().enumerate() {
            let from = NodeIndex::new(position);
            let choices = question.choices();
            let mut falls_through = choices.is_empty();
            for (choice_index, choice) in choices.iter().enumerate() {
                match choice.target.and_then(|t| nodes.get(&t).copied()) {
                    Some(to) if to != from => {
                        graph.add_edge(from, to, Transition::Choice(choice_index));
                    }
                    Some(_) => {
                        log::warn!(
                            "choice {choice_index} of {} targets itself; using default order",
                            question.id
                        );
                        falls_through = true;
                    }
                    None => {
                        if let Some(target) = choice.target {
                            log::warn!(
                                "choice {choice_index} of {} targets missing question {target}; using default order",
                                question.id
                            );
                        }
                        falls_through = true;
                    }
                }
            }
            if falls_through && position + 1 < questions.len() {
                graph.add_edge(from, NodeIndex::new(position + 1), Transition::Sequence);
            }
        }

        Self { graph, nodes }
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Sequence position of a question.
    pub fn position_of(&self, question: ItemId) -> Option<usize> {
        self.nodes.get(&question).map(|idx| idx.index())
    }

    /// Question at a sequence position.
    pub fn question_at(&self, position: usize) -> Option<ItemId> {
        self.graph.node_weight(NodeIndex::new(position)).copied()
    }

    /// The valid jump target for choosing `choice` on `question`, if any.
    pub fn target(&self, question: ItemId, choice: usize) -> Option<ItemId> {
        let from = *self.nodes.get(&question)?;
        self.graph
            .edges(from)
            .find(|edge| *edge.weight() == Transition::Choice(choice))
            .map(|edge| self.graph[edge.target()])
    }

    /// Position reached from `position` when `choice` is selected there
    /// (`None` choice for non-mcq questions). `None` at the end of the form.
    pub fn step(&self, position: usize, choice: Option<usize>) -> Option<usize> {
        let question = self.question_at(position)?;
        if let Some(target) = choice.and_then(|c| self.target(question, c)) {
            return self.position_of(target);
        }
        (position + 1 < self.len()).then_some(position + 1)
    }

    /// Questions that no respondent path from the first question can reach.
    pub fn unreachable(&self) -> Vec<ItemId> {
        if self.is_empty() {
            return Vec::new();
        }
        let mut seen = vec![false; self.len()];
        let mut dfs = Dfs::new(&self.graph, NodeIndex::new(0));
        while let Some(idx) = dfs.next(&self.graph) {
            seen[idx.index()] = true;
        }
        self.graph
            .node_indices()
            .filter(|idx| !seen[idx.index()])
            .map(|idx| self.graph[idx])
            .collect()
    }

    /// Choice edges that jump backwards in the sequence (possible loops).
    pub fn backward_jumps(&self) -> Vec<(ItemId, usize, ItemId)> {
        self.graph
            .edge_references()
            .filter_map(|edge| match *edge.weight() {
                Transition::Choice(choice) if edge.target() < edge.source() => Some((
                    self.graph[edge.source()],
                    choice,
                    self.graph[edge.target()],
                )),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Choice;
    use pretty_assertions::assert_eq;

    fn abc() -> Vec<Item> {
        vec![
            Item::mcq(
                ItemId::intern("br_a"),
                vec![
                    Choice::branching_to("yes", ItemId::intern("br_c")),
                    Choice::new("no"),
                ],
            ),
            Item::text(ItemId::intern("br_b")),
            Item::text(ItemId::intern("br_c")),
        ]
    }

    #[test]
    fn choice_edges_and_default_order() {
        let questions = abc();
        let graph = BranchGraph::build(&questions);
        assert_eq!(graph.len(), 3);
        assert_eq!(graph.target(ItemId::intern("br_a"), 0), Some(ItemId::intern("br_c")));
        assert_eq!(graph.target(ItemId::intern("br_a"), 1), None);
        assert_eq!(graph.step(0, Some(0)), Some(2));
        assert_eq!(graph.step(0, Some(1)), Some(1));
        assert_eq!(graph.step(1, None), Some(2));
        assert_eq!(graph.step(2, None), None);
    }

    #[test]
    fn dangling_target_falls_back_to_sequence() {
        let questions = vec![
            Item::mcq(
                ItemId::intern("br_d1"),
                vec![Choice::branching_to("go", ItemId::intern("br_deleted"))],
            ),
            Item::text(ItemId::intern("br_d2")),
        ];
        let graph = BranchGraph::build(&questions);
        assert_eq!(graph.target(ItemId::intern("br_d1"), 0), None);
        assert_eq!(graph.step(0, Some(0)), Some(1));
        assert!(graph.unreachable().is_empty());
    }

    #[test]
    fn fully_branched_question_can_strand_the_next_one() {
        let questions = vec![
            Item::mcq(
                ItemId::intern("br_u1"),
                vec![Choice::branching_to("skip", ItemId::intern("br_u3"))],
            ),
            Item::text(ItemId::intern("br_u2")),
            Item::text(ItemId::intern("br_u3")),
        ];
        let graph = BranchGraph::build(&questions);
        assert_eq!(graph.unreachable(), vec![ItemId::intern("br_u2")]);
    }

    #[test]
    fn backward_jumps_are_reported() {
        let questions = vec![
            Item::text(ItemId::intern("br_l1")),
            Item::mcq(
                ItemId::intern("br_l2"),
                vec![
                    Choice::branching_to("again", ItemId::intern("br_l1")),
                    Choice::new("done"),
                ],
            ),
        ];
        let graph = BranchGraph::build(&questions);
        assert_eq!(
            graph.backward_jumps(),
            vec![(ItemId::intern("br_l2"), 0, ItemId::intern("br_l1"))]
        );
    }
}
