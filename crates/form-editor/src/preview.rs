//! Preview navigation: the respondent's walk through the form.
//!
//! A `Preview` owns a snapshot of the questions in respondent order, the
//! branching graph built from them, the navigation state and the answers
//! given so far. It is created fresh on every preview entry, so leaving and
//! re-entering preview always starts at the first question with no history
//! and no answers.
//!
//! Refusals are plain `false` returns; callers check `can_advance` /
//! `can_retreat` before offering an action.

use form_core::{
    Answer, AnswerRecord, AnswerSet, BranchGraph, FormDocument, Item, ItemId, answer_submission,
    is_answer_valid,
};

/// Position, back-stack and pending branch jump.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationState {
    pub current: usize,
    /// Previously visited positions, most recent last. Never contains
    /// `current`.
    pub history: Vec<usize>,
    /// Branch target chosen on the current question, taken by `next()`.
    pub pending: Option<ItemId>,
}

#[derive(Debug, Clone)]
pub struct Preview {
    questions: Vec<Item>,
    graph: BranchGraph,
    state: NavigationState,
    answers: AnswerSet,
}

impl Preview {
    pub fn new(doc: &FormDocument) -> Self {
        let questions: Vec<Item> = doc.questions().into_iter().cloned().collect();
        let graph = BranchGraph::build(&questions);
        Self {
            questions,
            graph,
            state: NavigationState::default(),
            answers: AnswerSet::new(),
        }
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    pub fn questions(&self) -> &[Item] {
        &self.questions
    }

    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    pub fn current_index(&self) -> usize {
        self.state.current
    }

    pub fn history(&self) -> &[usize] {
        &self.state.history
    }

    pub fn pending(&self) -> Option<ItemId> {
        self.state.pending
    }

    /// The question on screen; `None` for a form without questions.
    pub fn current_question(&self) -> Option<&Item> {
        self.questions.get(self.state.current)
    }

    pub fn answers(&self) -> &AnswerSet {
        &self.answers
    }

    fn is_last(&self) -> bool {
        self.state.current + 1 >= self.questions.len()
    }

    fn current_is_valid(&self) -> bool {
        self.current_question()
            .is_some_and(|q| is_answer_valid(q, self.answers.get(q.id)))
    }

    /// Where `next()` would go, ignoring validation.
    fn destination(&self) -> Option<usize> {
        if let Some(position) = self.state.pending.and_then(|id| self.graph.position_of(id)) {
            return Some(position);
        }
        (!self.is_last()).then_some(self.state.current + 1)
    }

    pub fn can_advance(&self) -> bool {
        self.current_is_valid() && self.destination().is_some()
    }

    pub fn can_retreat(&self) -> bool {
        !self.state.history.is_empty()
    }

    /// On the last question, with no branch jump outstanding and a valid
    /// answer in place.
    pub fn is_submit_eligible(&self) -> bool {
        !self.questions.is_empty()
            && self.is_last()
            && self.state.pending.is_none()
            && self.current_is_valid()
    }

    // ─── Transitions ─────────────────────────────────────────────────────

    /// Record an answer. Answering the question on screen with an mcq
    /// choice also sets or clears the pending branch jump.
    ///
    /// Returns `false` for a question not in this form.
    pub fn answer(&mut self, question: ItemId, value: Answer) -> bool {
        if self.graph.position_of(question).is_none() {
            log::trace!("answer for unknown question {question}; ignored");
            return false;
        }
        self.answers.set(question, value);
        if self.current_question().is_some_and(|q| q.id == question) {
            self.state.pending = self.pending_for_current();
        }
        true
    }

    /// Drop the answer to `question`. Clears the pending jump when that is
    /// the question on screen.
    pub fn clear_answer(&mut self, question: ItemId) -> bool {
        let Some(position) = self.graph.position_of(question) else {
            return false;
        };
        self.answers.remove(question);
        if position == self.state.current {
            self.state.pending = None;
        }
        true
    }

    /// Advance along the pending branch jump, or to the next question.
    ///
    /// Refused when the current answer is invalid or there is nowhere to go.
    /// The pending jump is consumed in the same step that takes it.
    pub fn next(&mut self) -> bool {
        if !self.current_is_valid() {
            log::trace!("next refused: question {} is not answered validly", self.state.current);
            return false;
        }
        let Some(destination) = self.destination() else {
            log::trace!("next refused: already at the last question");
            return false;
        };
        let from = self.state.current;
        self.state.history.push(from);
        // Jumping back into visited territory rewinds the back-stack there.
        if let Some(at) = self.state.history.iter().position(|&p| p == destination) {
            self.state.history.truncate(at);
        }
        self.state.current = destination;
        self.state.pending = self.pending_for_current();
        log::trace!("next: {from} → {destination}, history {:?}", self.state.history);
        true
    }

    /// Return to the previously visited question.
    pub fn previous(&mut self) -> bool {
        let Some(back) = self.state.history.pop() else {
            log::trace!("previous refused: no history");
            return false;
        };
        log::trace!("previous: {} → {back}", self.state.current);
        self.state.current = back;
        self.state.pending = self.pending_for_current();
        true
    }

    /// Back to the first question with no history and no answers.
    pub fn reset(&mut self) {
        self.state = NavigationState::default();
        self.answers.clear();
    }

    /// The answer submission, once the walk can be submitted.
    ///
    /// Only questions on the walked path are submitted, in the order they
    /// were visited. Answers to questions a later branch skipped stay stored
    /// (going back restores them) but are not sent.
    pub fn submission(&self) -> Option<Vec<AnswerRecord>> {
        if !self.is_submit_eligible() {
            return None;
        }
        let path = self
            .state
            .history
            .iter()
            .chain(std::iter::once(&self.state.current))
            .filter_map(|&position| self.questions.get(position));
        Some(answer_submission(path, &self.answers))
    }

    /// Valid branch target of the stored answer on the current question.
    fn pending_for_current(&self) -> Option<ItemId> {
        let question = self.current_question()?;
        let choice = self.answers.get(question.id)?.choice()?;
        self.graph.target(question.id, choice)
    }
}
