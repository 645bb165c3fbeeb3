//! Play-through statistics.
//!
//! Answer submissions are tallied synchronously in the unresolved-answer
//! log; start/completion events go through a fire-and-forget queue and are
//! only folded into the per-exploration counters when the caller drains the
//! queue with [`StatsLedger::process_pending`]. Until then the read path
//! makes no ordering promise, mirroring a background task queue.

use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};

/// Scope of one unresolved-answer tally.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RuleKey {
    pub exploration_id: String,
    pub state_name: String,
    pub handler_name: String,
    pub rule: String,
}

impl RuleKey {
    pub fn new(
        exploration_id: impl Into<String>,
        state_name: impl Into<String>,
        handler_name: impl Into<String>,
        rule: impl Into<String>,
    ) -> Self {
        Self {
            exploration_id: exploration_id.into(),
            state_name: state_name.into(),
            handler_name: handler_name.into(),
            rule: rule.into(),
        }
    }
}

/// Aggregate play counters for one exploration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaySummary {
    pub num_starts: u64,
    pub num_completions: u64,
}

/// A queued play event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatsEvent {
    ExplorationStarted { exploration_id: String },
    ExplorationCompleted { exploration_id: String },
}

impl StatsEvent {
    fn exploration_id(&self) -> &str {
        match self {
            StatsEvent::ExplorationStarted { exploration_id } => exploration_id,
            StatsEvent::ExplorationCompleted { exploration_id } => exploration_id,
        }
    }
}

/// Counters plus the unresolved-answer log.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatsLedger {
    counters: BTreeMap<String, PlaySummary>,
    answers: BTreeMap<RuleKey, BTreeMap<String, u64>>,
    #[serde(skip)]
    pending: VecDeque<StatsEvent>,
}

impl StatsLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a play event. Fire-and-forget: callers get no receipt and the
    /// counters do not move until [`process_pending`] runs.
    ///
    /// [`process_pending`]: StatsLedger::process_pending
    pub fn dispatch(&mut self, event: StatsEvent) {
        tracing::debug!(?event, "queued stats event");
        self.pending.push_back(event);
    }

    /// Drain the event queue into the counters. Returns how many events were
    /// applied.
    pub fn process_pending(&mut self) -> usize {
        let mut applied = 0;
        while let Some(event) = self.pending.pop_front() {
            let summary = self
                .counters
                .entry(event.exploration_id().to_string())
                .or_default();
            match event {
                StatsEvent::ExplorationStarted { .. } => summary.num_starts += 1,
                StatsEvent::ExplorationCompleted { .. } => summary.num_completions += 1,
            }
            applied += 1;
        }
        applied
    }

    pub fn pending_events(&self) -> usize {
        self.pending.len()
    }

    /// Counters for one exploration; zeroes when nothing was recorded.
    pub fn summary(&self, exploration_id: &str) -> PlaySummary {
        self.counters
            .get(exploration_id)
            .copied()
            .unwrap_or_default()
    }

    /// Tally one submitted answer against its rule.
    pub fn record_answer(&mut self, key: RuleKey, answer: &str) {
        *self
            .answers
            .entry(key)
            .or_default()
            .entry(answer.to_string())
            .or_insert(0) += 1;
    }

    /// Unresolved answers for one rule, mapped to occurrence counts.
    pub fn unresolved_answers(&self, key: &RuleKey) -> BTreeMap<String, u64> {
        self.answers.get(key).cloned().unwrap_or_default()
    }

    /// Remove the listed answers everywhere under `(exploration, state)`.
    /// Answers that were never submitted are skipped silently.
    pub fn resolve_answers(&mut self, exploration_id: &str, state_name: &str, answers: &[String]) {
        for (key, tallies) in &mut self.answers {
            if key.exploration_id != exploration_id || key.state_name != state_name {
                continue;
            }
            for answer in answers {
                tallies.remove(answer);
            }
        }
    }
}
