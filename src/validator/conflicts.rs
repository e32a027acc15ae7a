//! Story structure conflicts.
//!
//! Each story is replayed into a sequence of tracker states, one per action
//! prediction. Two stories conflict when the last `max_history` states before a
//! prediction are identical but the predicted actions differ.

use std::collections::{BTreeMap, HashMap};

use crate::dialogue::{Step, StoryBlock};

const ACTION_LISTEN: &str = "action_listen";

/// What the dialogue policy sees before predicting an action.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
struct TrackerState {
    prev_action: Option<String>,
    intent: Option<String>,
    active_loop: Option<String>,
    slots: BTreeMap<String, String>,
}

/// Same context, different predictions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    /// Latest user intent in the shared context.
    pub intent: Option<String>,
    /// `(action, story)` pairs, in the order the stories were given.
    pub predictions: Vec<(String, String)>,
}

impl Conflict {
    pub fn message(&self) -> String {
        let mut message = match &self.intent {
            Some(intent) => format!("Story structure conflict after intent '{}':", intent),
            None => "Story structure conflict at the start of the conversation:".to_string(),
        };
        for (action, story) in &self.predictions {
            message.push_str(&format!("\n  {} predicted in '{}'", action, story));
        }
        message
    }
}

struct Replay<'a> {
    story: &'a str,
    max_history: usize,
    state: TrackerState,
    history: Vec<TrackerState>,
}

impl<'a> Replay<'a> {
    fn new(story: &'a str, max_history: usize) -> Self {
        Self {
            story,
            max_history,
            state: TrackerState::default(),
            history: Vec::new(),
        }
    }

    fn predict(&mut self, action: &str, seen: &mut Predictions) {
        self.history.push(self.state.clone());
        let start = self.history.len().saturating_sub(self.max_history);
        seen.record(self.history[start..].to_vec(), action, self.story);
        self.state.prev_action = Some(action.to_string());
    }

    fn apply(&mut self, step: &Step, seen: &mut Predictions) {
        match step {
            Step::Intent { name, .. } => self.user_turn(name.clone(), seen),
            Step::UserText(text) => self.user_turn(text.clone(), seen),
            Step::Action(action) | Step::BotText(action) => self.predict(action, seen),
            Step::ActiveLoop(form) => self.state.active_loop = form.clone(),
            Step::SlotWasSet(slots) => {
                self.state.slots.extend(slots.iter().cloned());
            }
            Step::Checkpoint(_) => {}
            Step::Or(alternatives) => {
                if let Some(first) = alternatives.first() {
                    self.apply(first, seen);
                }
            }
        }
    }

    /// A bot turn that ends without an explicit listen predicts `action_listen`.
    fn user_turn(&mut self, intent: String, seen: &mut Predictions) {
        let after_bot = matches!(
            self.state.prev_action.as_deref(),
            Some(prev) if prev != ACTION_LISTEN
        );
        if after_bot {
            self.predict(ACTION_LISTEN, seen);
        }
        self.state.intent = Some(intent);
        self.state.prev_action = Some(ACTION_LISTEN.to_string());
    }
}

#[derive(Default)]
struct Predictions {
    index: HashMap<Vec<TrackerState>, usize>,
    windows: Vec<(Vec<TrackerState>, Vec<(String, String)>)>,
}

impl Predictions {
    fn record(&mut self, window: Vec<TrackerState>, action: &str, story: &str) {
        let slot = match self.index.get(&window) {
            Some(&slot) => slot,
            None => {
                self.index.insert(window.clone(), self.windows.len());
                self.windows.push((window, Vec::new()));
                self.windows.len() - 1
            }
        };
        let prediction = (action.to_string(), story.to_string());
        let predictions = &mut self.windows[slot].1;
        if !predictions.contains(&prediction) {
            predictions.push(prediction);
        }
    }
}

/// Find conflicting predictions across `stories`.
///
/// Checkpoints are ignored and an `or` step contributes its first alternative.
pub fn find_conflicts<'a>(
    stories: impl IntoIterator<Item = &'a StoryBlock>,
    max_history: usize,
) -> Vec<Conflict> {
    let mut seen = Predictions::default();
    for story in stories {
        let mut replay = Replay::new(&story.name, max_history);
        for step in &story.steps {
            replay.apply(step, &mut seen);
        }
    }

    seen.windows
        .into_iter()
        .filter(|(_, predictions)| {
            predictions
                .iter()
                .any(|(action, _)| *action != predictions[0].0)
        })
        .map(|(window, predictions)| Conflict {
            intent: window.last().and_then(|state| state.intent.clone()),
            predictions,
        })
        .collect()
}
