//! Typed, validated options for the validate and split commands.

use std::fmt;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::str::FromStr;

use super::defaults::{default_max_history, default_training_fraction};
use crate::errors::ArgumentError;

/// Number of past turns a dialogue state window covers. Always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct MaxHistory(NonZeroUsize);

impl MaxHistory {
    pub fn new(value: usize) -> Result<Self, ArgumentError> {
        NonZeroUsize::new(value)
            .map(Self)
            .ok_or_else(|| ArgumentError::NonPositiveMaxHistory(value.to_string()))
    }

    pub fn get(self) -> usize {
        self.0.get()
    }
}

impl Default for MaxHistory {
    fn default() -> Self {
        Self::new(default_max_history()).unwrap_or(Self(NonZeroUsize::MIN))
    }
}

impl FromStr for MaxHistory {
    type Err = ArgumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.parse::<usize>() {
            Ok(value) => Self::new(value)
                .map_err(|_| ArgumentError::NonPositiveMaxHistory(trimmed.to_string())),
            Err(_) => Err(ArgumentError::NonPositiveMaxHistory(trimmed.to_string())),
        }
    }
}

impl fmt::Display for MaxHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Share of each group that goes to the training side, in `(0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct TrainingFraction(f64);

impl TrainingFraction {
    pub fn new(value: f64) -> Result<Self, ArgumentError> {
        if value.is_finite() && value > 0.0 && value <= 1.0 {
            Ok(Self(value))
        } else {
            Err(ArgumentError::TrainingFractionOutOfRange(value.to_string()))
        }
    }

    pub fn get(self) -> f64 {
        self.0
    }

    /// Training share of a group of `size` items, rounded half away from zero.
    pub fn train_count(self, size: usize) -> usize {
        let count = (self.0 * size as f64).round() as usize;
        count.min(size)
    }
}

impl Default for TrainingFraction {
    fn default() -> Self {
        Self(default_training_fraction())
    }
}

impl FromStr for TrainingFraction {
    type Err = ArgumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        trimmed
            .parse::<f64>()
            .map_err(|_| ArgumentError::TrainingFractionOutOfRange(trimmed.to_string()))
            .and_then(Self::new)
    }
}

impl fmt::Display for TrainingFraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Everything `data validate` needs, resolved and checked up front.
#[derive(Debug, Clone)]
pub struct ValidateOptions {
    pub domain: PathBuf,
    pub data: Vec<PathBuf>,
    pub config: Option<PathBuf>,
    pub max_history: Option<MaxHistory>,
    pub fail_on_warnings: bool,
    pub stories_only: bool,
}

impl ValidateOptions {
    pub fn new(domain: PathBuf) -> Self {
        Self {
            domain,
            data: Vec::new(),
            config: None,
            max_history: None,
            fail_on_warnings: false,
            stories_only: false,
        }
    }

    pub fn with_data(mut self, data: Vec<PathBuf>) -> Self {
        self.data = data;
        self
    }

    pub fn with_config(mut self, config: impl Into<PathBuf>) -> Self {
        self.config = Some(config.into());
        self
    }

    pub fn with_max_history(mut self, max_history: MaxHistory) -> Self {
        self.max_history = Some(max_history);
        self
    }

    pub fn fail_on_warnings(mut self, fail: bool) -> Self {
        self.fail_on_warnings = fail;
        self
    }

    pub fn stories_only(mut self, stories_only: bool) -> Self {
        self.stories_only = stories_only;
        self
    }

    /// The part of the options the validator itself consumes.
    pub fn settings(&self) -> ValidationSettings {
        ValidationSettings {
            fail_on_warnings: self.fail_on_warnings,
            max_history: self.max_history,
            stories_only: self.stories_only,
        }
    }
}

/// Validator configuration independent of where the data came from.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidationSettings {
    /// Promote warnings to failures.
    pub fail_on_warnings: bool,
    /// Window for story conflict detection; falls back to the config's policies.
    pub max_history: Option<MaxHistory>,
    /// Only check story structure (the `data validate stories` mode).
    pub stories_only: bool,
}
