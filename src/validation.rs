//! Findings, severities and the verdict of a validation run.
//!
//! Every check produces [`Finding`]s tagged with a [`FindingKind`]; the kind
//! fixes both the severity and the stage the finding belongs to, so consumers
//! can match on kinds instead of message text.

use colored::Colorize;
use std::fmt;

/// Stage of a validation run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ValidationCategory {
    /// Duplicate names across the loaded files
    Duplicates,
    /// Domain declarations and their references
    Domain,
    /// Stories and rules
    Dialogue,
    /// NLU examples
    Nlu,
    /// Assistant configuration file
    Config,
}

impl fmt::Display for ValidationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Duplicates => write!(f, "Duplicates"),
            Self::Domain => write!(f, "Domain"),
            Self::Dialogue => write!(f, "Dialogue"),
            Self::Nlu => write!(f, "NLU"),
            Self::Config => write!(f, "Config"),
        }
    }
}

/// Severity level for findings
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Informational message, never affects the verdict
    Info,
    /// Advisory; fails the run only with `--fail-on-warnings`
    Warning,
    /// Structural problem; always fails the run
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FindingKind {
    DuplicateName,
    EmptyDomain,
    /// Passed through unchanged from the domain parser.
    DomainWarning,
    UnknownAction,
    UnknownForm,
    FormSlotsNotMatching,
    SlotMappingUnknownForm,
    SlotMappingNotRequired,
    UnknownIntentInStory,
    UnknownUtterance,
    UnusedIntent,
    UnusedUtterance,
    StoryConflict,
    NluIntentNotInDomain,
    IntentWithoutExamples,
    DuplicateExample,
    UnknownEntity,
    MissingAssistantId,
    PlaceholderAssistantId,
    DeprecatedPolicy,
}

impl FindingKind {
    pub fn severity(self) -> Severity {
        use FindingKind::*;
        match self {
            DuplicateName
            | EmptyDomain
            | UnknownAction
            | UnknownForm
            | UnknownIntentInStory
            | FormSlotsNotMatching
            | SlotMappingUnknownForm
            | SlotMappingNotRequired => Severity::Error,
            UnusedIntent | UnusedUtterance | IntentWithoutExamples => Severity::Info,
            DomainWarning
            | UnknownUtterance
            | StoryConflict
            | NluIntentNotInDomain
            | DuplicateExample
            | UnknownEntity
            | MissingAssistantId
            | PlaceholderAssistantId
            | DeprecatedPolicy => Severity::Warning,
        }
    }

    pub fn category(self) -> ValidationCategory {
        use FindingKind::*;
        match self {
            DuplicateName => ValidationCategory::Duplicates,
            EmptyDomain
            | DomainWarning
            | UnknownAction
            | UnknownForm
            | FormSlotsNotMatching
            | SlotMappingUnknownForm
            | SlotMappingNotRequired => ValidationCategory::Domain,
            UnknownIntentInStory | UnknownUtterance | UnusedIntent | UnusedUtterance
            | StoryConflict => ValidationCategory::Dialogue,
            NluIntentNotInDomain | IntentWithoutExamples | DuplicateExample | UnknownEntity => {
                ValidationCategory::Nlu
            }
            MissingAssistantId | PlaceholderAssistantId | DeprecatedPolicy => {
                ValidationCategory::Config
            }
        }
    }

    /// Stable kebab-case tag, e.g. `unknown-action`.
    pub fn tag(self) -> &'static str {
        use FindingKind::*;
        match self {
            DuplicateName => "duplicate-name",
            EmptyDomain => "empty-domain",
            DomainWarning => "domain-warning",
            UnknownAction => "unknown-action",
            UnknownForm => "unknown-form",
            FormSlotsNotMatching => "form-slots-not-matching",
            SlotMappingUnknownForm => "slot-mapping-unknown-form",
            SlotMappingNotRequired => "slot-mapping-not-required",
            UnknownIntentInStory => "unknown-intent",
            UnknownUtterance => "unknown-utterance",
            UnusedIntent => "unused-intent",
            UnusedUtterance => "unused-utterance",
            StoryConflict => "story-conflict",
            NluIntentNotInDomain => "nlu-intent-not-in-domain",
            IntentWithoutExamples => "intent-without-examples",
            DuplicateExample => "duplicate-example",
            UnknownEntity => "unknown-entity",
            MissingAssistantId => "missing-assistant-id",
            PlaceholderAssistantId => "placeholder-assistant-id",
            DeprecatedPolicy => "deprecated-policy",
        }
    }
}

impl fmt::Display for FindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A single problem found by the validator
#[derive(Debug, Clone, PartialEq)]
pub struct Finding {
    pub severity: Severity,
    pub kind: FindingKind,
    /// Name of the item the finding is about (intent, story, slot, file…)
    pub subject: String,
    pub message: String,
    /// Optional hint for fixing the problem
    pub suggestion: Option<String>,
}

impl Finding {
    pub fn new(kind: FindingKind, subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: kind.severity(),
            kind,
            subject: subject.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Display the finding with colored output
    pub fn display(&self) {
        let icon = match self.severity {
            Severity::Info => "ℹ".blue(),
            Severity::Warning => "⚠".yellow(),
            Severity::Error => "✗".red(),
        };

        println!(
            "  {} {} [{}]: {}",
            icon,
            self.subject.cyan(),
            self.kind,
            self.message
        );

        if let Some(ref suggestion) = self.suggestion {
            println!("      {} {}", "→".cyan(), suggestion);
        }
    }
}

/// Outcome of a validation run.
#[derive(Debug, Clone, Default)]
pub struct Verdict {
    /// In the order the checks ran
    pub findings: Vec<Finding>,
    pub fail_on_warnings: bool,
}

impl Verdict {
    pub fn new(fail_on_warnings: bool) -> Self {
        Self {
            findings: Vec::new(),
            fail_on_warnings,
        }
    }

    pub fn push(&mut self, finding: Finding) {
        self.findings.push(finding);
    }

    pub fn extend(&mut self, findings: impl IntoIterator<Item = Finding>) {
        self.findings.extend(findings);
    }

    pub fn has_errors(&self) -> bool {
        self.count(Severity::Error) > 0
    }

    pub fn has_warnings(&self) -> bool {
        self.count(Severity::Warning) > 0
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.findings.iter().filter(|f| f.severity == severity).count()
    }

    /// Findings of one kind, in order.
    pub fn of_kind(&self, kind: FindingKind) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(move |f| f.kind == kind)
    }

    pub fn contains(&self, kind: FindingKind) -> bool {
        self.of_kind(kind).next().is_some()
    }

    /// Errors always fail; warnings fail only when promoted.
    pub fn is_ok(&self) -> bool {
        !self.has_errors() && !(self.fail_on_warnings && self.has_warnings())
    }

    pub fn exit_code(&self) -> i32 {
        if self.is_ok() {
            0
        } else {
            1
        }
    }

    /// Print every finding, grouped under its stage heading.
    pub fn display(&self) {
        let mut current = None;
        for finding in &self.findings {
            let category = finding.kind.category();
            if current != Some(category) {
                println!("{}", category.to_string().bold());
                current = Some(category);
            }
            finding.display();
        }
    }

    /// Display a summary of the verdict
    pub fn display_summary(&self) {
        println!();
        println!("{}", "━".repeat(60).cyan());

        let status_icon = if self.is_ok() {
            "✓".green()
        } else {
            "✗".red()
        };
        println!(
            "{} Validation: {}",
            status_icon,
            if self.is_ok() { "passed" } else { "failed" }
        );

        let error_count = self.count(Severity::Error);
        let warning_count = self.count(Severity::Warning);

        if error_count > 0 || warning_count > 0 {
            print!("  ");
            if error_count > 0 {
                print!(
                    "{} {}",
                    error_count,
                    if error_count == 1 { "error" } else { "errors" }.red()
                );
            }
            if error_count > 0 && warning_count > 0 {
                print!(", ");
            }
            if warning_count > 0 {
                print!(
                    "{} {}",
                    warning_count,
                    if warning_count == 1 {
                        "warning"
                    } else {
                        "warnings"
                    }
                    .yellow()
                );
            }
            if self.fail_on_warnings && warning_count > 0 {
                print!(" {}", "(warnings treated as errors)".dimmed());
            }
            println!();
        }

        println!("{}", "━".repeat(60).cyan());
    }
}
