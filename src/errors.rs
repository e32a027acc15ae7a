//! Typed failures for the argument boundary and domain construction.
//!
//! Everything else travels as `anyhow::Error`; these two enums exist so callers
//! can tell an invalid argument or an unloadable domain apart from I/O trouble.

use std::fmt;

/// An argument rejected before any file is loaded.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgumentError {
    /// `--max-history` was zero, negative or not an integer.
    NonPositiveMaxHistory(String),
    /// `--training-fraction` was outside `(0, 1]` or not a number.
    TrainingFractionOutOfRange(String),
    /// Conversion target format is neither `json` nor `yaml`.
    UnknownFormat(String),
}

impl fmt::Display for ArgumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgumentError::NonPositiveMaxHistory(value) => write!(
                f,
                "The value of `--max-history {}` is not a positive integer.",
                value
            ),
            ArgumentError::TrainingFractionOutOfRange(value) => write!(
                f,
                "The value of `--training-fraction {}` must be greater than 0 and at most 1.",
                value
            ),
            ArgumentError::UnknownFormat(value) => write!(
                f,
                "Unsupported NLU data format '{}'. Use 'json' or 'yaml'.",
                value
            ),
        }
    }
}

impl std::error::Error for ArgumentError {}

/// A domain declaration that cannot be turned into a [`crate::domain::Domain`].
#[derive(Debug, Clone, PartialEq)]
pub enum InvalidDomain {
    /// The document root is not a mapping.
    NotAMapping,
    /// A slot has no `mappings` key (2.x style `auto_fill` slot).
    SlotWithoutMappings { slot: String },
    /// A form declares `required_slots` as a mapping of slot to mappings.
    LegacyRequiredSlots { form: String },
    /// A section has the wrong shape.
    Malformed { section: String, reason: String },
}

impl fmt::Display for InvalidDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidDomain::NotAMapping => {
                write!(f, "The domain file must contain a mapping at the top level.")
            }
            InvalidDomain::SlotWithoutMappings { slot } => write!(
                f,
                "The slot '{}' has no 'mappings' defined. Run `assistant data migrate` \
                 to update your domain to the 3.x format.",
                slot
            ),
            InvalidDomain::LegacyRequiredSlots { form } => write!(
                f,
                "The form '{}' lists 'required_slots' with slot mappings. Slot mappings \
                 belong to the slots themselves; run `assistant data migrate` to move them.",
                form
            ),
            InvalidDomain::Malformed { section, reason } => {
                write!(f, "Invalid '{}' section in domain: {}", section, reason)
            }
        }
    }
}

impl std::error::Error for InvalidDomain {}
