//! Error Types for the fund tracker

use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

use crate::narrative::NarrativeError;

pub type Result<T> = std::result::Result<T, TrackerError>;

/// Failures that decide whether a run aborts
#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Price unavailable: {0}")]
    PriceUnavailable(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Injection markers not found: {0}")]
    MarkersNotFound(String),

    #[error("Malformed data region: {0}")]
    MalformedDataRegion(String),

    #[error("Record date {new} is not after the last persisted date {last}")]
    DateNotAfterLast { last: NaiveDate, new: NaiveDate },

    #[error("Another update is running (lock on {} is held)", .0.display())]
    AlreadyRunning(PathBuf),

    #[error("State file {} already exists", .0.display())]
    StateExists(PathBuf),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Arithmetic overflow: {0}")]
    Overflow(String),

    #[error("Narrative generation failed: {0}")]
    Narrative(#[from] NarrativeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Why the previous holdings could not be read from the persisted page.
///
/// Never fatal: the fetcher falls back to an estimate and reports the reason.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HoldingsLookupError {
    #[error("data region markers missing")]
    MissingMarkers,

    #[error("data region malformed: {0}")]
    MalformedRegion(String),

    #[error("no persisted records")]
    EmptySequence,

    #[error("last entry unreadable: {0}")]
    MalformedEntry(#[from] EntryError),
}

/// A single record literal could not be read
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EntryError {
    #[error("entry is not a brace-delimited literal: {0}")]
    NotALiteral(String),

    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("field `{field}` has invalid number `{value}`")]
    InvalidNumber { field: &'static str, value: String },

    #[error("invalid date `{0}`")]
    InvalidDate(String),
}
