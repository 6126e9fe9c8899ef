//! Tagged results for collaborators that never raise.
//!
//! Extractors and LLM adapters absorb their failures instead of propagating them. [`Outcome`]
//! keeps the difference between "nothing there" and "the call failed" visible to callers and
//! tests, while [`Outcome::unwrap_or_default`] collapses both into the empty value the pipeline
//! works with.

/// Result of a collaborator call that is not allowed to fail the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// The call produced usable data.
    Value(T),
    /// The call succeeded but produced nothing.
    Empty,
    /// The call failed; the reason is kept for logging and inspection.
    Failed(String),
}

impl<T> Outcome<T> {
    /// Returns `true` when the call produced data.
    pub fn is_value(&self) -> bool {
        matches!(self, Self::Value(_))
    }

    /// Returns `true` when the call succeeded without producing data.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Returns `true` when the call failed.
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Failure reason, if any.
    pub fn failure(&self) -> Option<&str> {
        match self {
            Self::Failed(reason) => Some(reason),
            _ => None,
        }
    }

    /// Discard the empty/failed distinction.
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Value(value) => Some(value),
            Self::Empty | Self::Failed(_) => None,
        }
    }

    /// Produce the value, or `T::default()` for both empty and failed outcomes.
    pub fn unwrap_or_default(self) -> T
    where
        T: Default,
    {
        self.into_option().unwrap_or_default()
    }
}

impl Outcome<String> {
    /// Wrap text, treating whitespace-only content as [`Outcome::Empty`].
    pub fn from_text(text: String) -> Self {
        if text.trim().is_empty() {
            Self::Empty
        } else {
            Self::Value(text)
        }
    }
}
