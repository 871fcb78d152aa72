//! Tagged result for registry lookups.
//!
//! A missing package or document is an ordinary outcome, not an error, so
//! capabilities return `Lookup<T>` inside their `Result`.

use serde::{Deserialize, Serialize};

/// Outcome of a lookup that may legitimately find nothing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
}

impl<T> Lookup<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }

    /// Convert into an `Option`, dropping the distinction
    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(value) => Some(value),
            Lookup::NotFound => None,
        }
    }

    pub fn map<U, F>(self, f: F) -> Lookup<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Lookup::Found(value) => Lookup::Found(f(value)),
            Lookup::NotFound => Lookup::NotFound,
        }
    }
}

impl<T> From<Option<T>> for Lookup<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Lookup::Found(value),
            None => Lookup::NotFound,
        }
    }
}
