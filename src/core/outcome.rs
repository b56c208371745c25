//! # Per-task outcomes and the aggregated result map.
//!
//! [`Outcome`] is the terminal state of one task: a value or a [`TaskError`], plus the
//! wall-clock time the task took. [`ResultMap`] maps task names to outcomes. It is built
//! by the supervisor's collector as tasks finish and handed to the caller once every task
//! is terminal. It has no ordering guarantee.
//!
//! ## Serialized shape
//! ```text
//! {
//!   "fast":   { "result": <value>, "error": null },
//!   "broken": { "result": null,    "error": "boom" }
//! }
//! ```

use std::collections::HashMap;
use std::collections::hash_map;
use std::sync::Arc;
use std::time::Duration;

use serde::ser::{Serialize, SerializeMap, SerializeStruct, Serializer};

use crate::error::TaskError;

/// Terminal outcome of one task.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome<T> {
    /// The value, or why there is none.
    pub result: Result<T, TaskError>,
    /// Time between the task's `Start` heartbeat and its terminal heartbeat.
    pub elapsed: Duration,
}

impl<T> Outcome<T> {
    pub(crate) fn new(result: Result<T, TaskError>, elapsed: Duration) -> Self {
        Self { result, elapsed }
    }

    /// True if the task produced a value.
    #[inline]
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    /// The value, if the task succeeded.
    pub fn value(&self) -> Option<&T> {
        self.result.as_ref().ok()
    }

    /// The error, if the task failed.
    pub fn error(&self) -> Option<&TaskError> {
        self.result.as_ref().err()
    }

    /// Drops the timing and returns the plain result.
    pub fn into_result(self) -> Result<T, TaskError> {
        self.result
    }
}

impl<T: Serialize> Serialize for Outcome<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut st = serializer.serialize_struct("Outcome", 2)?;
        st.serialize_field("result", &self.value())?;
        st.serialize_field("error", &self.error().map(ToString::to_string))?;
        st.end()
    }
}

/// Mapping from task name to [`Outcome`].
#[derive(Debug, Clone)]
pub struct ResultMap<T> {
    entries: HashMap<Arc<str>, Outcome<T>>,
}

impl<T> ResultMap<T> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity),
        }
    }

    /// Records an outcome, returning the one it replaced (duplicate task names).
    pub(crate) fn insert(&mut self, name: Arc<str>, outcome: Outcome<T>) -> Option<Outcome<T>> {
        self.entries.insert(name, outcome)
    }

    /// Outcome of the named task.
    pub fn get(&self, name: &str) -> Option<&Outcome<T>> {
        self.entries.get(name)
    }

    /// Removes and returns the named task's outcome.
    pub fn remove(&mut self, name: &str) -> Option<Outcome<T>> {
        self.entries.remove(name)
    }

    /// Value of the named task, if it succeeded.
    pub fn value(&self, name: &str) -> Option<&T> {
        self.get(name).and_then(Outcome::value)
    }

    /// Error of the named task, if it failed.
    pub fn error(&self, name: &str) -> Option<&TaskError> {
        self.get(name).and_then(Outcome::error)
    }

    /// True if a task with this name ran.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of distinct task names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the run had no tasks.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Task names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(|k| &**k).collect();
        names.sort_unstable();
        names
    }

    /// Iterates over entries in arbitrary order.
    pub fn iter(&self) -> hash_map::Iter<'_, Arc<str>, Outcome<T>> {
        self.entries.iter()
    }

    /// Number of tasks that produced a value.
    pub fn succeeded(&self) -> usize {
        self.entries.values().filter(|o| o.is_ok()).count()
    }

    /// Consumes the map, returning the underlying entries.
    pub fn into_inner(self) -> HashMap<Arc<str>, Outcome<T>> {
        self.entries
    }
}

impl<T> IntoIterator for ResultMap<T> {
    type Item = (Arc<str>, Outcome<T>);
    type IntoIter = hash_map::IntoIter<Arc<str>, Outcome<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a ResultMap<T> {
    type Item = (&'a Arc<str>, &'a Outcome<T>);
    type IntoIter = hash_map::Iter<'a, Arc<str>, Outcome<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl<T: Serialize> Serialize for ResultMap<T> {
    /// Serializes with keys sorted so that output is stable across runs.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for name in self.names() {
            map.serialize_entry(name, &self.entries[name])?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ResultMap<u32> {
        let mut map = ResultMap::with_capacity(2);
        map.insert("ok".into(), Outcome::new(Ok(7), Duration::from_millis(1)));
        map.insert(
            "bad".into(),
            Outcome::new(Err(TaskError::fail("boom")), Duration::from_millis(2)),
        );
        map
    }

    #[test]
    fn accessors_split_values_and_errors() {
        let map = sample();
        assert_eq!(map.len(), 2);
        assert_eq!(map.value("ok"), Some(&7));
        assert!(map.error("ok").is_none());
        assert_eq!(map.error("bad").map(ToString::to_string).as_deref(), Some("boom"));
        assert!(map.value("bad").is_none());
        assert_eq!(map.succeeded(), 1);
        assert_eq!(map.names(), vec!["bad", "ok"]);
    }

    #[test]
    fn insert_reports_replaced_entry() {
        let mut map = sample();
        let prev = map.insert("ok".into(), Outcome::new(Ok(8), Duration::ZERO));
        assert_eq!(prev.and_then(|o| o.result.ok()), Some(7));
        assert_eq!(map.value("ok"), Some(&8));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn serializes_result_and_error_fields() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["ok"]["result"], 7);
        assert!(json["ok"]["error"].is_null());
        assert!(json["bad"]["result"].is_null());
        assert_eq!(json["bad"]["error"], "boom");
    }
}
