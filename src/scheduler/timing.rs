use std::collections::BTreeMap;

use crate::scheduler::input::InputFileSet;

/// A single test execution recovered from a previous run's report.
#[derive(Debug, Clone, PartialEq)]
pub struct TestRecord {
    /// Source file the test lives in
    pub file: String,
    /// Test name, unique only within `file`
    pub name: String,
    /// Duration in seconds
    pub duration: f64,
}

impl TestRecord {
    pub fn new(file: impl Into<String>, name: impl Into<String>, duration: f64) -> Self {
        Self {
            file: file.into(),
            name: name.into(),
            duration,
        }
    }

    fn is_valid(&self) -> bool {
        self.duration.is_finite() && self.duration >= 0.0
    }
}

/// Expected duration per file, in seconds.
///
/// Iteration is always in ascending file identifier order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileTiming {
    durations: BTreeMap<String, f64>,
}

impl FileTiming {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, file: impl Into<String>, duration: f64) {
        self.durations.insert(file.into(), duration);
    }

    pub fn get(&self, file: &str) -> Option<f64> {
        self.durations.get(file).copied()
    }

    pub fn contains(&self, file: &str) -> bool {
        self.durations.contains_key(file)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.durations.iter().map(|(f, d)| (f.as_str(), *d))
    }

    /// Sum of all file durations
    pub fn total(&self) -> f64 {
        self.durations.values().sum()
    }

    pub fn len(&self) -> usize {
        self.durations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.durations.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for FileTiming {
    fn from_iter<T: IntoIterator<Item = (S, f64)>>(iter: T) -> Self {
        let mut timing = FileTiming::new();
        for (file, duration) in iter {
            timing.insert(file, duration);
        }
        timing
    }
}

/// Align historical test timings with the files scheduled for this run.
///
/// Durations are summed per file. Files that are no longer in `input` are
/// dropped, and files with no history get the mean duration of all files
/// known from history (zero when history is empty). The mean is taken before
/// any new file is inserted.
pub fn reconcile(records: &[TestRecord], input: &InputFileSet) -> FileTiming {
    let mut durations: BTreeMap<String, f64> = BTreeMap::new();
    let mut total_time = 0.0;

    for record in records {
        if !record.is_valid() {
            tracing::debug!(
                filename = %record.file,
                test = %record.name,
                duration = record.duration,
                "Ignoring test with invalid duration"
            );
            continue;
        }
        *durations.entry(record.file.clone()).or_insert(0.0) += record.duration;
        total_time += record.duration;
    }

    let avg_file_time = if durations.is_empty() {
        0.0
    } else {
        total_time / durations.len() as f64
    };

    tracing::info!(
        known_files = durations.len(),
        total_time,
        avg_file_time,
        "Aggregated test history"
    );

    durations.retain(|filename, _| {
        let keep = input.contains(filename);
        if !keep {
            tracing::debug!(%filename, "File found in history but not in input, dropping");
        }
        keep
    });

    for filename in input.iter() {
        if !durations.contains_key(filename) {
            tracing::debug!(filename, "File not found in history, using average time");
            durations.insert(filename.to_string(), avg_file_time);
        }
    }

    FileTiming { durations }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sums_tests_per_file() {
        let records = vec![
            TestRecord::new("a", "first", 4.0),
            TestRecord::new("a", "second", 6.0),
            TestRecord::new("b", "only", 2.5),
        ];
        let timing = reconcile(&records, &InputFileSet::new(["a", "b"]));

        assert_eq!(timing.get("a"), Some(10.0));
        assert_eq!(timing.get("b"), Some(2.5));
        assert_eq!(timing.len(), 2);
    }

    #[test]
    fn average_is_taken_over_history_before_insertions() {
        // history mean = (10 + 2) / 2 = 6, including the stale file "gone"
        let records = vec![
            TestRecord::new("a", "t", 10.0),
            TestRecord::new("gone", "t", 2.0),
        ];
        let timing = reconcile(&records, &InputFileSet::new(["a", "new1", "new2"]));

        assert_eq!(timing.get("new1"), Some(6.0));
        assert_eq!(timing.get("new2"), Some(6.0));
        assert!(!timing.contains("gone"));
    }

    #[test]
    fn empty_history_gives_zero_durations() {
        let timing = reconcile(&[], &InputFileSet::new(["x", "y"]));
        assert_eq!(timing.get("x"), Some(0.0));
        assert_eq!(timing.get("y"), Some(0.0));
        assert_eq!(timing.total(), 0.0);
    }

    #[test]
    fn invalid_durations_are_ignored() {
        let records = vec![
            TestRecord::new("a", "nan", f64::NAN),
            TestRecord::new("a", "negative", -1.0),
            TestRecord::new("a", "ok", 3.0),
            TestRecord::new("b", "inf", f64::INFINITY),
        ];
        let timing = reconcile(&records, &InputFileSet::new(["a", "b"]));

        assert_eq!(timing.get("a"), Some(3.0));
        // "b" had no valid record so it is treated as new and gets the mean
        assert_eq!(timing.get("b"), Some(3.0));
    }

    #[test]
    fn empty_input_gives_empty_timing() {
        let records = vec![TestRecord::new("a", "t", 1.0)];
        let timing = reconcile(&records, &InputFileSet::default());
        assert!(timing.is_empty());
    }

    #[test]
    fn iteration_is_sorted_by_file() {
        let timing: FileTiming = [("c", 1.0), ("a", 2.0), ("b", 3.0)].into_iter().collect();
        let files: Vec<&str> = timing.iter().map(|(f, _)| f).collect();
        assert_eq!(files, vec!["a", "b", "c"]);
    }
}
