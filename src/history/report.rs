use std::collections::BTreeMap;
use std::io::{Cursor, Read};

use serde::Deserialize;
use zip::ZipArchive;

use crate::config::ReportConfig;
use crate::error::{Result, SplitterError};
use crate::scheduler::TestRecord;

#[derive(Debug, Deserialize)]
struct TestSuite {
    #[serde(rename = "testcase", default)]
    test_cases: Vec<TestCase>,
}

#[derive(Debug, Deserialize)]
struct TestCase {
    #[serde(rename = "@name", default)]
    name: String,
    #[serde(rename = "@file", default)]
    file: String,
    #[serde(rename = "@time", default)]
    time: f64,
}

/// Parse one JUnit style `<testsuite>` report as written by rspec_junit_formatter.
pub fn parse_report(xml: &str) -> Result<Vec<TestRecord>> {
    if xml.trim().is_empty() {
        return Err(SplitterError::EmptyReport("report has no content".to_string()));
    }

    let suite: TestSuite = quick_xml::de::from_str(xml)?;
    Ok(suite
        .test_cases
        .into_iter()
        .map(|tc| TestRecord::new(tc.file, tc.name, tc.time))
        .collect())
}

/// Collect test records from every matching report in an artifact zip.
///
/// Unreadable archives and malformed reports contribute nothing and are only
/// logged. Tests are keyed by file and name so a test reported twice (for
/// example by runs with different node counts) is counted once, the last
/// report winning.
pub fn read_archive(bytes: &[u8], reports: &ReportConfig) -> Vec<TestRecord> {
    let mut archive = match ZipArchive::new(Cursor::new(bytes)) {
        Ok(archive) => archive,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to open artifact archive, ignoring history");
            return Vec::new();
        }
    };

    if archive.is_empty() {
        tracing::warn!("Artifact archive is empty");
        return Vec::new();
    }

    let mut tests: BTreeMap<(String, String), TestRecord> = BTreeMap::new();
    for i in 0..archive.len() {
        let mut entry = match archive.by_index(i) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(index = i, error = %e, "Failed to open archive entry");
                continue;
            }
        };

        let name = entry.name().to_string();
        let file_name = name.rsplit('/').next().unwrap_or(&name);
        if entry.is_dir() || !reports.matches(file_name) {
            continue;
        }

        tracing::info!(name = %name, "Processing report");
        let mut xml = String::new();
        if let Err(e) = entry.read_to_string(&mut xml) {
            tracing::warn!(name = %name, error = %e, "Failed to read report");
            continue;
        }

        match parse_report(&xml) {
            Ok(records) => {
                for record in records {
                    tests.insert((record.file.clone(), record.name.clone()), record);
                }
            }
            Err(e) => {
                tracing::warn!(name = %name, error = %e, "Failed to parse report");
            }
        }
    }

    tracing::info!(count = tests.len(), "Found tests in artifact");
    tests.into_values().collect()
}
