//! Offline validation of the config documents.
//!
//! The server never validates eagerly (documents are re-read per request),
//! so `fwgate check` is how operators catch a dangling filename or a typo in
//! a version string before a device hits it.

use crate::server::AppState;
use std::fmt;

/// Which document a problem was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Source {
    /// `mapping.json`
    Mapping,
    /// `ota_config.json`
    OtaPolicy,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mapping => f.write_str("mapping"),
            Self::OtaPolicy => f.write_str("ota"),
        }
    }
}

/// One problem found by [`check`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Problem {
    /// Document the problem was found in.
    pub source: Source,
    /// Alias or device model, or `None` for document-level problems.
    pub key: Option<String>,
    /// Human-readable description.
    pub detail: String,
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.key {
            Some(key) => write!(f, "[{}] {}: {}", self.source, key, self.detail),
            None => write!(f, "[{}] {}", self.source, self.detail),
        }
    }
}

/// Summary of a check run.
#[derive(Debug, Clone, Default)]
pub struct CheckReport {
    /// Number of aliases inspected.
    pub aliases: usize,
    /// Number of device models inspected.
    pub models: usize,
    /// Problems found, sorted by source then key.
    pub problems: Vec<Problem>,
}

impl CheckReport {
    /// Whether no problems were found.
    pub fn is_clean(&self) -> bool {
        self.problems.is_empty()
    }
}

/// Validate both documents and every file they reference.
pub async fn check(state: &AppState) -> CheckReport {
    let mut report = CheckReport::default();

    match state.store.load_mapping().await {
        Ok(mapping) => {
            report.aliases = mapping.len();
            for (alias, target) in mapping.iter() {
                let problem = match target.filter(|f| !f.trim().is_empty()) {
                    None => Some("maps to an empty filename".to_string()),
                    Some(filename) => state
                        .files
                        .locate(filename)
                        .await
                        .err()
                        .map(|e| e.to_string()),
                };
                if let Some(detail) = problem {
                    report.problems.push(Problem {
                        source: Source::Mapping,
                        key: Some(alias.to_string()),
                        detail,
                    });
                }
            }
        }
        Err(e) => report.problems.push(Problem {
            source: Source::Mapping,
            key: None,
            detail: e.to_string(),
        }),
    }

    match state.store.load_policy().await {
        Ok(policy) => {
            report.models = policy.len();
            for (model, record) in policy.iter() {
                let problem = match record.release(model) {
                    Ok(release) => state
                        .files
                        .locate(release.filename)
                        .await
                        .err()
                        .map(|e| e.to_string()),
                    Err(e) => Some(e.to_string()),
                };
                if let Some(detail) = problem {
                    report.problems.push(Problem {
                        source: Source::OtaPolicy,
                        key: Some(model.to_string()),
                        detail,
                    });
                }
            }
        }
        Err(e) => report.problems.push(Problem {
            source: Source::OtaPolicy,
            key: None,
            detail: e.to_string(),
        }),
    }

    report.problems.sort();
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::files::StaticFiles;
    use crate::store::ConfigStore;

    fn state_in(dir: &tempfile::TempDir) -> AppState {
        let root = dir.path().join("static_files");
        std::fs::create_dir_all(&root).unwrap();
        std::fs::write(root.join("fw_v3.bin"), b"v3").unwrap();
        std::fs::write(root.join("fw_v2_0_1.bin"), b"v2").unwrap();

        AppState::new(
            ConfigStore::new(
                dir.path().join("mapping.json"),
                dir.path().join("ota_config.json"),
            ),
            StaticFiles::new(root),
        )
    }

    #[tokio::test]
    async fn clean_configuration_passes() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_in(&dir);
        std::fs::write(
            dir.path().join("mapping.json"),
            r#"{"latest_firmware":"fw_v3.bin"}"#,
        )
        .unwrap();
        std::fs::write(
            dir.path().join("ota_config.json"),
            r#"{"esp32-s3-generic":{"latest_version":"2.0.1","filename":"fw_v2_0_1.bin"}}"#,
        )
        .unwrap();

        let report = check(&state).await;
        assert!(report.is_clean(), "{:?}", report.problems);
        assert_eq!(report.aliases, 1);
        assert_eq!(report.models, 1);
    }

    #[tokio::test]
    async fn reports_every_problem() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_in(&dir);
        std::fs::write(
            dir.path().join("mapping.json"),
            r#"{"ok":"fw_v3.bin","gone":"fw_v1.bin","evil":"../../etc/passwd","blank":"","spaces":"  "}"#,
        )
        .unwrap();
        std::fs::write(
            dir.path().join("ota_config.json"),
            r#"{
                "ok": {"latest_version":"2.0.1","filename":"fw_v2_0_1.bin"},
                "typo": {"latest_version":"2.O.1","filename":"fw_v2_0_1.bin"},
                "half": {"filename":"fw_v2_0_1.bin"}
            }"#,
        )
        .unwrap();

        let report = check(&state).await;
        let keys: Vec<_> = report
            .problems
            .iter()
            .map(|p| (p.source, p.key.clone().unwrap()))
            .collect();

        assert_eq!(
            keys,
            vec![
                (Source::Mapping, "blank".to_string()),
                (Source::Mapping, "evil".to_string()),
                (Source::Mapping, "gone".to_string()),
                (Source::Mapping, "spaces".to_string()),
                (Source::OtaPolicy, "half".to_string()),
                (Source::OtaPolicy, "typo".to_string()),
            ]
        );
        assert!(report.problems[1].detail.contains("forbidden"));
    }

    #[tokio::test]
    async fn missing_documents_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let report = check(&state_in(&dir)).await;

        assert_eq!(report.problems.len(), 2);
        assert!(report.problems.iter().all(|p| p.key.is_none()));
        assert!(report.problems[0].to_string().starts_with("[mapping]"));
        assert!(report.problems[1].to_string().starts_with("[ota]"));
    }
}
