//! Summary of which credentials are configured

use crate::config::{ApiKeys, ApiStatusEntry};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub entries: Vec<ApiStatusEntry>,
    pub configured: usize,
    pub total: usize,
}

impl StatusReport {
    pub fn from_keys(keys: &ApiKeys) -> Self {
        let entries = keys.status();
        let configured = entries.iter().filter(|e| e.configured).count();
        Self {
            total: entries.len(),
            configured,
            entries,
        }
    }

    /// What the assistant says about the report.
    pub fn spoken_lines(&self) -> Vec<String> {
        let follow_up = if self.configured == 0 {
            "Please configure your API keys to unlock more features."
        } else if self.configured < self.total {
            "Some features are limited. Add the missing keys to enable them."
        } else {
            "All services are configured and ready."
        };
        vec![
            format!(
                "I have {} out of {} API services configured",
                self.configured, self.total
            ),
            follow_up.to_string(),
        ]
    }

    /// One line per credential group for terminal output.
    pub fn detail_lines(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|e| {
                let mark = if e.configured { "configured" } else { "missing" };
                format!("{:<24} {mark}", e.name)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_and_lines() {
        let keys = ApiKeys {
            openweather: Some("k".into()),
            news: Some("k".into()),
            ..ApiKeys::default()
        };
        let report = StatusReport::from_keys(&keys);
        assert_eq!(report.configured, 2);
        assert_eq!(report.total, 11);
        let lines = report.spoken_lines();
        assert_eq!(lines[0], "I have 2 out of 11 API services configured");
        assert!(lines[1].starts_with("Some features are limited"));
        assert_eq!(report.detail_lines().len(), 11);
    }

    #[test]
    fn test_nothing_configured() {
        let report = StatusReport::from_keys(&ApiKeys::default());
        assert_eq!(
            report.spoken_lines()[1],
            "Please configure your API keys to unlock more features."
        );
    }
}
