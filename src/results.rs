use crate::config::RunnerConfig;
use crate::errors::RunnerError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::time::{Duration, Instant};

pub use crate::models::OperationResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl Summary {
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}

/// Append-only record of every operation verdict in a run.
#[derive(Debug)]
pub struct ResultAggregator {
    results: Vec<OperationResult>,
    started_at: DateTime<Utc>,
    start_instant: Instant,
}

impl Default for ResultAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self {
            results: Vec::new(),
            started_at: Utc::now(),
            start_instant: Instant::now(),
        }
    }

    pub fn record(&mut self, result: OperationResult) {
        self.results.push(result);
    }

    pub fn results(&self) -> &[OperationResult] {
        &self.results
    }

    pub fn summary(&self) -> Summary {
        let succeeded = self.results.iter().filter(|r| r.succeeded).count();
        Summary {
            total: self.results.len(),
            succeeded,
            failed: self.results.len() - succeeded,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start_instant.elapsed()
    }

    pub fn print_summary(&self) {
        let summary = self.summary();
        println!("\n========== Scenario Run Summary ==========");
        println!("Total Duration: {:.2?}", self.elapsed());
        println!("Operations: {}", summary.total);
        println!("Succeeded: {}", summary.succeeded);
        println!("Failed: {}", summary.failed);

        if !self.results.is_empty() {
            println!("\nDetails:");
            for result in &self.results {
                let mark = if result.succeeded { "✓" } else { "✗" };
                println!(
                    "  {} [t={} min] {} {}: {}",
                    mark, result.time_point, result.room_id, result.kind, result.message
                );
            }
        }
        println!("==========================================\n");
    }

    pub fn report<'a>(&'a self, config: &'a RunnerConfig) -> RunReport<'a> {
        RunReport {
            started_at: self.started_at,
            finished_at: Utc::now(),
            api_base_url: &config.api_base_url,
            time_scale_secs: config.time_scale_secs,
            summary: self.summary(),
            results: &self.results,
        }
    }
}

/// Machine-readable form of a finished run.
#[derive(Debug, Serialize)]
pub struct RunReport<'a> {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub api_base_url: &'a str,
    pub time_scale_secs: f64,
    pub summary: Summary,
    pub results: &'a [OperationResult],
}

impl RunReport<'_> {
    pub fn write_json(&self, path: &Path) -> Result<(), RunnerError> {
        let file = File::create(path).map_err(|e| RunnerError::Report {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        serde_json::to_writer_pretty(BufWriter::new(file), self).map_err(|e| RunnerError::Report {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OperationKind;

    fn result(time_point: u32, room_id: &str, succeeded: bool) -> OperationResult {
        OperationResult {
            time_point,
            room_id: room_id.to_string(),
            kind: OperationKind::PowerOn,
            succeeded,
            message: if succeeded { "ok".to_string() } else { "HTTP 500: boom".to_string() },
        }
    }

    #[test]
    fn test_summary_counts() {
        let mut aggregator = ResultAggregator::new();
        assert_eq!(aggregator.summary(), Summary { total: 0, succeeded: 0, failed: 0 });
        assert!(aggregator.summary().all_succeeded());

        aggregator.record(result(0, "101", true));
        aggregator.record(result(1, "102", false));
        aggregator.record(result(1, "103", true));

        assert_eq!(aggregator.summary(), Summary { total: 3, succeeded: 2, failed: 1 });
        assert!(!aggregator.summary().all_succeeded());
        let rooms: Vec<&str> = aggregator.results().iter().map(|r| r.room_id.as_str()).collect();
        assert_eq!(rooms, vec!["101", "102", "103"]);
    }

    #[test]
    fn test_write_json_report() {
        let mut aggregator = ResultAggregator::new();
        aggregator.record(result(0, "101", true));
        let config = RunnerConfig::default();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        aggregator.report(&config).write_json(&path).unwrap();

        let written: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["summary"]["total"], 1);
        assert_eq!(written["results"][0]["room_id"], "101");
        assert_eq!(written["results"][0]["kind"], "PowerOn");
        assert_eq!(written["time_scale_secs"], 10.0);
    }
}
