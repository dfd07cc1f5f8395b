use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read runner config {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Runner config {path} is not valid JSON: {source}")]
    MalformedJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("No runner config at {path}")]
    Missing { path: PathBuf },
    #[error("Runner config field '{field}' rejected: {message}")]
    Invalid { field: String, message: String },
}

#[derive(Error, Debug)]
pub enum ScenarioError {
    #[error("IO error reading scenario file {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Error reading CSV scenario {path}: {source}")]
    CsvError {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Failures talking to the device-control API.
///
/// These never abort a run: the dispatcher turns them into failed results and
/// the state resolver falls back to defaults.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Transport error calling {endpoint}: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Failed to decode response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },
}

#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Configuration failed: {0}")]
    Config(#[from] ConfigError),
    #[error("Scenario loading failed: {0}")]
    Scenario(#[from] ScenarioError),
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("Scheduler already ran its scenario")]
    AlreadyRun,
    #[error("Wait before t={time_point} does not fit in a duration; lower the time scale")]
    WaitOverflow { time_point: u32 },
    #[error("Failed to write report {path}: {message}")]
    Report { path: PathBuf, message: String },
}
