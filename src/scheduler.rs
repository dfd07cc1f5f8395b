//! Replays a [`ScenarioGrid`] against the device API in compressed real time.
//!
//! Time points run in ascending order. Before each occupied time point the
//! scheduler sleeps `(t - previous) * time_scale`, so empty time points only
//! lengthen the next wait. Operations within a time point run one at a time in
//! column order: resolve, dispatch, validate, record.

use crate::client::DeviceApi;
use crate::dispatcher::dispatch;
use crate::errors::RunnerError;
use crate::models::{Operation, OperationResult};
use crate::parsers::grid_loader::ScenarioGrid;
use crate::resolver::resolve_operation;
use crate::results::{ResultAggregator, Summary};
use crate::validation::validate;
use log::info;
use std::time::Duration;
use tokio::time::sleep;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running,
    Completed,
}

/// Wait to apply before each occupied time point. The first entry is always zero.
///
/// Fails with [`RunnerError::WaitOverflow`] if a gap times `time_scale` does
/// not fit in a [`Duration`].
pub fn planned_waits(grid: &ScenarioGrid, time_scale: Duration) -> Result<Vec<(u32, Duration)>, RunnerError> {
    let mut last_time_point: Option<u32> = None;
    grid.time_points()
        .into_iter()
        .map(|t| {
            let wait = match last_time_point {
                None => Duration::ZERO,
                Some(last) => time_scale
                    .checked_mul(t - last)
                    .ok_or(RunnerError::WaitOverflow { time_point: t })?,
            };
            last_time_point = Some(t);
            Ok((t, wait))
        })
        .collect()
}

pub struct Scheduler<A: DeviceApi> {
    api: A,
    time_scale: Duration,
    state: SchedulerState,
    results: ResultAggregator,
}

impl<A: DeviceApi> Scheduler<A> {
    pub fn new(api: A, time_scale: Duration) -> Self {
        Self {
            api,
            time_scale,
            state: SchedulerState::Idle,
            results: ResultAggregator::new(),
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn results(&self) -> &ResultAggregator {
        &self.results
    }

    /// Runs every operation in `grid`. A scheduler runs exactly one scenario;
    /// a second call returns [`RunnerError::AlreadyRun`].
    pub async fn run(&mut self, grid: &ScenarioGrid) -> Result<Summary, RunnerError> {
        if self.state != SchedulerState::Idle {
            return Err(RunnerError::AlreadyRun);
        }
        let waits = planned_waits(grid, self.time_scale)?;
        self.state = SchedulerState::Running;
        self.results = ResultAggregator::new();

        if grid.is_empty() {
            info!("Scenario has no operations, nothing to run");
            self.state = SchedulerState::Completed;
            return Ok(self.results.summary());
        }

        info!(
            "Running {} operations over {} time points",
            grid.operation_count(),
            grid.time_point_count()
        );

        let mut last_time_point: Option<u32> = None;
        for (time_point, wait) in waits {
            if !wait.is_zero() {
                let delta = last_time_point.map_or(0, |last| time_point - last);
                println!("\nWaiting {} logical min = {:.1?} real time...", delta, wait);
                info!("Sleeping {:?} before t={}", wait, time_point);
                sleep(wait).await;
            }

            println!("\n[t = {} min]", time_point);
            for operation in grid.operations_at(time_point) {
                let result = self.execute(operation).await;
                self.results.record(result);
            }

            last_time_point = Some(time_point);
        }

        self.state = SchedulerState::Completed;
        Ok(self.results.summary())
    }

    async fn execute(&self, operation: &Operation) -> OperationResult {
        let command = resolve_operation(&self.api, operation).await;
        let raw = dispatch(&self.api, &command).await;
        let verdict = validate(raw, operation.expected_to_fail);

        let mark = if verdict.succeeded { "✓" } else { "✗" };
        println!(
            "  {} [{}] {} ({}) - {}",
            mark, operation.room_id, operation.kind, command, verdict.message
        );

        OperationResult {
            time_point: operation.time_point,
            room_id: operation.room_id.clone(),
            kind: operation.kind,
            succeeded: verdict.succeeded,
            message: verdict.message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FanSpeed, OperationKind};

    #[test]
    fn test_planned_waits_skip_empty_time_points() {
        let grid: ScenarioGrid = vec![
            Operation::new("101", OperationKind::PowerOn).at(0),
            Operation::new("101", OperationKind::SetFanSpeed).with_fan_speed(FanSpeed::High).at(5),
            Operation::new("102", OperationKind::PowerOn).at(5),
            Operation::new("101", OperationKind::PowerOff).at(9),
        ]
        .into_iter()
        .collect();

        assert_eq!(
            planned_waits(&grid, Duration::from_secs(10)).unwrap(),
            vec![
                (0, Duration::ZERO),
                (5, Duration::from_secs(50)),
                (9, Duration::from_secs(40)),
            ]
        );
    }

    #[test]
    fn test_planned_waits_start_offset_is_not_waited() {
        let grid: ScenarioGrid = vec![Operation::new("101", OperationKind::PowerOn).at(3)].into_iter().collect();
        assert_eq!(planned_waits(&grid, Duration::from_secs(10)).unwrap(), vec![(3, Duration::ZERO)]);
        assert!(planned_waits(&ScenarioGrid::new(), Duration::from_secs(10)).unwrap().is_empty());
    }

    #[test]
    fn test_planned_waits_overflow_is_an_error() {
        let grid: ScenarioGrid = vec![
            Operation::new("101", OperationKind::PowerOn).at(0),
            Operation::new("101", OperationKind::PowerOff).at(4_000_000_000),
        ]
        .into_iter()
        .collect();

        let err = planned_waits(&grid, Duration::from_secs(10_000_000_000)).unwrap_err();
        assert!(matches!(err, RunnerError::WaitOverflow { time_point: 4_000_000_000 }));
    }
}
