//! The star size smoke test.
//!
//! Connects through a [`Connector`], walks the plan one remote call at a
//! time and closes the connection on every path once it has been opened.

use std::{fmt, time::Instant};

use serde::Serialize;
use tracing::{error, info};

use crate::{
    entry_point::{Connector, EntryPoint},
    error::{RemoteCallError, SmokeError},
};

/// Star sizes applied by the sweep, in order
pub const STAR_SIZE_SWEEP: [f64; 5] = [100.0, 70.0, 50.0, 30.0, 12.0];

/// Remote pause after each star size change, in seconds
pub const DEFAULT_PAUSE_SECS: u32 = 2;

/// A single remote call of a plan
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "call", content = "arg", rename_all = "camelCase")]
pub enum Step {
    MaximizeInterfaceWindow,
    SetStarSize(f64),
    Sleep(u32),
}

impl Step {
    async fn invoke(self, entry_point: &dyn EntryPoint) -> Result<(), RemoteCallError> {
        match self {
            Self::MaximizeInterfaceWindow => entry_point.maximize_interface_window().await,
            Self::SetStarSize(size) => entry_point.set_star_size(size).await,
            Self::Sleep(seconds) => entry_point.sleep(seconds).await,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MaximizeInterfaceWindow => write!(f, "maximizeInterfaceWindow()"),
            Self::SetStarSize(size) => write!(f, "setStarSize({size:?})"),
            Self::Sleep(seconds) => write!(f, "sleep({seconds})"),
        }
    }
}

/// What the smoke test does once connected
#[derive(Debug, Clone, PartialEq)]
pub struct SmokePlan {
    pub maximize_window: bool,
    pub star_sizes: Vec<f64>,
    pub pause_secs: u32,
}

impl Default for SmokePlan {
    fn default() -> Self {
        Self::star_size_sweep()
    }
}

impl SmokePlan {
    /// Maximize the window, then step the star size down from 100 to 12
    pub fn star_size_sweep() -> Self {
        Self {
            maximize_window: true,
            star_sizes: STAR_SIZE_SWEEP.to_vec(),
            pause_secs: DEFAULT_PAUSE_SECS,
        }
    }

    /// The remote calls of this plan, in the order they are made
    pub fn steps(&self) -> Vec<Step> {
        let mut steps = Vec::with_capacity(1 + self.star_sizes.len() * 2);
        if self.maximize_window {
            steps.push(Step::MaximizeInterfaceWindow);
        }
        for &size in &self.star_sizes {
            steps.push(Step::SetStarSize(size));
            steps.push(Step::Sleep(self.pause_secs));
        }
        steps
    }
}

/// Summary of a completed run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub endpoint: String,
    pub steps: Vec<Step>,
    pub elapsed_ms: u64,
}

/// A step that failed, and the steps that completed before it
#[derive(Debug)]
pub struct StepFailure {
    pub completed: Vec<Step>,
    pub step: Step,
    pub source: RemoteCallError,
}

/// Run every step of `plan` against `entry_point`, stopping at the first
/// failure.
pub async fn execute(entry_point: &dyn EntryPoint, plan: &SmokePlan) -> Result<Vec<Step>, StepFailure> {
    let mut completed = Vec::new();

    for step in plan.steps() {
        info!("-> {}", step);
        if let Err(source) = step.invoke(entry_point).await {
            return Err(StepFailure {
                completed,
                step,
                source,
            });
        }
        completed.push(step);
    }

    Ok(completed)
}

/// Connect, run `plan`, and close the connection.
///
/// No call is attempted when the connection cannot be opened. Once it is
/// open it is closed exactly once, after the last attempted call.
pub async fn run_smoke_test(
    connector: &dyn Connector,
    plan: &SmokePlan,
) -> Result<RunReport, SmokeError> {
    let started = Instant::now();
    let endpoint = connector.endpoint();

    info!("Connecting to gateway at {}", endpoint);
    let gateway = connector.connect().await?;
    info!("Connected to gateway at {}", endpoint);

    let outcome = execute(gateway.entry_point(), plan).await;

    gateway.close().await;
    info!("Gateway connection closed");

    match outcome {
        Ok(steps) => Ok(RunReport {
            endpoint,
            steps,
            elapsed_ms: started.elapsed().as_millis() as u64,
        }),
        Err(failure) => {
            error!(
                "Step {} failed after {} completed steps: {}",
                failure.step,
                failure.completed.len(),
                failure.source
            );
            Err(SmokeError::RemoteCall {
                step: failure.step,
                completed: failure.completed.len(),
                source: failure.source,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConnectionError;
    use crate::mock::{Call, MockConnector};

    fn star_sizes(calls: &[Call]) -> Vec<f64> {
        calls
            .iter()
            .filter_map(|c| match c {
                Call::SetStarSize(size) => Some(*size),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn sweep_steps_interleave_pauses() {
        let steps = SmokePlan::star_size_sweep().steps();
        assert_eq!(steps.len(), 11);
        assert_eq!(steps[0], Step::MaximizeInterfaceWindow);
        for pair in steps[1..].chunks(2) {
            assert!(matches!(pair[0], Step::SetStarSize(_)));
            assert_eq!(pair[1], Step::Sleep(2));
        }
    }

    #[test]
    fn step_display_matches_remote_names() {
        assert_eq!(Step::SetStarSize(12.0).to_string(), "setStarSize(12.0)");
        assert_eq!(Step::Sleep(2).to_string(), "sleep(2)");
        assert_eq!(
            Step::MaximizeInterfaceWindow.to_string(),
            "maximizeInterfaceWindow()"
        );
    }

    #[tokio::test]
    async fn maximizes_once_before_any_star_size() {
        let connector = MockConnector::new();
        run_smoke_test(&connector, &SmokePlan::star_size_sweep())
            .await
            .unwrap();

        let calls = connector.calls();
        let maximized: Vec<usize> = calls
            .iter()
            .enumerate()
            .filter(|(_, c)| **c == Call::MaximizeInterfaceWindow)
            .map(|(i, _)| i)
            .collect();
        let first_size = calls
            .iter()
            .position(|c| matches!(c, Call::SetStarSize(_)))
            .unwrap();

        assert_eq!(maximized.len(), 1);
        assert!(maximized[0] < first_size);
    }

    #[tokio::test]
    async fn star_sizes_follow_the_sweep() {
        let connector = MockConnector::new();
        run_smoke_test(&connector, &SmokePlan::default()).await.unwrap();

        assert_eq!(star_sizes(&connector.calls()), vec![100.0, 70.0, 50.0, 30.0, 12.0]);
    }

    #[tokio::test]
    async fn each_star_size_is_followed_by_one_pause() {
        let connector = MockConnector::new();
        run_smoke_test(&connector, &SmokePlan::star_size_sweep())
            .await
            .unwrap();

        let calls = connector.calls();
        for (i, call) in calls.iter().enumerate() {
            if matches!(call, Call::SetStarSize(_)) {
                assert_eq!(calls[i + 1], Call::Sleep(2));
                assert!(matches!(calls[i + 2], Call::SetStarSize(_) | Call::Close));
            }
        }
    }

    #[tokio::test]
    async fn closes_exactly_once_after_all_calls() {
        let connector = MockConnector::new();
        let report = run_smoke_test(&connector, &SmokePlan::star_size_sweep())
            .await
            .unwrap();

        let calls = connector.calls();
        assert_eq!(calls.first(), Some(&Call::Connect));
        assert_eq!(calls.last(), Some(&Call::Close));
        assert_eq!(calls.iter().filter(|c| **c == Call::Close).count(), 1);
        // connect + 11 remote calls + close
        assert_eq!(calls.len(), 13);
        assert_eq!(report.steps, SmokePlan::star_size_sweep().steps());
        assert_eq!(report.endpoint, "mock");
    }

    #[tokio::test]
    async fn third_star_size_failure_stops_the_sweep() {
        let connector = MockConnector::failing_star_size_call(3);
        let err = run_smoke_test(&connector, &SmokePlan::star_size_sweep())
            .await
            .unwrap_err();

        match err {
            SmokeError::RemoteCall {
                step,
                completed,
                source,
            } => {
                assert_eq!(step, Step::SetStarSize(50.0));
                assert_eq!(completed, 5);
                assert_eq!(source.method(), "setStarSize");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let calls = connector.calls();
        assert_eq!(star_sizes(&calls), vec![100.0, 70.0, 50.0]);
        assert_eq!(
            &calls[calls.len() - 2..],
            &[Call::SetStarSize(50.0), Call::Close]
        );
    }

    #[tokio::test]
    async fn connection_failure_attempts_no_calls() {
        let connector = MockConnector::refusing();
        let err = run_smoke_test(&connector, &SmokePlan::star_size_sweep())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            SmokeError::Connection(ConnectionError::Unreachable { .. })
        ));
        assert!(connector.calls().is_empty());
    }

    #[tokio::test]
    async fn execute_reports_completed_steps() {
        let connector = MockConnector::failing_star_size_call(1);
        let gateway = connector.connect().await.unwrap();

        let failure = execute(gateway.entry_point(), &SmokePlan::star_size_sweep())
            .await
            .unwrap_err();
        assert_eq!(failure.completed, vec![Step::MaximizeInterfaceWindow]);
        assert_eq!(failure.step, Step::SetStarSize(100.0));
        gateway.close().await;
    }

    #[test]
    fn report_serializes_steps() {
        let report = RunReport {
            endpoint: "127.0.0.1:25333".to_string(),
            steps: vec![Step::MaximizeInterfaceWindow, Step::SetStarSize(70.0), Step::Sleep(2)],
            elapsed_ms: 10,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(
            json["steps"],
            serde_json::json!([
                {"call": "maximizeInterfaceWindow"},
                {"call": "setStarSize", "arg": 70.0},
                {"call": "sleep", "arg": 2}
            ])
        );
    }
}
