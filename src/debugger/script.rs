//! Scripted debug sessions.
//!
//! A scenario is a fixed list of commands and pauses for the main flow plus a
//! matching document seeding schedule. The seeding runs on its own task so
//! the documents land while the debugger sits on a breakpoint.

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use std::sync::Arc;
use std::time::Duration;

use super::{
    ClearBreakpointArgs, ContinueArgs, DebugClient, DebugCommand, EvaluateArgs, SetBreakpointArgs,
};
use crate::commands::{SeedFailure, SeedReport};
use crate::keys::UniqueKeys;
use crate::records::CreditScore;
use crate::store::{DocumentStore, UpsertOptions};

/// Key prefix for documents written during a debug session
pub const DEBUG_KEY_PREFIX: &str = "v8_debug_test_";

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(3);
pub const DEFAULT_SHORT_PAUSE: Duration = Duration::from_secs(2);

/// Timing and numbering for one session
#[derive(Debug, Clone)]
pub struct ScenarioConfig {
    /// Pause between debugger commands and most seeded documents
    pub interval: Duration,
    /// Shorter pause used by the seeding schedule
    pub short_pause: Duration,
    /// Sequence number the per-command offsets are added to
    pub base_seq: u64,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            short_pause: DEFAULT_SHORT_PAUSE,
            base_seq: 100,
        }
    }
}

/// Main-flow step
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Fire { command: DebugCommand, seq_offset: u64 },
    Pause(Duration),
}

/// Seeding-task step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedStep {
    Document,
    Wait(Duration),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scenario {
    /// setbreakpoint, 3 continues, clearbreakpoint, 2 continues, listbreakpoints
    #[default]
    BreakpointCycle,
    /// setbreakpoint, 6 continues, then evaluate
    EvaluateCycle,
    /// every command once, no seeding
    Probe,
}

impl std::str::FromStr for Scenario {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "breakpoint-cycle" => Ok(Scenario::BreakpointCycle),
            "evaluate-cycle" => Ok(Scenario::EvaluateCycle),
            "probe" => Ok(Scenario::Probe),
            _ => Err(format!(
                "Invalid scenario: {}. Use breakpoint-cycle, evaluate-cycle, or probe.",
                s
            )),
        }
    }
}

impl std::fmt::Display for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Scenario::BreakpointCycle => "breakpoint-cycle",
            Scenario::EvaluateCycle => "evaluate-cycle",
            Scenario::Probe => "probe",
        };
        f.write_str(name)
    }
}

fn fire(command: DebugCommand, seq_offset: u64) -> Step {
    Step::Fire { command, seq_offset }
}

fn resume() -> Step {
    fire(DebugCommand::Continue(ContinueArgs::default()), 0)
}

impl Scenario {
    /// Commands and pauses of the main flow
    pub fn steps(&self, config: &ScenarioConfig) -> Vec<Step> {
        let pause = Step::Pause(config.interval);
        let mut steps = Vec::new();

        match self {
            Scenario::BreakpointCycle => {
                steps.push(fire(DebugCommand::Evaluate(EvaluateArgs::default()), 1));
                steps.push(fire(DebugCommand::SetBreakpoint(SetBreakpointArgs::default()), 6));
                steps.push(pause.clone());
                for _ in 0..3 {
                    steps.push(resume());
                    steps.push(pause.clone());
                }
                steps.push(fire(DebugCommand::ClearBreakpoint(ClearBreakpointArgs::default()), 7));
                steps.push(pause.clone());
                for _ in 0..2 {
                    steps.push(resume());
                    steps.push(pause.clone());
                }
                steps.push(fire(DebugCommand::ListBreakpoints, 8));
                steps.push(pause);
            }
            Scenario::EvaluateCycle => {
                steps.push(fire(DebugCommand::SetBreakpoint(SetBreakpointArgs::default()), 6));
                steps.push(pause.clone());
                for _ in 0..6 {
                    steps.push(resume());
                    steps.push(pause.clone());
                }
                steps.push(fire(DebugCommand::Evaluate(EvaluateArgs::default()), 1));
                steps.push(pause);
            }
            Scenario::Probe => {
                for (offset, command) in DebugCommand::all().into_iter().enumerate() {
                    steps.push(fire(command, offset as u64));
                }
            }
        }

        steps
    }

    /// Documents and waits for the seeding task
    pub fn seed_schedule(&self, config: &ScenarioConfig) -> Vec<SeedStep> {
        use SeedStep::{Document, Wait};

        let mut schedule = Vec::new();
        match self {
            Scenario::BreakpointCycle | Scenario::EvaluateCycle => {
                schedule.extend([Document, Wait(config.short_pause), Document]);
                // one document per expected breakpoint hit
                let hits = if *self == Scenario::EvaluateCycle { 6 } else { 7 };
                for _ in 0..hits {
                    schedule.extend([Wait(config.interval), Document]);
                }
                if *self == Scenario::EvaluateCycle {
                    schedule.push(Wait(config.interval));
                    for _ in 0..10 {
                        schedule.extend([Document, Wait(config.short_pause)]);
                    }
                }
            }
            Scenario::Probe => {}
        }
        schedule
    }
}

/// What a finished session did
#[derive(Debug, Default)]
pub struct SessionReport {
    pub fired: usize,
    pub seeding: SeedReport,
}

/// Run the seeding schedule against `store`, logging and skipping failed writes.
pub async fn run_seed_schedule(
    store: Arc<dyn DocumentStore>,
    schedule: Vec<SeedStep>,
    mut rng: StdRng,
) -> SeedReport {
    let options = UpsertOptions::json().with_ttl(0);
    let mut keys = UniqueKeys::new();
    let mut report = SeedReport::default();

    for step in schedule {
        match step {
            SeedStep::Wait(duration) => tokio::time::sleep(duration).await,
            SeedStep::Document => {
                let drawn = keys.draw(|| {
                    let (key, record) = CreditScore::random(&mut rng, DEBUG_KEY_PREFIX);
                    (key, record.untyped())
                });
                let (key, record) = match drawn {
                    Ok(doc) => doc,
                    Err(e) => {
                        tracing::warn!("Skipping document: {}", e);
                        continue;
                    }
                };

                report.attempted += 1;
                let result = match serde_json::to_value(&record) {
                    Ok(value) => store.upsert(&key, &value, options).await,
                    Err(e) => Err(e.into()),
                };
                match result {
                    Ok(()) => report.written += 1,
                    Err(error) => {
                        tracing::warn!(key = %key, "Upsert failed: {}", error);
                        report.failures.push(SeedFailure { key, error });
                    }
                }
            }
        }
    }

    report
}

/// Play `scenario` against the debug bridge while seeding into `store`.
///
/// Any failed debugger request ends the session with an error.
pub async fn run(
    client: &DebugClient,
    store: Option<Arc<dyn DocumentStore>>,
    scenario: Scenario,
    config: &ScenarioConfig,
    rng: StdRng,
) -> Result<SessionReport> {
    let schedule = scenario.seed_schedule(config);
    let seeder = match store {
        Some(store) if !schedule.is_empty() => {
            Some(tokio::spawn(run_seed_schedule(store, schedule, rng)))
        }
        _ => None,
    };

    tracing::info!(%scenario, base_seq = config.base_seq, "starting debug session");
    let mut report = SessionReport::default();
    for step in scenario.steps(config) {
        match step {
            Step::Fire { command, seq_offset } => {
                client
                    .fire(&command, config.base_seq + seq_offset)
                    .await
                    .with_context(|| format!("{} request failed", command.name()))?;
                report.fired += 1;
            }
            Step::Pause(duration) => tokio::time::sleep(duration).await,
        }
    }

    if let Some(handle) = seeder {
        report.seeding = handle.await.context("Seeding task panicked")?;
    }

    Ok(report)
}
