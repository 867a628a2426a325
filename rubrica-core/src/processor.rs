use crate::config::ParsingConfig;
use crate::outputs::AreaProfile;
use crate::parser::RubricParser;
use crate::types::*;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use std::time::{Duration, Instant};

/// Everything produced from one área document: the tree plus its derived
/// views. Each stage is kept so callers can inspect or dump any boundary.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedArea {
    pub parsed: ParsedArea,
    pub flattened: Vec<FlattenedSection>,
    pub profile: AreaProfile,
    /// Present only when the document was processed with profiling on
    #[serde(skip)]
    pub timings: Option<StageTimings>,
}

/// The stages one área document goes through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Read,
    Parse,
    Flatten,
    Profile,
}

impl Stage {
    pub fn label(self) -> &'static str {
        match self {
            Stage::Read => "read document",
            Stage::Parse => "parse rubric",
            Stage::Flatten => "flatten sections",
            Stage::Profile => "profile área",
        }
    }
}

/// Wall time spent in each stage, in the order the stages ran
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StageTimings {
    entries: Vec<(Stage, Duration)>,
}

impl StageTimings {
    fn record(&mut self, stage: Stage, elapsed: Duration) {
        log::debug!("{} took {}µs", stage.label(), elapsed.as_micros());
        self.entries.push((stage, elapsed));
    }

    pub fn get(&self, stage: Stage) -> Option<Duration> {
        self.entries.iter().find(|(s, _)| *s == stage).map(|(_, d)| *d)
    }

    pub fn stages(&self) -> impl Iterator<Item = Stage> + '_ {
        self.entries.iter().map(|(stage, _)| *stage)
    }

    pub fn total(&self) -> Duration {
        self.entries.iter().map(|(_, d)| *d).sum()
    }

    /// One line per stage: label, milliseconds and share of the total
    pub fn report_lines(&self) -> Vec<String> {
        let total = self.total().as_secs_f64();
        self.entries
            .iter()
            .map(|(stage, elapsed)| {
                let share = if total > 0.0 {
                    elapsed.as_secs_f64() / total * 100.0
                } else {
                    0.0
                };
                format!(
                    "{:<18} {:>9.3} ms {:>5.1}%",
                    stage.label(),
                    elapsed.as_secs_f64() * 1000.0,
                    share
                )
            })
            .collect()
    }
}

/// Run one stage, recording its time when timings are being collected
fn timed<R>(timings: &mut Option<StageTimings>, stage: Stage, run: impl FnOnce() -> R) -> R {
    let Some(timings) = timings.as_mut() else {
        return run();
    };
    let start = Instant::now();
    let result = run();
    timings.record(stage, start.elapsed());
    result
}

/// Read → parse → flatten → profile for one área document
pub struct RubricProcessor {
    parser: RubricParser,
}

impl RubricProcessor {
    pub fn new(config: &ParsingConfig) -> Result<Self> {
        let parser = RubricParser::new(config).context("failed to build rubric parser")?;
        Ok(Self { parser })
    }

    pub fn process_file(
        &self,
        input_path: &Path,
        area: &str,
        enable_profiling: bool,
    ) -> Result<ProcessedArea> {
        let mut timings = enable_profiling.then(StageTimings::default);

        let source = timed(&mut timings, Stage::Read, || std::fs::read_to_string(input_path))
            .with_context(|| format!("failed to read {}", input_path.display()))?;

        self.run_stages(&source, area, timings)
    }

    /// Process markdown already in memory
    pub fn process_str(&self, source: &str, area: &str) -> Result<ProcessedArea> {
        self.run_stages(source, area, None)
    }

    fn run_stages(
        &self,
        source: &str,
        area: &str,
        mut timings: Option<StageTimings>,
    ) -> Result<ProcessedArea> {
        let parsed = timed(&mut timings, Stage::Parse, || self.parser.parse(source, area))
            .with_context(|| format!("failed to parse área '{area}'"))?;
        let flattened = timed(&mut timings, Stage::Flatten, || parsed.flattened_sections());
        let profile = timed(&mut timings, Stage::Profile, || AreaProfile::compute(&parsed, source));

        Ok(ProcessedArea {
            parsed,
            flattened,
            profile,
            timings,
        })
    }
}
