/// Core engine for one forecast evaluation run
///
/// A run:
/// 1. Normalizes the fetched batch (fails fast on malformed samples)
/// 2. Dispatches the two rule pipelines to a worker pool:
///    - overseed: daily aggregation → forward window scan
///    - flood:    rolling accumulation → profile threshold comparison
/// 3. Collects the alerts (overseed first, then flood)
///
/// The engine holds no state between runs. Both pipelines read the same
/// normalized series through an `Arc` and never mutate it.

use std::sync::Arc;
use std::sync::mpsc;

use chrono_tz::Tz;
use threadpool::ThreadPool;

use crate::alert::overseed::{self, OverseedBand};
use crate::alert::flood;
use crate::analysis::{daily, normalize, rolling};
use crate::config::Settings;
use crate::model::{Alert, EngineError, RawSample, Sample, ThresholdProfile};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Local zone for timestamps and calendar-day grouping (default: US/Pacific)
    pub timezone: Tz,

    /// Weather band for the overseed rule
    pub overseed: OverseedBand,

    /// Historical flood profiles compared against rolling totals
    pub profiles: Vec<ThresholdProfile>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            timezone: chrono_tz::US::Pacific,
            overseed: OverseedBand::default(),
            profiles: Vec::new(),
        }
    }
}

impl From<&Settings> for EngineConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            timezone: settings.timezone,
            overseed: settings.overseed.clone(),
            profiles: settings.profiles.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Run output
// ---------------------------------------------------------------------------

/// Everything one run produced.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub sample_count: usize,
    pub day_count: usize,
    pub alerts: Vec<Alert>,
}

impl RunOutcome {
    pub fn has_alerts(&self) -> bool {
        !self.alerts.is_empty()
    }
}

/// Message each pipeline sends back to the coordinating thread.
enum PipelineResult {
    Overseed { day_count: usize, alert: Option<Alert> },
    Flood { alert: Option<Alert> },
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

pub struct Engine {
    config: EngineConfig,
    pool: ThreadPool,
}

impl Engine {
    /// Create an engine with a two-worker pool, one per rule pipeline.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            pool: ThreadPool::with_name("wxwatch-rule".to_string(), 2),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Evaluate one fetched batch of raw samples.
    pub fn run(&self, raw: &[RawSample]) -> Result<RunOutcome, EngineError> {
        let samples = normalize::normalize(raw, self.config.timezone)?;
        log::info!("Normalized {} forecast samples", samples.len());
        self.evaluate(samples)
    }

    /// Evaluate an already normalized series.
    pub fn evaluate(&self, samples: Vec<Sample>) -> Result<RunOutcome, EngineError> {
        let sample_count = samples.len();
        let samples = Arc::new(samples);
        let (tx, rx) = mpsc::channel();

        {
            let samples = Arc::clone(&samples);
            let band = self.config.overseed.clone();
            let tx = tx.clone();
            self.pool.execute(move || {
                let records = daily::aggregate(&samples);
                let day_count = records.len();
                let alert = overseed::evaluate(records, &band).map(Alert::Overseed);
                let _ = tx.send(PipelineResult::Overseed { day_count, alert });
            });
        }

        {
            let samples = Arc::clone(&samples);
            let profiles = self.config.profiles.clone();
            let tx = tx.clone();
            self.pool.execute(move || {
                let rows = rolling::accumulate(&samples);
                let alert = flood::evaluate(&rows, &profiles).map(Alert::Flood);
                let _ = tx.send(PipelineResult::Flood { alert });
            });
        }

        // Only the workers hold senders now; the receiver ends when both finish.
        drop(tx);

        let mut overseed_result = None;
        let mut flood_result = None;
        for result in rx {
            match result {
                PipelineResult::Overseed { day_count, alert } => {
                    overseed_result = Some((day_count, alert));
                }
                PipelineResult::Flood { alert } => flood_result = Some(alert),
            }
        }

        let (day_count, overseed_alert) =
            overseed_result.ok_or(EngineError::PipelineFailed("overseed"))?;
        let flood_alert = flood_result.ok_or(EngineError::PipelineFailed("flood"))?;

        let alerts: Vec<Alert> = overseed_alert.into_iter().chain(flood_alert).collect();

        Ok(RunOutcome {
            sample_count,
            day_count,
            alerts,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
