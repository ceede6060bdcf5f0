//! # Link Quality Scoring
//!
//! Composite quality score in `[0, 1]` (1 = best) from the window averages.
//!
//! $$\text{raw} = w_{tp} \cdot \text{norm}(tp) + w_{rtt} \cdot \text{norm}(rtt) + w_{loss} \cdot \text{norm}(loss) + w_{jit} \cdot \text{norm}(jit)$$
//!
//! Throughput is higher-is-better (`v / max`); RTT, loss and jitter are
//! lower-is-better (`1 - (v - min) / (max - min)`). Every normalised term and
//! the sum are clamped to `[0, 1]`. An empty window scores 0.
//!
//! The smoothed score is an EWMA over successive raw scores, optionally
//! pushed down further whenever the raw score falls below it so the series
//! reacts faster to degradation than to recovery.

pub mod ewma;

use serde::Serialize;

use crate::config::{MetricRange, ScoreConfig, ScoreStrategy};
use crate::window::WindowSummary;
use ewma::Ewma;

/// Clamp to `[0, 1]`, mapping NaN to 0.
pub fn clamp01(x: f64) -> f64 {
    if x.is_nan() {
        return 0.0;
    }
    x.clamp(0.0, 1.0)
}

/// Higher-is-better metric (throughput).
pub fn normalize_higher_better(value: f64, range: MetricRange) -> f64 {
    clamp01(value / range.max)
}

/// Lower-is-better metric (RTT, loss, jitter).
pub fn normalize_lower_better(value: f64, range: MetricRange) -> f64 {
    clamp01(1.0 - (value - range.min) / (range.max - range.min))
}

/// Weighted raw score for a window summary.
pub fn raw_score(summary: &WindowSummary, config: &ScoreConfig) -> f64 {
    if summary.count == 0 {
        return 0.0;
    }
    let avg = &summary.averages;
    let r = &config.ranges;
    let w = &config.weights;

    let score = w.throughput * normalize_higher_better(avg.throughput_mbps, r.throughput_mbps)
        + w.rtt * normalize_lower_better(avg.rtt_ms, r.rtt_ms)
        + w.loss * normalize_lower_better(avg.loss_pct, r.loss_pct)
        + w.jitter * normalize_lower_better(avg.jitter_ms, r.jitter_ms);

    clamp01(score)
}

/// Scores computed on one recompute. All values lie in `[0, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ScoreState {
    pub score_raw: f64,
    pub score_smoothed: f64,
    /// The score handed to the state machine, after the confidence cap.
    pub score_used: f64,
    pub confidence: f64,
}

/// Per-interface scoring state: configuration plus the EWMA history.
#[derive(Debug, Clone)]
pub struct ScoreModel {
    config: ScoreConfig,
    smoother: Ewma,
}

impl ScoreModel {
    pub fn new(config: ScoreConfig) -> Self {
        let smoother = Ewma::new(config.ewma_alpha);
        ScoreModel { config, smoother }
    }

    pub fn config(&self) -> &ScoreConfig {
        &self.config
    }

    /// Compute raw and smoothed scores and select the active one.
    ///
    /// The EWMA is seeded by the first summary that contains samples, so an
    /// empty window at start-up does not drag the smoothed series up from 0.
    pub fn evaluate(&mut self, summary: &WindowSummary) -> ScoreState {
        let score_raw = raw_score(summary, &self.config);
        let score_smoothed = if summary.count == 0 && !self.smoother.is_initialized() {
            score_raw
        } else {
            self.smooth(score_raw)
        };
        let confidence = clamp01(summary.confidence);

        let mut used = match self.config.strategy {
            ScoreStrategy::Raw => score_raw,
            ScoreStrategy::Smoothed => score_smoothed,
        };
        if self.config.enable_confidence_cap && confidence < self.config.confidence_cap_threshold
        {
            used = used.min(self.config.confidence_cap_value);
        }

        ScoreState {
            score_raw,
            score_smoothed,
            score_used: clamp01(used),
            confidence,
        }
    }

    fn smooth(&mut self, raw: f64) -> f64 {
        if !self.smoother.is_initialized() {
            self.smoother.update(raw);
            return clamp01(self.smoother.value());
        }

        let prev = self.smoother.value();
        self.smoother.update(raw);
        let mut next = self.smoother.value();
        if self.config.enable_downtrend_penalty && raw < prev {
            next -= self.config.downtrend_penalty;
        }
        let next = clamp01(next);
        self.smoother.set(next);
        next
    }
}
