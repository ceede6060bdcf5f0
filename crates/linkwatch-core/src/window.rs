//! # Bounded Time Window
//!
//! Holds the last [`WINDOW_SECS`] seconds of samples for one interface in a
//! fixed ring of slots indexed by `timestamp mod W`.
//!
//! A slot's stored timestamp is authoritative. Two timestamps exactly `W`
//! apart land on the same index, so membership in the active window is
//! always re-checked against `[newest_ts - (W - 1), newest_ts]` rather than
//! inferred from occupancy.
//!
//! The summary is a full O(W) scan with no running aggregates. Out-of-order
//! arrival, same-second corrections and time jumps therefore cannot leave
//! stale sums behind.

use crate::types::Sample;

/// Window capacity in seconds.
pub const WINDOW_SECS: usize = 45;

const W: i64 = WINDOW_SECS as i64;

#[derive(Debug, Clone, Copy)]
struct Slot {
    ts: i64,
    sample: Sample,
}

/// Averaged view of the samples currently inside the window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowSummary {
    /// The window's notion of "now". Zero before any sample or time tick.
    pub newest_ts: i64,
    /// `newest_ts - (W - 1)`.
    pub oldest_ts: i64,
    /// Slots holding a sample whose timestamp lies in `[oldest_ts, newest_ts]`.
    pub count: usize,
    /// Always [`WINDOW_SECS`].
    pub expected: usize,
    /// `count / W`.
    pub confidence: f64,
    /// `1 - confidence`.
    pub missing_rate: f64,
    /// Per-metric means over the counted samples; all zero when `count == 0`.
    pub averages: Sample,
}

impl WindowSummary {
    fn empty() -> Self {
        WindowSummary {
            newest_ts: 0,
            oldest_ts: 0,
            count: 0,
            expected: WINDOW_SECS,
            confidence: 0.0,
            missing_rate: 1.0,
            averages: Sample::default(),
        }
    }
}

/// Fixed-capacity, timestamp-indexed sample window.
#[derive(Debug, Clone)]
pub struct TimeWindow {
    slots: [Option<Slot>; WINDOW_SECS],
    newest_ts: Option<i64>,
}

impl TimeWindow {
    pub fn new() -> Self {
        TimeWindow {
            slots: [None; WINDOW_SECS],
            newest_ts: None,
        }
    }

    fn index(ts: i64) -> usize {
        ts.rem_euclid(W) as usize
    }

    fn oldest_for(newest: i64) -> i64 {
        newest.saturating_sub(W - 1)
    }

    /// Latest timestamp observed via [`ingest`](Self::ingest) or
    /// [`note_time`](Self::note_time).
    pub fn newest_ts(&self) -> Option<i64> {
        self.newest_ts
    }

    /// Insert or correct the sample for `ts`.
    ///
    /// Returns `false` without touching any slot when `ts` is older than the
    /// window. A newer `ts` advances the window before the age check, so a
    /// sample never moves "now" backwards.
    pub fn ingest(&mut self, ts: i64, sample: Sample) -> bool {
        let newest = match self.newest_ts {
            Some(n) if n >= ts => n,
            _ => ts,
        };
        self.newest_ts = Some(newest);

        if ts < Self::oldest_for(newest) {
            return false;
        }

        // Same ts: correction. Different ts: the previous occupant is
        // outside the window by construction and gets evicted.
        self.slots[Self::index(ts)] = Some(Slot { ts, sample });
        true
    }

    /// Advance the window clock without adding a sample.
    pub fn note_time(&mut self, ts_now: i64) {
        match self.newest_ts {
            Some(n) if n >= ts_now => {}
            _ => self.newest_ts = Some(ts_now),
        }
    }

    fn in_window(&self, ts: i64) -> bool {
        match self.newest_ts {
            Some(newest) => ts >= Self::oldest_for(newest) && ts <= newest,
            None => false,
        }
    }

    /// Whether a sample for exactly `ts` is stored and still inside the window.
    pub fn has_sample(&self, ts: i64) -> bool {
        self.get(ts).is_some()
    }

    /// The stored sample for `ts`, if it is still inside the window.
    pub fn get(&self, ts: i64) -> Option<Sample> {
        if !self.in_window(ts) {
            return None;
        }
        match self.slots[Self::index(ts)] {
            Some(slot) if slot.ts == ts => Some(slot.sample),
            _ => None,
        }
    }

    pub fn summary(&self) -> WindowSummary {
        let Some(newest) = self.newest_ts else {
            return WindowSummary::empty();
        };
        let oldest = Self::oldest_for(newest);

        let (mut rtt, mut tp, mut loss, mut jit) = (0.0, 0.0, 0.0, 0.0);
        let mut count = 0usize;
        for slot in self.slots.iter().flatten() {
            if slot.ts < oldest || slot.ts > newest {
                continue;
            }
            rtt += slot.sample.rtt_ms;
            tp += slot.sample.throughput_mbps;
            loss += slot.sample.loss_pct;
            jit += slot.sample.jitter_ms;
            count += 1;
        }

        let confidence = count as f64 / WINDOW_SECS as f64;
        let averages = if count > 0 {
            let n = count as f64;
            Sample::new(rtt / n, tp / n, loss / n, jit / n)
        } else {
            Sample::default()
        };

        WindowSummary {
            newest_ts: newest,
            oldest_ts: oldest,
            count,
            expected: WINDOW_SECS,
            confidence,
            missing_rate: 1.0 - confidence,
            averages,
        }
    }
}

impl Default for TimeWindow {
    fn default() -> Self {
        Self::new()
    }
}
