//! Deterministic per-second samples for four router-like interfaces.
//!
//! Each [`ScenarioId`] shapes one or two interfaces over time; the rest keep
//! their baseline. [`ImperfectDataConfig`] drops and delays samples on a
//! fixed, interface-salted schedule, and optional seeded noise perturbs the
//! metrics. For a given configuration the output depends only on
//! `(iface, t)`.

use linkwatch_core::types::Sample;
use rand::RngExt as _;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;

/// Interfaces every scenario knows about, in ingest order.
pub const INTERFACES: [&str; 4] = ["eth0", "wifi0", "lte0", "sat0"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ScenarioId {
    /// wifi0 degrades over 40 s, recovers over 30 s.
    A,
    /// wifi0 spikes for 4 s at the start of every 15 s period.
    B,
    /// wifi0 slower but clean; lte0 fast but lossy and jittery.
    C,
    /// Baselines only.
    D,
}

impl ScenarioId {
    pub const ALL: [ScenarioId; 4] = [ScenarioId::A, ScenarioId::B, ScenarioId::C, ScenarioId::D];
}

impl std::fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScenarioId::A => write!(f, "A"),
            ScenarioId::B => write!(f, "B"),
            ScenarioId::C => write!(f, "C"),
            ScenarioId::D => write!(f, "D"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown scenario: {0} (use A|B|C|D)")]
pub struct UnknownScenario(pub String);

impl std::str::FromStr for ScenarioId {
    type Err = UnknownScenario;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "A" | "a" => Ok(ScenarioId::A),
            "B" | "b" => Ok(ScenarioId::B),
            "C" | "c" => Ok(ScenarioId::C),
            "D" | "d" => Ok(ScenarioId::D),
            other => Err(UnknownScenario(other.to_string())),
        }
    }
}

/// Deterministic missing and late samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImperfectDataConfig {
    pub enable_missing: bool,
    pub enable_late: bool,
    /// Drop when `(t + len(iface)) % drop_every_n == 0`. 0 disables.
    pub drop_every_n: i64,
    /// Delay when `(t + first_byte(iface)) % late_every_n == 0`. 0 disables.
    pub late_every_n: i64,
    /// How far back a late sample's timestamp is set.
    pub late_by_sec: i64,
}

impl Default for ImperfectDataConfig {
    fn default() -> Self {
        Self {
            enable_missing: true,
            enable_late: true,
            drop_every_n: 10,
            late_every_n: 12,
            late_by_sec: 2,
        }
    }
}

impl ImperfectDataConfig {
    /// Perfect delivery: every sample, on time.
    pub fn disabled() -> Self {
        Self {
            enable_missing: false,
            enable_late: false,
            ..Default::default()
        }
    }
}

/// Seeded multiplicative noise applied to every metric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseConfig {
    /// Maximum relative deviation in percent.
    pub pct: f64,
    pub seed: u64,
}

/// One emitted sample. `ts` differs from the tick when the sample is late.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneratedSample {
    pub ts: i64,
    pub sample: Sample,
}

const WIFI_GOOD: Sample = Sample {
    rtt_ms: 35.0,
    throughput_mbps: 110.0,
    loss_pct: 0.5,
    jitter_ms: 6.0,
};

const WIFI_BAD: Sample = Sample {
    rtt_ms: 300.0,
    throughput_mbps: 30.0,
    loss_pct: 12.0,
    jitter_ms: 80.0,
};

const WIFI_SPIKE: Sample = Sample {
    rtt_ms: 350.0,
    throughput_mbps: 90.0,
    loss_pct: 10.0,
    jitter_ms: 70.0,
};

#[derive(Debug, Clone)]
pub struct ScenarioGenerator {
    id: ScenarioId,
    imperfect: ImperfectDataConfig,
    noise: Option<NoiseConfig>,
}

impl ScenarioGenerator {
    pub fn new(id: ScenarioId, imperfect: ImperfectDataConfig) -> Self {
        Self {
            id,
            imperfect,
            noise: None,
        }
    }

    pub fn with_noise(mut self, noise: NoiseConfig) -> Self {
        self.noise = Some(noise);
        self
    }

    pub fn id(&self) -> ScenarioId {
        self.id
    }

    /// Sample for `iface` at tick `t`, or `None` if it was dropped or the
    /// interface is unknown.
    pub fn sample(&self, iface: &str, t: i64) -> Option<GeneratedSample> {
        let imp = &self.imperfect;
        if imp.enable_missing && imp.drop_every_n > 0 {
            let salt = iface.len() as i64;
            if (t + salt).rem_euclid(imp.drop_every_n) == 0 {
                return None;
            }
        }

        let mut ts = t;
        if imp.enable_late && imp.late_every_n > 0 {
            let salt = iface.bytes().next().map_or(0, i64::from);
            if (t + salt).rem_euclid(imp.late_every_n) == 0 {
                ts = t - imp.late_by_sec;
            }
        }

        let sample = match iface {
            "eth0" => Sample::new(20.0, 180.0, 0.1, 3.0),
            "sat0" => Sample::new(550.0, 60.0, 0.5, 25.0),
            "lte0" => self.lte0(t),
            "wifi0" => self.wifi0(t),
            _ => return None,
        };

        let sample = match self.noise {
            Some(noise) => perturb(sample, noise, iface, t),
            None => sample,
        };
        Some(GeneratedSample { ts, sample })
    }

    fn lte0(&self, t: i64) -> Sample {
        if self.id == ScenarioId::C {
            let loss = 8.0 + t.rem_euclid(5) as f64;
            let jitter = 60.0 + 3.0 * t.rem_euclid(7) as f64;
            return Sample::new(95.0, 160.0, loss, jitter);
        }
        let w = t.rem_euclid(10) as f64 * 0.3;
        Sample::new(90.0 + w, 90.0, 1.0, 10.0 + 0.5 * w)
    }

    fn wifi0(&self, t: i64) -> Sample {
        match self.id {
            ScenarioId::A if t < 40 => lerp(WIFI_GOOD, WIFI_BAD, t as f64 / 40.0),
            ScenarioId::A if t < 70 => lerp(WIFI_BAD, WIFI_GOOD, (t - 40) as f64 / 30.0),
            ScenarioId::B if t.rem_euclid(15) < 4 => WIFI_SPIKE,
            ScenarioId::C => Sample {
                throughput_mbps: 70.0,
                loss_pct: 0.3,
                jitter_ms: 5.0,
                ..WIFI_GOOD
            },
            _ => WIFI_GOOD,
        }
    }
}

fn lerp(a: Sample, b: Sample, u: f64) -> Sample {
    let u = u.clamp(0.0, 1.0);
    let mix = |x: f64, y: f64| x + (y - x) * u;
    Sample {
        rtt_ms: mix(a.rtt_ms, b.rtt_ms),
        throughput_mbps: mix(a.throughput_mbps, b.throughput_mbps),
        loss_pct: mix(a.loss_pct, b.loss_pct),
        jitter_ms: mix(a.jitter_ms, b.jitter_ms),
    }
}

/// Scale each metric by `1 ± pct%`, drawn from an RNG keyed on
/// `(seed, iface, t)` so call order does not matter.
fn perturb(sample: Sample, noise: NoiseConfig, iface: &str, t: i64) -> Sample {
    let mut key = noise.seed ^ (t as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    for b in iface.bytes() {
        key = key.rotate_left(7) ^ u64::from(b);
    }
    let mut rng = StdRng::seed_from_u64(key);
    let amp = noise.pct.max(0.0) / 100.0;
    let mut jitter = |v: f64| (v * (1.0 + amp * (rng.random::<f64>() * 2.0 - 1.0))).max(0.0);
    Sample {
        rtt_ms: jitter(sample.rtt_ms),
        throughput_mbps: jitter(sample.throughput_mbps),
        loss_pct: jitter(sample.loss_pct),
        jitter_ms: jitter(sample.jitter_ms),
    }
}
