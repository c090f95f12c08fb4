//! Sensor Simulator with Sinusoidal Drift and Spike Injection

use crate::SensorReading;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use tracing::debug;

/// Simulator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatorConfig {
    /// Baseline TDS (ppm)
    pub tds_baseline: f64,
    /// Baseline pH
    pub ph_baseline: f64,
    /// Baseline ORP (mV)
    pub orp_baseline: f64,
    /// Baseline turbidity (NTU)
    pub turbidity_baseline: f64,
    /// Baseline temperature (°C)
    pub temperature_baseline: f64,
    /// Drift period in ticks (one full sinusoid cycle)
    pub drift_period: u64,
    /// Probability per tick of injecting an out-of-range spike
    pub spike_probability: f64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            tds_baseline: 225.0,
            ph_baseline: 7.2,
            orp_baseline: 400.0,
            turbidity_baseline: 0.4,
            temperature_baseline: 22.5,
            drift_period: 120,
            spike_probability: 0.02,
        }
    }
}

/// Per-parameter drift amplitude and noise half-width
struct Channel {
    amplitude: f64,
    noise: f64,
    /// Phase offset so parameters do not drift in lockstep
    phase: f64,
}

/// Drift-based sensor simulator
///
/// Each parameter follows a sinusoid around its baseline plus bounded uniform
/// noise. With `spike_probability` a single parameter is pushed outside its
/// normal operating band for one tick.
pub struct SensorSimulator {
    config: SimulatorConfig,
    rng: StdRng,
    tick: u64,
    channels: [Channel; 5],
}

impl SensorSimulator {
    /// Create a simulator seeded from entropy
    pub fn new(config: SimulatorConfig) -> Self {
        Self::with_seed(config, rand::random())
    }

    /// Create a simulator with a fixed seed (deterministic, for tests)
    pub fn with_seed(config: SimulatorConfig, seed: u64) -> Self {
        let channels = [
            // tds, ph, orp, turbidity, temperature
            Channel { amplitude: 40.0, noise: 8.0, phase: 0.0 },
            Channel { amplitude: 0.4, noise: 0.08, phase: TAU * 0.2 },
            Channel { amplitude: 80.0, noise: 15.0, phase: TAU * 0.4 },
            Channel { amplitude: 0.25, noise: 0.05, phase: TAU * 0.6 },
            Channel { amplitude: 1.5, noise: 0.3, phase: TAU * 0.8 },
        ];
        Self {
            config,
            rng: StdRng::seed_from_u64(seed),
            tick: 0,
            channels,
        }
    }

    /// Generate the next reading
    pub fn next_reading(&mut self) -> SensorReading {
        let t = self.tick as f64 / self.config.drift_period as f64;
        self.tick += 1;

        let mut values = [
            self.config.tds_baseline,
            self.config.ph_baseline,
            self.config.orp_baseline,
            self.config.turbidity_baseline,
            self.config.temperature_baseline,
        ];

        for (value, channel) in values.iter_mut().zip(&self.channels) {
            let drift = channel.amplitude * (TAU * t + channel.phase).sin();
            let noise = self.rng.gen_range(-channel.noise..=channel.noise);
            *value += drift + noise;
        }

        if self.rng.gen_bool(self.config.spike_probability) {
            self.inject_spike(&mut values);
        }

        // Physical floors and ceilings
        values[0] = values[0].max(0.0);
        values[1] = values[1].clamp(0.0, 14.0);
        values[2] = values[2].max(0.0);
        values[3] = values[3].max(0.0);

        SensorReading::now(values[0], values[1], values[2], values[3], values[4])
    }

    /// Push one parameter outside its normal band for a single tick
    fn inject_spike(&mut self, values: &mut [f64; 5]) {
        let which = self.rng.gen_range(0..4usize);
        match which {
            0 => values[0] = self.rng.gen_range(850.0..1200.0), // tds over anomaly band
            1 => {
                values[1] = if self.rng.gen_bool(0.5) {
                    self.rng.gen_range(4.5..5.8)
                } else {
                    self.rng.gen_range(9.2..10.5)
                }
            }
            2 => values[2] = self.rng.gen_range(20.0..80.0), // orp collapse
            _ => values[3] = self.rng.gen_range(5.5..12.0),  // turbidity spike
        }
        debug!(parameter = which, "Injected out-of-range spike");
    }

    /// Number of readings generated so far
    pub fn tick_count(&self) -> u64 {
        self.tick
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_deterministic_with_seed() {
        let mut a = SensorSimulator::with_seed(SimulatorConfig::default(), 42);
        let mut b = SensorSimulator::with_seed(SimulatorConfig::default(), 42);
        for _ in 0..20 {
            let ra = a.next_reading();
            let rb = b.next_reading();
            assert_eq!(ra.tds, rb.tds);
            assert_eq!(ra.ph, rb.ph);
        }
    }

    #[test]
    fn test_no_spikes_stays_near_baseline() {
        let config = SimulatorConfig {
            spike_probability: 0.0,
            ..Default::default()
        };
        let mut sim = SensorSimulator::with_seed(config, 7);
        for _ in 0..500 {
            let r = sim.next_reading();
            assert!(r.tds >= 150.0 && r.tds <= 300.0, "tds {} drifted", r.tds);
            assert!(r.ph >= 6.5 && r.ph <= 8.5, "ph {} drifted", r.ph);
            assert!(r.turbidity <= 1.0, "turbidity {} drifted", r.turbidity);
        }
    }

    #[test]
    fn test_spikes_eventually_injected() {
        let config = SimulatorConfig {
            spike_probability: 0.5,
            ..Default::default()
        };
        let mut sim = SensorSimulator::with_seed(config, 3);
        let spiked = (0..200).any(|_| {
            let r = sim.next_reading();
            r.tds > 800.0 || r.ph < 6.0 || r.ph > 9.0 || r.orp < 100.0 || r.turbidity > 5.0
        });
        assert!(spiked);
    }

    proptest! {
        #[test]
        fn readings_are_always_finite_and_bounded(seed in any::<u64>()) {
            let mut sim = SensorSimulator::with_seed(SimulatorConfig::default(), seed);
            for _ in 0..50 {
                let r = sim.next_reading();
                prop_assert!(r.is_finite());
                prop_assert!(r.ph >= 0.0 && r.ph <= 14.0);
                prop_assert!(r.tds >= 0.0);
                prop_assert!(r.turbidity >= 0.0);
            }
        }
    }
}
