//! Ballistic input level meter.
//!
//! The kernel turns a stream of sample blocks into a decaying (level, peak)
//! pair. The render side is a single writer publishing a packed `u64` with
//! relaxed atomics; the control/display side reads it with one atomic load.
//! Nothing on the render path allocates, locks, or logs.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::models::config::MeterConfig;
use crate::models::meter_value::MeterValue;

/// Default floor used by the free decibel transform.
pub const DB_FLOOR: f32 = -100.0;

/// Linear amplitude in `[0, 1]` to decibels, floored so silence maps to a
/// finite value instead of negative infinity. `decibel_from_linear(1.0) == 0`.
pub fn decibel_from_linear(linear: f32) -> f32 {
    decibel_from_linear_floored(linear, DB_FLOOR)
}

/// Decibels back to linear amplitude. Values at or below the default floor
/// collapse to zero.
pub fn linear_from_decibel(decibel: f32) -> f32 {
    if decibel <= DB_FLOOR {
        return 0.0;
    }
    10.0_f32.powf(decibel / 20.0)
}

fn decibel_from_linear_floored(linear: f32, floor: f32) -> f32 {
    let clamped = linear.clamp(0.0, 1.0);
    if clamped <= 10.0_f32.powf(floor / 20.0) {
        return floor;
    }
    20.0 * clamped.log10()
}

/// State shared between the tap (writer) and handles (readers).
struct KernelShared {
    /// Packed `MeterValue`, see [`MeterValue::to_bits`].
    value: AtomicU64,
    /// Seconds since the held peak was last refreshed, as `f64` bits.
    /// Written only by the tap; stored atomically so taps can migrate across
    /// capture threads when the graph is rebuilt.
    peak_hold: AtomicU64,
}

/// Owns the meter state for one controller lifetime.
///
/// The kernel outlives any individual capture graph: a reroute rebuilds the
/// graph and creates a fresh [`MeterTap`] at the new hardware sample rate, but
/// the accumulated level and held peak carry over untouched.
pub struct MeterKernel {
    config: MeterConfig,
    shared: Arc<KernelShared>,
}

impl MeterKernel {
    pub fn new(config: MeterConfig) -> Self {
        Self {
            config,
            shared: Arc::new(KernelShared {
                value: AtomicU64::new(MeterValue::default().to_bits()),
                peak_hold: AtomicU64::new(0.0_f64.to_bits()),
            }),
        }
    }

    /// Latest computed value. Zeroed until the first block is processed.
    pub fn value(&self) -> MeterValue {
        MeterValue::from_bits(self.shared.value.load(Ordering::Relaxed))
    }

    /// Cheap cloneable reader for the display side.
    pub fn handle(&self) -> MeterHandle {
        MeterHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Create a per-graph processor bound to the graph's input sample rate.
    pub fn tap(&self, sample_rate: f64) -> MeterTap {
        MeterTap {
            config: self.config,
            shared: Arc::clone(&self.shared),
            sample_rate: sample_rate.max(1.0),
        }
    }
}

/// Read-only view of the latest meter value.
#[derive(Clone)]
pub struct MeterHandle {
    shared: Arc<KernelShared>,
}

impl MeterHandle {
    pub fn value(&self) -> MeterValue {
        MeterValue::from_bits(self.shared.value.load(Ordering::Relaxed))
    }
}

/// Per-graph block processor, invoked from the audio render callback.
///
/// At most one tap is live at a time (the controller keeps at most one graph),
/// so the single-writer invariant on the shared state holds.
pub struct MeterTap {
    config: MeterConfig,
    shared: Arc<KernelShared>,
    sample_rate: f64,
}

impl MeterTap {
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Process one block of planar (one slice per channel) samples.
    pub fn process_planar(&self, buffers: &[&[f32]]) {
        let frames = buffers.iter().map(|b| b.len()).max().unwrap_or(0);
        if frames == 0 {
            return;
        }

        let mut peak = 0.0_f32;
        let mut sum_sq = 0.0_f32;
        let mut count = 0usize;
        for buffer in buffers {
            for &sample in *buffer {
                peak = peak.max(sample.abs());
                sum_sq += sample * sample;
                count += 1;
            }
        }
        let rms = if count > 0 {
            (sum_sq / count as f32).sqrt()
        } else {
            0.0
        };

        self.update(peak, rms, frames);
    }

    /// Process one block of interleaved samples.
    pub fn process_interleaved(&self, samples: &[f32], channels: u16) {
        let channels = usize::from(channels.max(1));
        let frames = samples.len() / channels;
        if frames == 0 {
            return;
        }

        let mut peak = 0.0_f32;
        let mut sum_sq = 0.0_f32;
        for &sample in samples {
            peak = peak.max(sample.abs());
            sum_sq += sample * sample;
        }
        let rms = (sum_sq / samples.len() as f32).sqrt();

        self.update(peak, rms, frames);
    }

    /// Ballistics: level attacks instantly to the block RMS and releases at a
    /// fixed dB/s rate; peak is held until overtaken or the hold expires.
    fn update(&self, block_peak: f32, block_rms: f32, frames: usize) {
        let dt = frames as f64 / self.sample_rate;
        let prev = MeterValue::from_bits(self.shared.value.load(Ordering::Relaxed));

        let decayed = if prev.level > 0.0 {
            let db = decibel_from_linear_floored(prev.level, self.config.db_floor)
                - self.config.level_release_db_per_sec * dt as f32;
            if db <= self.config.db_floor {
                0.0
            } else {
                10.0_f32.powf(db / 20.0)
            }
        } else {
            0.0
        };

        let level = decayed.max(block_rms.min(1.0)).clamp(0.0, 1.0);

        let mut hold = f64::from_bits(self.shared.peak_hold.load(Ordering::Relaxed)) + dt;
        let candidate = level.max(block_peak.min(1.0));
        let refresh = prev.peak < candidate || hold > self.config.peak_hold_secs;
        if refresh {
            hold = 0.0;
        }
        let peak = if refresh { candidate } else { prev.peak };

        self.shared.peak_hold.store(hold.to_bits(), Ordering::Relaxed);
        self.shared
            .value
            .store(MeterValue { level, peak }.to_bits(), Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn kernel() -> MeterKernel {
        MeterKernel::new(MeterConfig::default())
    }

    #[test]
    fn decibel_of_silence_is_floored_and_finite() {
        let db = decibel_from_linear(0.0);
        assert!(db.is_finite());
        assert_eq!(db, DB_FLOOR);
    }

    #[test]
    fn decibel_of_full_scale_is_zero() {
        assert_relative_eq!(decibel_from_linear(1.0), 0.0);
    }

    #[test]
    fn decibel_linear_round_trip() {
        for &linear in &[0.001_f32, 0.1, 0.5, 1.0] {
            assert_relative_eq!(
                linear_from_decibel(decibel_from_linear(linear)),
                linear,
                epsilon = 1e-4
            );
        }
    }

    #[test]
    fn value_is_zeroed_before_first_block() {
        assert_eq!(kernel().value(), MeterValue::default());
    }

    #[test]
    fn attack_is_immediate() {
        let kernel = kernel();
        let tap = kernel.tap(48_000.0);
        tap.process_interleaved(&[0.5; 480], 1);

        let value = kernel.value();
        assert_relative_eq!(value.level, 0.5, epsilon = 1e-6);
        assert_relative_eq!(value.peak, 0.5, epsilon = 1e-6);
    }

    #[test]
    fn level_and_peak_clamp_to_unity_on_overdriven_input() {
        let kernel = kernel();
        let tap = kernel.tap(48_000.0);
        tap.process_interleaved(&[5.0, -7.0, 3.0, 5.0], 1);

        let value = kernel.value();
        assert!(value.level <= 1.0);
        assert!(value.peak <= 1.0);
        assert_relative_eq!(value.peak, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn level_releases_at_configured_rate() {
        let kernel = kernel();
        let tap = kernel.tap(48_000.0);
        tap.process_interleaved(&[1.0; 4800], 1); // full scale, 100ms

        // One second of silence at 30 dB/s release: expect -30 dB.
        for _ in 0..10 {
            tap.process_interleaved(&[0.0; 4800], 1);
        }
        let level = kernel.value().level;
        assert_relative_eq!(decibel_from_linear(level), -30.0, epsilon = 0.5);
    }

    #[test]
    fn release_is_independent_of_block_size() {
        let coarse = kernel();
        coarse.tap(48_000.0).process_interleaved(&[1.0; 480], 1);
        coarse.tap(48_000.0).process_interleaved(&[0.0; 9600], 1);

        let fine = kernel();
        fine.tap(48_000.0).process_interleaved(&[1.0; 480], 1);
        let tap = fine.tap(48_000.0);
        for _ in 0..20 {
            tap.process_interleaved(&[0.0; 480], 1);
        }

        assert_relative_eq!(
            coarse.value().level,
            fine.value().level,
            epsilon = 1e-4
        );
    }

    #[test]
    fn peak_holds_then_falls_after_hold_duration() {
        let kernel = kernel();
        let tap = kernel.tap(48_000.0);
        tap.process_interleaved(&[0.9; 480], 1);
        assert_relative_eq!(kernel.value().peak, 0.9, epsilon = 1e-6);

        // Half a second of quiet signal: peak still held.
        for _ in 0..50 {
            tap.process_interleaved(&[0.1; 480], 1);
        }
        assert_relative_eq!(kernel.value().peak, 0.9, epsilon = 1e-6);

        // Past the 1s hold the peak drops to the current candidate.
        for _ in 0..60 {
            tap.process_interleaved(&[0.1; 480], 1);
        }
        assert!(kernel.value().peak < 0.9);
    }

    #[test]
    fn decay_state_survives_tap_replacement() {
        let kernel = kernel();
        kernel.tap(48_000.0).process_interleaved(&[1.0; 480], 1);
        let before = kernel.value();

        // New tap at a different rate, as after a reroute rebuild.
        let retapped = kernel.tap(44_100.0);
        assert_eq!(kernel.value(), before);
        retapped.process_interleaved(&[0.0; 441], 1);
        let after = kernel.value();
        assert!(after.level < before.level);
        assert_eq!(after.peak, before.peak);
    }

    #[test]
    fn handle_reads_latest_value_from_tap_writes() {
        let kernel = kernel();
        let handle = kernel.handle();
        assert_eq!(handle.value(), MeterValue::default());

        kernel.tap(48_000.0).process_interleaved(&[0.4; 480], 1);
        assert_eq!(handle.value(), kernel.value());
        assert_relative_eq!(handle.value().level, 0.4, epsilon = 1e-6);
    }

    #[test]
    fn planar_matches_interleaved_for_mono() {
        let samples = [0.3_f32, -0.6, 0.2, 0.4];

        let a = kernel();
        a.tap(48_000.0).process_planar(&[&samples]);
        let b = kernel();
        b.tap(48_000.0).process_interleaved(&samples, 1);

        assert_eq!(a.value(), b.value());
    }

    #[test]
    fn empty_block_is_ignored() {
        let kernel = kernel();
        let tap = kernel.tap(48_000.0);
        tap.process_interleaved(&[0.8; 480], 1);
        let before = kernel.value();
        tap.process_interleaved(&[], 1);
        tap.process_planar(&[]);
        assert_eq!(kernel.value(), before);
    }
}
