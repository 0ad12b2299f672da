/// Meter ballistics configuration.
///
/// All time constants are expressed independently of block size; the kernel
/// converts them using the sample rate and frame count of each processed
/// block, so the displayed decay is identical whatever cadence the hardware
/// delivers audio at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeterConfig {
    /// Level release rate in dB per second (default: 30.0).
    pub level_release_db_per_sec: f32,

    /// How long a peak is held before it is allowed to fall (default: 1.0s).
    pub peak_hold_secs: f64,

    /// Floor for the decibel transform, keeps `decibel_from_linear(0)` finite
    /// (default: -100.0).
    pub db_floor: f32,
}

impl MeterConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.level_release_db_per_sec <= 0.0 {
            return Err("level release rate must be positive".into());
        }
        if self.peak_hold_secs <= 0.0 {
            return Err("peak hold duration must be positive".into());
        }
        if self.db_floor >= 0.0 {
            return Err("decibel floor must be negative".into());
        }
        Ok(())
    }
}

impl Default for MeterConfig {
    fn default() -> Self {
        Self {
            level_release_db_per_sec: 30.0,
            peak_hold_secs: 1.0,
            db_floor: -100.0,
        }
    }
}
