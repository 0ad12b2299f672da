/// Snapshot of the meter display value.
///
/// Both fields are linear amplitudes in `[0.0, 1.0]`. The value is published
/// from the audio render thread as a single packed `u64` so readers always
/// see a consistent (level, peak) pair without taking a lock.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MeterValue {
    pub level: f32,
    pub peak: f32,
}

impl MeterValue {
    pub(crate) fn to_bits(self) -> u64 {
        (u64::from(self.level.to_bits()) << 32) | u64::from(self.peak.to_bits())
    }

    pub(crate) fn from_bits(bits: u64) -> Self {
        Self {
            level: f32::from_bits((bits >> 32) as u32),
            peak: f32::from_bits(bits as u32),
        }
    }
}
