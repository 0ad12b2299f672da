use crate::models::category::SessionCategory;
use crate::models::error::ActivationError;

/// Interface to the platform's shared audio session.
///
/// Implemented by platform backends (e.g. `CpalSession` in `input-meter-cpal`)
/// and by mocks in tests. Channel counts and input availability must be read
/// live from the hardware on every call, never cached: the whole point of the
/// reroute machinery is that they change underneath us.
pub trait SessionBackend: Send + Sync {
    /// Set the session category (record, playback, ...).
    fn set_category(&self, category: SessionCategory) -> Result<(), ActivationError>;

    /// Activate or deactivate the session.
    fn set_active(&self, active: bool) -> Result<(), ActivationError>;

    /// Current number of hardware input channels.
    fn input_channel_count(&self) -> u16;

    /// Current number of hardware output channels.
    fn output_channel_count(&self) -> u16;

    /// Whether input hardware is reported available at all.
    fn is_input_available(&self) -> bool;
}
