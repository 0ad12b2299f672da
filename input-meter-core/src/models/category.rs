/// Audio session category requested on activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionCategory {
    Record,
    Playback,
    PlayAndRecord,
}

impl SessionCategory {
    /// Whether this category needs input hardware to be useful.
    pub fn needs_input(&self) -> bool {
        matches!(self, Self::Record | Self::PlayAndRecord)
    }
}

/// Raw hardware/OS session notification, as delivered by a platform backend.
///
/// The [`SessionMonitor`](crate::SessionMonitor) collapses these into two
/// abstract streams: `RouteChanged` becomes a reroute event, everything else
/// merges into a single lost event with no origin distinction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawSessionEvent {
    RouteChanged,
    InterruptionBegan,
    InterruptionEnded,
    MediaServicesLost,
    MediaServicesReset,
}
