//! Hardware session monitor.
//!
//! Single source of truth for the shared audio session: activation state,
//! live input/output availability, and change notifications. Raw platform
//! events come in through [`SessionMonitor::handle_event`] and fan out as two
//! abstract streams — reroute and lost — with no origin distinction on the
//! lost side.

use std::sync::Arc;

use crate::models::category::{RawSessionEvent, SessionCategory};
use crate::models::error::ActivationError;
use crate::session::events::{EventHub, Subscription};
use crate::traits::session_backend::SessionBackend;

/// Owns the process-wide session handle.
///
/// Construct one per process and share it by `Arc`; the backing platform
/// session is global, so multiple monitors would fight over it.
pub struct SessionMonitor {
    backend: Arc<dyn SessionBackend>,
    reroute_hub: EventHub,
    lost_hub: EventHub,
}

impl SessionMonitor {
    pub fn new(backend: Arc<dyn SessionBackend>) -> Self {
        Self {
            backend,
            reroute_hub: EventHub::new(),
            lost_hub: EventHub::new(),
        }
    }

    /// Set the session category, then activate. No retry on failure.
    pub fn activate(&self, category: SessionCategory) -> Result<(), ActivationError> {
        self.backend.set_category(category)?;
        self.backend.set_active(true)?;
        log::debug!(
            "session activated: category={:?} inputs={} outputs={}",
            category,
            self.backend.input_channel_count(),
            self.backend.output_channel_count()
        );
        Ok(())
    }

    /// Best-effort deactivation. Failures are logged, never surfaced.
    pub fn deactivate(&self) {
        if let Err(err) = self.backend.set_active(false) {
            log::warn!("session deactivation failed: {}", err);
        }
    }

    /// Live query: input hardware available and at least one input channel.
    pub fn has_input(&self) -> bool {
        self.backend.is_input_available() && self.backend.input_channel_count() > 0
    }

    /// Live query: at least one output channel.
    pub fn has_output(&self) -> bool {
        self.backend.output_channel_count() > 0
    }

    /// Translate a raw platform notification into the abstract streams.
    ///
    /// Route changes become reroute events; interruptions (begin and end
    /// alike), media service loss, and media service reset all merge into the
    /// lost stream. One emission per call, however many subscribers exist.
    pub fn handle_event(&self, event: RawSessionEvent) {
        match event {
            RawSessionEvent::RouteChanged => {
                log::debug!("session route changed");
                self.reroute_hub.emit();
            }
            RawSessionEvent::InterruptionBegan
            | RawSessionEvent::InterruptionEnded
            | RawSessionEvent::MediaServicesLost
            | RawSessionEvent::MediaServicesReset => {
                log::debug!("session lost condition: {:?}", event);
                self.lost_hub.emit();
            }
        }
    }

    pub fn subscribe_reroute(&self, listener: impl Fn() + Send + Sync + 'static) -> Subscription {
        self.reroute_hub.subscribe(listener)
    }

    pub fn subscribe_lost(&self, listener: impl Fn() + Send + Sync + 'static) -> Subscription {
        self.lost_hub.subscribe(listener)
    }

    /// Live subscription counts (reroute, lost), for leak checks.
    pub fn subscriber_counts(&self) -> (usize, usize) {
        (
            self.reroute_hub.subscriber_count(),
            self.lost_hub.subscriber_count(),
        )
    }
}
