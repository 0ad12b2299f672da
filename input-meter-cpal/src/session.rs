//! cpal-backed session backend.
//!
//! cpal exposes no session/activation concept, so activation here means
//! verifying that the devices the requested category needs actually exist.
//! Channel counts are read from the default device configs on every call —
//! the host is re-acquired per query so a device swap is always visible.

use std::sync::atomic::{AtomicBool, Ordering};

use cpal::traits::{DeviceTrait, HostTrait};
use parking_lot::Mutex;

use input_meter_core::{ActivationError, SessionBackend, SessionCategory};

pub struct CpalSession {
    category: Mutex<Option<SessionCategory>>,
    active: AtomicBool,
}

impl CpalSession {
    pub fn new() -> Self {
        Self {
            category: Mutex::new(None),
            active: AtomicBool::new(false),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

impl Default for CpalSession {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionBackend for CpalSession {
    fn set_category(&self, category: SessionCategory) -> Result<(), ActivationError> {
        *self.category.lock() = Some(category);
        Ok(())
    }

    fn set_active(&self, active: bool) -> Result<(), ActivationError> {
        if !active {
            self.active.store(false, Ordering::SeqCst);
            return Ok(());
        }

        let category = *self.category.lock();
        let needs_input = category.is_some_and(|c| c.needs_input());
        if needs_input && cpal::default_host().default_input_device().is_none() {
            return Err(ActivationError::ActivateFailed(
                "no default input device".into(),
            ));
        }

        self.active.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn input_channel_count(&self) -> u16 {
        cpal::default_host()
            .default_input_device()
            .and_then(|device| device.default_input_config().ok())
            .map(|config| config.channels())
            .unwrap_or(0)
    }

    fn output_channel_count(&self) -> u16 {
        cpal::default_host()
            .default_output_device()
            .and_then(|device| device.default_output_config().ok())
            .map(|config| config.channels())
            .unwrap_or(0)
    }

    fn is_input_available(&self) -> bool {
        cpal::default_host().default_input_device().is_some()
    }
}
