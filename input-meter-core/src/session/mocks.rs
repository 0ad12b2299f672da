//! Scriptable backends for session and controller tests.

use std::sync::atomic::{AtomicBool, AtomicU16, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::category::SessionCategory;
use crate::models::error::{ActivationError, GraphError};
use crate::processing::meter_kernel::{MeterKernel, MeterTap};
use crate::traits::engine_backend::{CaptureGraph, EngineBackend};
use crate::traits::session_backend::SessionBackend;

/// Session backend with toggleable availability and failure injection.
pub(crate) struct MockSessionBackend {
    pub input_channels: AtomicU16,
    pub output_channels: AtomicU16,
    pub input_available: AtomicBool,
    pub active: AtomicBool,
    pub fail_activation: AtomicBool,
    pub fail_deactivation: AtomicBool,
    pub activation_calls: AtomicUsize,
}

impl MockSessionBackend {
    pub fn new() -> Self {
        Self {
            input_channels: AtomicU16::new(1),
            output_channels: AtomicU16::new(2),
            input_available: AtomicBool::new(true),
            active: AtomicBool::new(false),
            fail_activation: AtomicBool::new(false),
            fail_deactivation: AtomicBool::new(false),
            activation_calls: AtomicUsize::new(0),
        }
    }
}

impl SessionBackend for MockSessionBackend {
    fn set_category(&self, _category: SessionCategory) -> Result<(), ActivationError> {
        Ok(())
    }

    fn set_active(&self, active: bool) -> Result<(), ActivationError> {
        if active {
            self.activation_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_activation.load(Ordering::SeqCst) {
                return Err(ActivationError::ActivateFailed("mock failure".into()));
            }
        } else if self.fail_deactivation.load(Ordering::SeqCst) {
            return Err(ActivationError::ActivateFailed("mock failure".into()));
        }
        self.active.store(active, Ordering::SeqCst);
        Ok(())
    }

    fn input_channel_count(&self) -> u16 {
        self.input_channels.load(Ordering::SeqCst)
    }

    fn output_channel_count(&self) -> u16 {
        self.output_channels.load(Ordering::SeqCst)
    }

    fn is_input_available(&self) -> bool {
        self.input_available.load(Ordering::SeqCst)
    }
}

/// Engine backend that tracks graph lifetimes and hands out the tap it wired,
/// so tests can push sample blocks as if they came from the hardware.
pub(crate) struct MockEngineBackend {
    /// Pretend hardware input sample rate; change it to simulate a reroute
    /// onto a device with a different format.
    pub sample_rate: Mutex<f64>,
    pub fail_next_build: AtomicBool,
    pub build_calls: AtomicUsize,
    pub live_graphs: Arc<AtomicUsize>,
    pub max_live_graphs: Arc<AtomicUsize>,
    pub last_tap: Mutex<Option<Arc<MeterTap>>>,
}

impl MockEngineBackend {
    pub fn new() -> Self {
        Self {
            sample_rate: Mutex::new(48_000.0),
            fail_next_build: AtomicBool::new(false),
            build_calls: AtomicUsize::new(0),
            live_graphs: Arc::new(AtomicUsize::new(0)),
            max_live_graphs: Arc::new(AtomicUsize::new(0)),
            last_tap: Mutex::new(None),
        }
    }
}

impl EngineBackend for MockEngineBackend {
    fn build_graph(&self, kernel: &MeterKernel) -> Result<Box<dyn CaptureGraph>, GraphError> {
        self.build_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_next_build.swap(false, Ordering::SeqCst) {
            return Err(GraphError::StartFailed("mock engine failure".into()));
        }

        let sample_rate = *self.sample_rate.lock();
        let tap = Arc::new(kernel.tap(sample_rate));
        *self.last_tap.lock() = Some(Arc::clone(&tap));

        let live = self.live_graphs.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_live_graphs.fetch_max(live, Ordering::SeqCst);

        Ok(Box::new(MockGraph {
            sample_rate,
            alive: true,
            running: true,
            live_graphs: Arc::clone(&self.live_graphs),
        }))
    }
}

struct MockGraph {
    sample_rate: f64,
    alive: bool,
    running: bool,
    live_graphs: Arc<AtomicUsize>,
}

impl MockGraph {
    fn release(&mut self) {
        if self.alive {
            self.alive = false;
            self.running = false;
            self.live_graphs.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

impl CaptureGraph for MockGraph {
    fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn stop(&mut self) {
        self.release();
    }
}

impl Drop for MockGraph {
    fn drop(&mut self) {
        self.release();
    }
}
