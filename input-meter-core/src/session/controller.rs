//! Capture session controller.
//!
//! Coordinates the shared session, the capture graph, and the meter kernel:
//! activates the session, builds the graph, replaces the graph when the
//! hardware route changes, and raises a single lost signal when capture can
//! no longer be assumed functional. The controller attempts recovery exactly
//! once per reroute; after a lost emission it sits still until the owner
//! calls [`stop`](InputMeterController::stop).

use std::sync::Arc;

use parking_lot::{Mutex, ReentrantMutex};

use crate::models::category::SessionCategory;
use crate::models::config::MeterConfig;
use crate::models::error::StartError;
use crate::models::meter_value::MeterValue;
use crate::models::state::ControllerState;
use crate::processing::meter_kernel::{MeterHandle, MeterKernel};
use crate::session::events::{EventHub, Subscription};
use crate::session::monitor::SessionMonitor;
use crate::traits::engine_backend::{CaptureGraph, EngineBackend};

/// Mutable controller state. One mutex serializes the whole control path:
/// `start`, `stop`, and reroute recovery never overlap.
struct Inner {
    state: ControllerState,
    graph: Option<Box<dyn CaptureGraph>>,
    subscriptions: Vec<Subscription>,
}

impl Inner {
    fn teardown_graph(&mut self) {
        if let Some(mut graph) = self.graph.take() {
            graph.stop();
        }
    }
}

/// Orchestrates one input-metering capture lifecycle.
///
/// At most one capture graph is live at any time. The meter kernel persists
/// across graph rebuilds, so the displayed decay never jumps on a reroute.
pub struct InputMeterController {
    monitor: Arc<SessionMonitor>,
    engine: Arc<dyn EngineBackend>,
    kernel: Arc<MeterKernel>,
    meter: MeterHandle,
    lost_hub: EventHub,
    inner: Arc<Mutex<Inner>>,
    /// Held for the duration of every lost delivery. `stop()` acquires it
    /// after tearing down, so an emission either completes before `stop()`
    /// returns or sees the idle state and backs off. Reentrant: a listener
    /// may call `stop()` from inside the callback.
    emit_lock: Arc<ReentrantMutex<()>>,
}

impl InputMeterController {
    pub fn new(monitor: Arc<SessionMonitor>, engine: Arc<dyn EngineBackend>) -> Self {
        Self::with_config(monitor, engine, MeterConfig::default())
            .expect("default meter config is valid")
    }

    pub fn with_config(
        monitor: Arc<SessionMonitor>,
        engine: Arc<dyn EngineBackend>,
        config: MeterConfig,
    ) -> Result<Self, String> {
        config.validate()?;
        let kernel = Arc::new(MeterKernel::new(config));
        let meter = kernel.handle();
        Ok(Self {
            monitor,
            engine,
            kernel,
            meter,
            lost_hub: EventHub::new(),
            inner: Arc::new(Mutex::new(Inner {
                state: ControllerState::Idle,
                graph: None,
                subscriptions: Vec::new(),
            })),
            emit_lock: Arc::new(ReentrantMutex::new(())),
        })
    }

    /// Activate the session, wire up event handling, build and start the
    /// capture graph.
    ///
    /// On `InputUnavailable` the session has already been activated; the
    /// caller still owns a `stop()` to deactivate it. On any failure the
    /// state remains `Idle` and no graph or subscription survives.
    pub fn start(&self) -> Result<(), StartError> {
        let mut inner = self.inner.lock();
        if !inner.state.is_idle() {
            return Err(StartError::AlreadyRunning);
        }

        self.monitor
            .activate(SessionCategory::Record)
            .map_err(StartError::SessionSetupFailed)?;

        if !self.monitor.has_input() {
            return Err(StartError::InputUnavailable);
        }

        let reroute_sub = {
            let inner = Arc::clone(&self.inner);
            let engine = Arc::clone(&self.engine);
            let kernel = Arc::clone(&self.kernel);
            let lost_hub = self.lost_hub.clone();
            let emit_lock = Arc::clone(&self.emit_lock);
            self.monitor.subscribe_reroute(move || {
                recover_from_reroute(&inner, engine.as_ref(), &kernel, &lost_hub, &emit_lock);
            })
        };

        // Forward the monitor's lost stream unchanged; the owner gets one
        // merged signal whether the session died or a rebuild failed. Lost
        // conditions keep flowing while the controller sits in the lost
        // state, so an owner that ignored the first signal hears the next.
        let lost_sub = {
            let inner = Arc::clone(&self.inner);
            let lost_hub = self.lost_hub.clone();
            let emit_lock = Arc::clone(&self.emit_lock);
            self.monitor.subscribe_lost(move || {
                let _emitting = emit_lock.lock();
                let deliver = !inner.lock().state.is_idle();
                if deliver {
                    lost_hub.emit();
                }
            })
        };

        let graph = self
            .engine
            .build_graph(&self.kernel)
            .map_err(StartError::EngineStartFailed)?;
        log::debug!("capture graph started at {} Hz", graph.sample_rate());

        inner.graph = Some(graph);
        inner.subscriptions = vec![reroute_sub, lost_sub];
        inner.state = ControllerState::Running;
        Ok(())
    }

    /// Tear everything down. Idempotent, infallible, callable from any state.
    ///
    /// Serialized against reroute recovery on the controller's state lock,
    /// and waits out any in-flight lost emission on the emission lock, so
    /// once this returns there is no graph, no subscription, and no further
    /// lost or reroute delivery for this controller.
    pub fn stop(&self) {
        let subscriptions = {
            let mut inner = self.inner.lock();
            inner.teardown_graph();
            inner.state = ControllerState::Idle;
            std::mem::take(&mut inner.subscriptions)
        };
        drop(subscriptions);
        drop(self.emit_lock.lock());
        self.monitor.deactivate();
    }

    /// Latest meter value: zeroed before the first processed block, frozen at
    /// the last computed value after `stop()`.
    pub fn meter_value(&self) -> MeterValue {
        self.meter.value()
    }

    pub fn state(&self) -> ControllerState {
        self.inner.lock().state
    }

    /// Subscribe to the lost signal. Fired when the session reports an
    /// interruption or media-service loss, or when reroute recovery fails;
    /// the two causes are deliberately indistinguishable.
    pub fn subscribe_lost(&self, listener: impl Fn() + Send + Sync + 'static) -> Subscription {
        self.lost_hub.subscribe(listener)
    }
}

impl Drop for InputMeterController {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Reroute recovery: replace the graph using whatever the hardware input
/// format now is. Runs under the controller state lock; a concurrent `stop()`
/// either finishes first (recovery then sees `Idle` and backs off) or waits
/// for recovery to complete.
fn recover_from_reroute(
    inner: &Mutex<Inner>,
    engine: &dyn EngineBackend,
    kernel: &MeterKernel,
    lost_hub: &EventHub,
    emit_lock: &ReentrantMutex<()>,
) {
    let mut guard = inner.lock();
    if !guard.state.is_running() {
        return;
    }

    guard.teardown_graph();
    match engine.build_graph(kernel) {
        Ok(graph) => {
            log::debug!("reroute recovery: graph rebuilt at {} Hz", graph.sample_rate());
            guard.graph = Some(graph);
        }
        Err(err) => {
            log::warn!("reroute recovery failed: {}", err);
            guard.state = ControllerState::Lost;
            drop(guard);
            // Emit outside the state lock so a listener may call stop()
            // directly, but under the emission lock so stop() can wait the
            // delivery out. Re-check first: if stop() already won, the
            // controller is idle and owes its owner no signal.
            let _emitting = emit_lock.lock();
            if inner.lock().state.is_lost() {
                lost_hub.emit();
            }
        }
    }
}
