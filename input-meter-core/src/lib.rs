//! # input-meter-core
//!
//! Platform-agnostic core for a live input metering pipeline.
//!
//! Activates the shared hardware audio session, runs a capture graph that
//! taps the microphone into a ballistic level meter, survives hardware route
//! changes by rebuilding the graph, and raises a single lost signal when
//! capture can no longer be assumed functional. Platform backends implement
//! the `SessionBackend` and `EngineBackend` traits and plug into the generic
//! `InputMeterController` (see `input-meter-cpal` for the cpal backend).
//!
//! ## Architecture
//!
//! ```text
//! input-meter-core (this crate)
//! ├── traits/       ← SessionBackend, EngineBackend, CaptureGraph
//! ├── models/       ← StartError, ControllerState, MeterValue, MeterConfig, ...
//! ├── processing/   ← MeterKernel (lock-free ballistic level/peak meter)
//! └── session/      ← SessionMonitor, InputMeterController, EventHub
//! ```
//!
//! Data flow: platform notifications → `SessionMonitor` →
//! `InputMeterController` → (rebuild graph) → `MeterTap` → `MeterValue`,
//! pulled by the display layer at its own cadence.

pub mod models;
pub mod processing;
pub mod session;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use models::category::{RawSessionEvent, SessionCategory};
pub use models::config::MeterConfig;
pub use models::error::{ActivationError, GraphError, StartError};
pub use models::meter_value::MeterValue;
pub use models::state::ControllerState;
pub use processing::meter_kernel::{
    decibel_from_linear, linear_from_decibel, MeterHandle, MeterKernel, MeterTap, DB_FLOOR,
};
pub use session::controller::InputMeterController;
pub use session::events::{EventHub, Subscription};
pub use session::monitor::SessionMonitor;
pub use traits::engine_backend::{CaptureGraph, EngineBackend};
pub use traits::session_backend::SessionBackend;
