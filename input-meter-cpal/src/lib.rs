//! # input-meter-cpal
//!
//! Cross-platform cpal backend for input-meter-kit.
//!
//! Provides:
//! - `CpalSession` — `SessionBackend` over the default cpal host's devices
//! - `CpalEngine` — `EngineBackend` building a capture graph from the default
//!   input device into a `MeterTap`
//!
//! cpal has no portable route-change or interruption notifications, so the
//! embedding application feeds those into `SessionMonitor::handle_event`
//! itself from whatever OS hook it has available.
//!
//! ## Usage
//! ```ignore
//! use std::sync::Arc;
//! use input_meter_core::{InputMeterController, SessionMonitor};
//! use input_meter_cpal::{CpalEngine, CpalSession};
//!
//! let monitor = Arc::new(SessionMonitor::new(Arc::new(CpalSession::new())));
//! let controller = InputMeterController::new(monitor, Arc::new(CpalEngine::new()));
//! controller.start()?;
//! let value = controller.meter_value();
//! ```

pub mod engine;
pub mod session;

pub use engine::CpalEngine;
pub use session::CpalSession;
