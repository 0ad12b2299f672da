use thiserror::Error;

/// Errors from activating the shared hardware audio session.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ActivationError {
    #[error("setting session category failed: {0}")]
    CategoryFailed(String),

    #[error("activating session failed: {0}")]
    ActivateFailed(String),
}

/// Errors from building or starting a capture graph.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("no input device available")]
    InputUnavailable,

    #[error("graph construction failed: {0}")]
    BuildFailed(String),

    #[error("graph start failed: {0}")]
    StartFailed(String),
}

/// Errors returned by [`InputMeterController::start`](crate::InputMeterController::start).
///
/// `stop()` has no error type: teardown failures are logged and dropped so a
/// caller discarding the resource is never blocked.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StartError {
    /// The controller is not idle. Calling `start()` twice without an
    /// intervening `stop()` is a contract violation, not a no-op; this also
    /// covers a controller sitting in the lost state.
    #[error("controller is already running")]
    AlreadyRunning,

    #[error("session setup failed")]
    SessionSetupFailed(#[source] ActivationError),

    #[error("no usable input hardware")]
    InputUnavailable,

    #[error("engine start failed")]
    EngineStartFailed(#[source] GraphError),
}
