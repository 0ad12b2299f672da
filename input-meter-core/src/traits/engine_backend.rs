use crate::models::error::GraphError;
use crate::processing::meter_kernel::MeterKernel;

/// A live, started capture graph: hardware input wired into a meter tap.
///
/// Built whole and torn down whole; the controller never mutates a graph in
/// place. `stop()` is infallible by contract — a graph being discarded must
/// not fail its caller.
pub trait CaptureGraph: Send {
    /// Sample rate of the hardware input format this graph was built against.
    fn sample_rate(&self) -> f64;

    /// Whether the graph is currently delivering audio.
    fn is_running(&self) -> bool;

    /// Stop the graph and release its resources.
    fn stop(&mut self);
}

/// Factory for capture graphs.
///
/// `build_graph` queries the current hardware input format, creates a tap on
/// `kernel` at that sample rate, wires input → tap, and starts the graph. It
/// is called once per `start()` and once per reroute recovery, so each rebuild
/// picks up whatever the input format has become.
pub trait EngineBackend: Send + Sync {
    fn build_graph(&self, kernel: &MeterKernel) -> Result<Box<dyn CaptureGraph>, GraphError>;
}
