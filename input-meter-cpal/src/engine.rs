//! cpal-backed capture graph.
//!
//! `cpal::Stream` is `!Send`, so each graph owns a dedicated capture thread:
//! the thread builds the stream against the current default input device,
//! starts it, reports the outcome over a rendezvous channel, then parks until
//! told to stop. Every supported sample format is converted to f32 at the
//! callback so the meter tap stays format-agnostic.

use std::thread;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleFormat, StreamConfig};
use crossbeam_channel::{bounded, Receiver, Sender};

use input_meter_core::{CaptureGraph, EngineBackend, GraphError, MeterKernel, MeterTap};

pub struct CpalEngine;

impl CpalEngine {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CpalEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineBackend for CpalEngine {
    fn build_graph(&self, kernel: &MeterKernel) -> Result<Box<dyn CaptureGraph>, GraphError> {
        let device = cpal::default_host()
            .default_input_device()
            .ok_or(GraphError::InputUnavailable)?;
        let supported = device
            .default_input_config()
            .map_err(|err| GraphError::BuildFailed(err.to_string()))?;
        let sample_format = supported.sample_format();
        let config: StreamConfig = supported.into();
        let sample_rate = f64::from(config.sample_rate.0);
        let channels = config.channels;

        let tap = kernel.tap(sample_rate);

        let (ready_tx, ready_rx) = bounded::<Result<(), GraphError>>(1);
        let (stop_tx, stop_rx) = bounded::<()>(0);
        let handle = thread::Builder::new()
            .name("meter-capture".into())
            .spawn(move || run_capture(device, config, sample_format, channels, tap, ready_tx, stop_rx))
            .map_err(|err| GraphError::StartFailed(err.to_string()))?;

        match ready_rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                let _ = handle.join();
                return Err(err);
            }
            Err(_) => {
                let _ = handle.join();
                return Err(GraphError::StartFailed(
                    "capture thread exited before the stream started".into(),
                ));
            }
        }

        Ok(Box::new(CpalGraph {
            sample_rate,
            running: true,
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        }))
    }
}

fn run_capture(
    device: Device,
    config: StreamConfig,
    sample_format: SampleFormat,
    channels: u16,
    tap: MeterTap,
    ready_tx: Sender<Result<(), GraphError>>,
    stop_rx: Receiver<()>,
) {
    // Keep the error callback quiet on the render side; mirror into the log.
    let err_fn = |err| log::warn!("capture stream error: {}", err);

    let stream = match sample_format {
        SampleFormat::F32 => device.build_input_stream(
            &config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                tap.process_interleaved(data, channels);
            },
            err_fn,
            None,
        ),
        SampleFormat::I16 => {
            let mut scratch = Vec::with_capacity(4096);
            device.build_input_stream(
                &config,
                move |data: &[i16], _: &cpal::InputCallbackInfo| {
                    scratch.clear();
                    scratch.extend(data.iter().map(|&s| f32::from(s) / 32_768.0));
                    tap.process_interleaved(&scratch, channels);
                },
                err_fn,
                None,
            )
        }
        SampleFormat::U16 => {
            let mut scratch = Vec::with_capacity(4096);
            device.build_input_stream(
                &config,
                move |data: &[u16], _: &cpal::InputCallbackInfo| {
                    scratch.clear();
                    scratch.extend(data.iter().map(|&s| (f32::from(s) - 32_768.0) / 32_768.0));
                    tap.process_interleaved(&scratch, channels);
                },
                err_fn,
                None,
            )
        }
        other => {
            let _ = ready_tx.send(Err(GraphError::BuildFailed(format!(
                "unsupported sample format: {other:?}"
            ))));
            return;
        }
    };

    let stream = match stream {
        Ok(stream) => stream,
        Err(err) => {
            let _ = ready_tx.send(Err(GraphError::BuildFailed(err.to_string())));
            return;
        }
    };

    if let Err(err) = stream.play() {
        let _ = ready_tx.send(Err(GraphError::StartFailed(err.to_string())));
        return;
    }
    let _ = ready_tx.send(Ok(()));

    // Parked until stop() sends or the graph is dropped and the channel closes.
    let _ = stop_rx.recv();

    if let Err(err) = stream.pause() {
        log::debug!("pausing capture stream failed: {}", err);
    }
    drop(stream);
}

/// Handle to one live capture thread/stream pair.
pub struct CpalGraph {
    sample_rate: f64,
    running: bool,
    stop_tx: Option<Sender<()>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl CaptureGraph for CpalGraph {
    fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn stop(&mut self) {
        self.running = false;
        // Closing the channel is enough to wake the thread even if it never
        // reached recv(); send() would block on the rendezvous channel.
        self.stop_tx.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for CpalGraph {
    fn drop(&mut self) {
        self.stop();
    }
}
