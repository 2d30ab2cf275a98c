use crate::error::{NotReadyReason, PlayerError, Result};
use crate::playback::output::{AudioOutput, OutputRun};
use crate::types::sample_buffer::SampleBuffer;
use gst::prelude::*;
use gstreamer as gst;
use gstreamer_app as gst_app;
use log::{debug, info, warn};
use std::sync::Arc;

const AUDIO_SINK: &str = "autoaudiosink";
const PIPELINE: &str =
    "appsrc name=src format=time ! audioconvert ! audioresample ! autoaudiosink name=sink";
const STATE_TIMEOUT_SECS: u64 = 5;

/// Audio hardware handle backed by GStreamer.
///
/// Created once by the host with `open` and injected into the engine. It starts out
/// suspended; `ensure_ready` brings it up. The device itself is held by each run's
/// pipeline and released when that run stops, so dropping the handle only closes it
/// to new runs.
#[derive(Debug)]
pub struct GstAudioOutput {
    ready: bool,
}

impl GstAudioOutput {
    pub fn open() -> Self {
        debug!("Opened GStreamer audio output (suspended)");
        Self { ready: false }
    }
}

impl Drop for GstAudioOutput {
    fn drop(&mut self) {
        if self.ready {
            info!("Closed GStreamer audio output");
        }
    }
}

impl AudioOutput for GstAudioOutput {
    type Run = GstRun;

    fn ensure_ready(&mut self) -> Result<()> {
        if self.ready {
            return Ok(());
        }
        gst::init()
            .map_err(|e| PlayerError::PlaybackBlocked(format!("GStreamer unavailable: {e}")))?;
        if gst::ElementFactory::find(AUDIO_SINK).is_none() {
            return Err(PlayerError::PlaybackBlocked(format!(
                "no `{AUDIO_SINK}` element installed"
            )));
        }
        self.ready = true;
        info!("Audio output ready");
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.ready
    }

    fn start(&mut self, buffer: Arc<SampleBuffer>, offset: f64, rate: f64) -> Result<GstRun> {
        if !self.ready {
            return Err(PlayerError::NotReady(NotReadyReason::OutputSuspended));
        }

        let pipeline = gst::parse::launch(PIPELINE)
            .map_err(|e| PlayerError::Output(format!("failed to create pipeline: {e}")))?
            .downcast::<gst::Pipeline>()
            .map_err(|_| PlayerError::Output("expected a gst::Pipeline".to_string()))?;
        let appsrc = pipeline
            .by_name("src")
            .and_then(|element| element.downcast::<gst_app::AppSrc>().ok())
            .ok_or_else(|| PlayerError::Output("pipeline has no appsrc".to_string()))?;

        let caps = gst::Caps::builder("audio/x-raw")
            .field("format", "F32LE")
            .field("layout", "interleaved")
            .field("rate", buffer.sample_rate() as i32)
            .field("channels", buffer.channels() as i32)
            .build();
        appsrc.set_caps(Some(&caps));

        // The whole remainder of the track goes in as one buffer, then EOS.
        let samples = buffer.samples_from(offset);
        let frames = (samples.len() / buffer.channels() as usize) as u64;
        let bytes: Vec<u8> = bytemuck::cast_slice::<f32, u8>(samples).to_vec();
        let mut gst_buffer = gst::Buffer::from_mut_slice(bytes);
        if let Some(buffer_ref) = gst_buffer.get_mut() {
            buffer_ref.set_pts(gst::ClockTime::ZERO);
            buffer_ref.set_duration(gst::ClockTime::from_nseconds(
                frames * 1_000_000_000 / buffer.sample_rate() as u64,
            ));
        }
        appsrc
            .push_buffer(gst_buffer)
            .map_err(|e| PlayerError::Output(format!("failed to queue samples: {e:?}")))?;
        appsrc
            .end_of_stream()
            .map_err(|e| PlayerError::Output(format!("failed to signal end of stream: {e:?}")))?;

        let mut run = GstRun {
            pipeline,
            stopped: false,
        };
        run.wait_for_state(gst::State::Paused)?;
        if (rate - 1.0).abs() > f64::EPSILON {
            apply_start_rate(&mut run, rate);
        }
        run.wait_for_state(gst::State::Playing)?;
        debug!("Started pipeline at {offset:.3}s, {frames} frames, rate {rate}");
        Ok(run)
    }
}

/// A rejected rate change leaves the run playing at normal speed instead of failing it.
fn apply_start_rate<R: OutputRun>(run: &mut R, rate: f64) -> bool {
    match run.set_rate(rate) {
        Ok(()) => true,
        Err(e) => {
            warn!("Playing at normal speed: {e}");
            false
        }
    }
}

/// One `appsrc → autoaudiosink` pipeline. Dropping it stops playback.
#[derive(Debug)]
pub struct GstRun {
    pipeline: gst::Pipeline,
    stopped: bool,
}

impl GstRun {
    fn wait_for_state(&mut self, target: gst::State) -> Result<()> {
        if let Err(e) = self.pipeline.set_state(target) {
            self.stop();
            return Err(PlayerError::Output(format!(
                "failed to set pipeline to {target:?}: {e}"
            )));
        }
        let (result, state, pending) = self
            .pipeline
            .state(Some(gst::ClockTime::from_seconds(STATE_TIMEOUT_SECS)));
        match (result, state) {
            (Ok(_), reached) if reached == target => Ok(()),
            (result, state) => {
                self.stop();
                Err(PlayerError::Output(format!(
                    "pipeline failed to reach {target:?}: {result:?}, current {state:?}, pending {pending:?}"
                )))
            }
        }
    }
}

impl OutputRun for GstRun {
    fn set_rate(&mut self, rate: f64) -> Result<()> {
        if self.stopped {
            return Ok(());
        }
        self.pipeline
            .seek(
                rate,
                gst::SeekFlags::INSTANT_RATE_CHANGE,
                gst::SeekType::None,
                gst::ClockTime::NONE,
                gst::SeekType::None,
                gst::ClockTime::NONE,
            )
            .map_err(|e| PlayerError::Output(format!("rate change to {rate} failed: {e}")))
    }

    fn stop(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        if let Err(e) = self.pipeline.set_state(gst::State::Null) {
            warn!("Failed to stop pipeline: {e}");
        }
    }

    fn check(&mut self) -> Result<()> {
        if self.stopped {
            return Ok(());
        }
        let Some(bus) = self.pipeline.bus() else {
            return Ok(());
        };
        while let Some(msg) =
            bus.pop_filtered(&[gst::MessageType::Error, gst::MessageType::Warning])
        {
            match msg.view() {
                gst::MessageView::Error(err) => {
                    return Err(PlayerError::Output(format!("pipeline error: {}", err.error())));
                }
                gst::MessageView::Warning(warning) => {
                    warn!("Pipeline warning: {}", warning.error());
                }
                _ => {}
            }
        }
        Ok(())
    }
}

impl Drop for GstRun {
    fn drop(&mut self) {
        self.stop();
    }
}
