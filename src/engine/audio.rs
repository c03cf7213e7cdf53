// Standalone duplex host: default input device -> processor -> default
// output device. Control edits arrive over a channel and are drained
// non-blocking at the top of each output callback; input audio crosses
// between the two cpal callbacks through a bounded channel.

use std::collections::VecDeque;
use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{bounded, unbounded, Receiver, Sender, TryRecvError};
use thiserror::Error;

use super::messages::EngineMsg;
use super::params::{LastComputed, ParamBank};
use super::presets;
use super::processor::Processor;
use super::registry;

#[derive(Debug, Error)]
pub enum HostError {
  #[error("no {0} device available")]
  NoDevice(&'static str),
  #[error(transparent)]
  Configs(#[from] cpal::SupportedStreamConfigsError),
  #[error(transparent)]
  DefaultConfig(#[from] cpal::DefaultStreamConfigError),
  #[error(transparent)]
  Build(#[from] cpal::BuildStreamError),
  #[error(transparent)]
  Play(#[from] cpal::PlayStreamError),
}

const MAX_BLOCK: usize = 2048;

pub struct AudioEngine {
  tx: Sender<EngineMsg>,
  rx: Receiver<EngineMsg>,
  pub sr: f32,
  processor: Option<Processor>,
  params: Arc<ParamBank>,
  last: Arc<LastComputed>,
  program: usize,
  in_stream: Option<cpal::Stream>,
  out_stream: Option<cpal::Stream>,
}

// Prefer 44100 (more compatible) then 48000, stereo f32, like the rest of
// the configs this engine is tuned against.
fn pick_output_config(device: &cpal::Device) -> Result<cpal::SupportedStreamConfig, HostError> {
  for sr in [44_100u32, 48_000] {
    if let Ok(supported) = device.supported_output_configs() {
      for cfg in supported {
        if cfg.channels() != 2 { continue; }
        if cfg.sample_format() != cpal::SampleFormat::F32 { continue; }
        if cfg.min_sample_rate().0 <= sr && cfg.max_sample_rate().0 >= sr {
          return Ok(cfg.with_sample_rate(cpal::SampleRate(sr)));
        }
      }
    }
  }
  if let Ok(supported) = device.supported_output_configs() {
    for cfg in supported {
      if cfg.channels() == 2 && cfg.sample_format() == cpal::SampleFormat::F32 {
        return Ok(cfg.with_max_sample_rate());
      }
    }
  }
  log::warn!("no stereo f32 output config; using device default");
  Ok(device.default_output_config()?)
}

fn pick_input_config(device: &cpal::Device, sr: u32) -> Result<cpal::SupportedStreamConfig, HostError> {
  if let Ok(supported) = device.supported_input_configs() {
    for cfg in supported {
      if cfg.sample_format() != cpal::SampleFormat::F32 { continue; }
      if cfg.min_sample_rate().0 <= sr && cfg.max_sample_rate().0 >= sr {
        return Ok(cfg.with_sample_rate(cpal::SampleRate(sr)));
      }
    }
  }
  log::warn!("no f32 input config at {sr} Hz; using device default");
  Ok(device.default_input_config()?)
}

// Spread interleaved input over the stereo scratch buffers; a mono source
// feeds both channels.
fn deinterleave(data: &mut VecDeque<f32>, channels: usize, l: &mut [f32], r: &mut [f32]) {
  for i in 0..l.len() {
    match channels {
      1 => {
        let s = data.pop_front().unwrap_or(0.0);
        l[i] = s;
        r[i] = s;
      }
      _ => {
        l[i] = data.pop_front().unwrap_or(0.0);
        r[i] = data.pop_front().unwrap_or(0.0);
        for _ in 2..channels { data.pop_front(); }
      }
    }
  }
}

fn interleave(l: &[f32], r: &[f32], channels: usize, out: &mut [f32]) {
  for (i, frame) in out.chunks_mut(channels).enumerate() {
    frame[0] = l[i];
    if frame.len() > 1 { frame[1] = r[i]; }
    for s in frame.iter_mut().skip(2) { *s = 0.0; }
  }
}

impl AudioEngine {
  pub fn new() -> Result<Self, HostError> {
    let (tx, rx) = unbounded();
    let host = cpal::default_host();
    let device = host.default_output_device().ok_or(HostError::NoDevice("output"))?;
    let config = pick_output_config(&device)?;
    let sr = config.sample_rate().0 as f32;

    let processor = Processor::new(sr, 2, MAX_BLOCK);
    let params = processor.params();
    let last = processor.last_computed();

    Ok(Self {
      tx,
      rx,
      sr,
      processor: Some(processor),
      params,
      last,
      program: 0,
      in_stream: None,
      out_stream: None,
    })
  }

  pub fn sender(&self) -> Sender<EngineMsg> { self.tx.clone() }
  pub fn params(&self) -> Arc<ParamBank> { Arc::clone(&self.params) }
  pub fn last_computed(&self) -> Arc<LastComputed> { Arc::clone(&self.last) }

  // Direct access before the stream starts (preset load, initial edits).
  // Once start() has run, the processor lives on the audio thread and edits
  // go through the message channel instead.
  pub fn processor_mut(&mut self) -> Option<&mut Processor> {
    self.processor.as_mut()
  }

  pub fn program(&self) -> usize { self.program }
  pub fn program_name(&self) -> &'static str { presets::PROGRAM_NAMES[self.program] }

  // Control-side program switch: factory data is built here and shipped to
  // the audio thread as complete snapshots, performance params reset through
  // the lock-free bank.
  pub fn load_program(&mut self, index: usize) {
    let index = index.min(presets::NUM_PROGRAMS - 1);
    if let Some(p) = self.processor.as_mut() {
      p.load_program(index);
    } else {
      let program = presets::factory_program(index);
      let _ = self.tx.send(EngineMsg::ReplaceScenes { scenes: program.scenes });
      let _ = self.tx.send(EngineMsg::ReplaceMacros { macros: program.macros });
      for i in [
        registry::BYPASS, registry::INPUT_GAIN_DB, registry::OUTPUT_GAIN_DB,
        registry::MIX, registry::SCENE_A, registry::SCENE_B, registry::MORPH,
        registry::MACRO_1, registry::MACRO_2, registry::MACRO_3, registry::MACRO_4,
      ] {
        self.params.set(i, registry::ALL[i].default_value());
      }
    }
    self.program = index;
  }

  pub fn start(&mut self) -> Result<(), HostError> {
    if self.out_stream.is_some() { return Ok(()); }
    let host = cpal::default_host();

    let out_device = host.default_output_device().ok_or(HostError::NoDevice("output"))?;
    let out_config = pick_output_config(&out_device)?;
    let mut out_cfg: cpal::StreamConfig = out_config.clone().into();
    // Request a larger buffer for better stability; reduce underruns
    out_cfg.buffer_size = cpal::BufferSize::Fixed(1024);
    self.sr = out_cfg.sample_rate.0 as f32;
    let out_channels = out_cfg.channels as usize;

    let in_device = host.default_input_device().ok_or(HostError::NoDevice("input"))?;
    let in_config = pick_input_config(&in_device, out_cfg.sample_rate.0)?;
    let mut in_cfg: cpal::StreamConfig = in_config.into();
    in_cfg.buffer_size = cpal::BufferSize::Fixed(1024);
    let in_channels = in_cfg.channels as usize;

    log::info!("audio host: {} Hz, in {} ch, out {} ch", self.sr, in_channels, out_channels);

    // Input frames hop to the output callback over a bounded channel; when
    // the queue is full the newest chunk is dropped rather than blocking.
    let (audio_tx, audio_rx) = bounded::<Vec<f32>>(8);

    let err_fn = |e: cpal::StreamError| log::warn!("stream error: {e}");
    let in_stream = in_device.build_input_stream(&in_cfg, move |data: &[f32], _: &cpal::InputCallbackInfo| {
      let _ = audio_tx.try_send(data.to_vec());
    }, err_fn, None)?;

    // Move engine state into the audio thread. Keep None in self.
    let mut processor = self.processor.take()
      .unwrap_or_else(|| Processor::new(self.sr, 2, MAX_BLOCK));
    processor.reset();
    let rx = self.rx.clone();

    let mut pending: VecDeque<f32> = VecDeque::with_capacity(16384);
    let mut scratch_l = vec![0.0f32; MAX_BLOCK];
    let mut scratch_r = vec![0.0f32; MAX_BLOCK];
    let mut bpm: Option<f64> = None;

    let err_fn = |e: cpal::StreamError| log::warn!("stream error: {e}");
    let out_stream = out_device.build_output_stream(&out_cfg, move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
      // Drain messages without blocking (tight cap to avoid starving audio)
      let mut drained = 0usize;
      loop {
        match rx.try_recv() {
          Ok(EngineMsg::SetTempo { bpm: b }) => bpm = Some(b),
          Ok(EngineMsg::Quit) => {}
          Ok(msg) => processor.apply_msg(msg),
          Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
        }
        drained += 1;
        if drained >= 24 { break; }
      }

      while let Ok(chunk) = audio_rx.try_recv() {
        pending.extend(chunk);
      }

      let frames = (data.len() / out_channels.max(1)).min(MAX_BLOCK);
      let (l, r) = (&mut scratch_l[..frames], &mut scratch_r[..frames]);
      deinterleave(&mut pending, in_channels, l, r);
      processor.process_block(l, r, bpm);
      interleave(l, r, out_channels, &mut data[..frames * out_channels]);
      for s in data[frames * out_channels..].iter_mut() { *s = 0.0; }
    }, err_fn, None)?;

    in_stream.play()?;
    out_stream.play()?;
    self.in_stream = Some(in_stream);
    self.out_stream = Some(out_stream);
    log::info!("audio host started");
    Ok(())
  }

  pub fn stop(&mut self) {
    self.in_stream.take();
    self.out_stream.take();
    log::info!("audio host stopped");
  }
}

// Intentionally not Clone; engine state moves into the audio callback.

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn deinterleave_duplicates_mono_input() {
    let mut q: VecDeque<f32> = vec![0.1, 0.2, 0.3].into();
    let mut l = [0.0f32; 3];
    let mut r = [0.0f32; 3];
    deinterleave(&mut q, 1, &mut l, &mut r);
    assert_eq!(l, [0.1, 0.2, 0.3]);
    assert_eq!(r, [0.1, 0.2, 0.3]);
  }

  #[test]
  fn deinterleave_splits_stereo_and_pads_underrun_with_silence() {
    let mut q: VecDeque<f32> = vec![0.1, -0.1, 0.2, -0.2].into();
    let mut l = [9.0f32; 3];
    let mut r = [9.0f32; 3];
    deinterleave(&mut q, 2, &mut l, &mut r);
    assert_eq!(l, [0.1, 0.2, 0.0]);
    assert_eq!(r, [-0.1, -0.2, 0.0]);
  }

  #[test]
  fn interleave_zeroes_extra_output_channels() {
    let l = [0.5f32, 0.6];
    let r = [-0.5f32, -0.6];
    let mut out = [9.0f32; 8];
    interleave(&l, &r, 4, &mut out);
    assert_eq!(out, [0.5, -0.5, 0.0, 0.0, 0.6, -0.6, 0.0, 0.0]);
  }
}
