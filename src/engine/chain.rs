// Signal orchestrator. Once per block, on the smoothed scene values:
// input gain -> filter -> drive -> delay -> reverb -> dry/wet mix ->
// output gain -> bypass crossfade -> safety clamp.

use super::dsp::delay::TempoDelay;
use super::dsp::drive::Drive;
use super::dsp::filter::MultiFilter;
use super::dsp::reverb::ReverbUnit;
use super::scene::{self, SceneParams};
use super::smooth::LinearRamp;

fn db_to_gain(db: f32) -> f32 { (10.0f32).powf(db / 20.0) }

// Last-resort clamp against runaway gain accumulation anywhere in the chain.
const OUTPUT_CLAMP: f32 = 4.0;

pub struct EffectChain {
  sr: f32,
  channels: usize,
  in_gain: LinearRamp,
  out_gain: LinearRamp,
  // 0 = engaged, 1 = fully bypassed (dry)
  bypass: LinearRamp,
  filter: MultiFilter,
  drive: Drive,
  delay: TempoDelay,
  reverb: ReverbUnit,
  dry_l: Vec<f32>,
  dry_r: Vec<f32>,
}

impl EffectChain {
  pub fn new(sr: f32, channels: usize, max_block: usize) -> Self {
    let mut in_gain = LinearRamp::new(sr, 0.02);
    let mut out_gain = LinearRamp::new(sr, 0.02);
    let mut bypass = LinearRamp::new(sr, 0.01);
    in_gain.set(1.0);
    out_gain.set(1.0);
    bypass.set(0.0);
    let channels = channels.clamp(1, 2);
    Self {
      sr,
      channels,
      in_gain,
      out_gain,
      bypass,
      filter: MultiFilter::new(),
      drive: Drive::new(),
      delay: TempoDelay::new(sr, channels),
      reverb: ReverbUnit::new(sr),
      dry_l: vec![0.0; max_block],
      dry_r: vec![0.0; max_block],
    }
  }

  pub fn reset(&mut self) {
    self.filter.reset();
    self.drive.reset();
    self.delay.reset();
    self.reverb.reset();
  }

  pub fn set_bypassed(&mut self, bypassed: bool) {
    self.bypass.set_target(if bypassed { 1.0 } else { 0.0 });
  }

  // True once the 10 ms crossfade has settled fully dry; lets the caller
  // skip the whole chain.
  pub fn fully_bypassed(&self) -> bool {
    !self.bypass.is_ramping() && self.bypass.current() > 0.999
  }

  pub fn process_block(&mut self, l: &mut [f32], r: &mut [f32], p: &SceneParams,
                       in_gain_db: f32, out_gain_db: f32, mix: f32, bpm: Option<f64>) {
    let n = l.len().min(r.len());
    let channels = self.channels;
    if self.dry_l.len() < n {
      self.dry_l.resize(n, 0.0);
      self.dry_r.resize(n, 0.0);
    }

    // Dry tap is taken ahead of the input gain; mix and bypass both blend
    // back toward the untouched input.
    self.dry_l[..n].copy_from_slice(&l[..n]);
    self.dry_r[..n].copy_from_slice(&r[..n]);

    self.in_gain.set_target(db_to_gain(in_gain_db));
    for s in 0..n {
      let g = self.in_gain.next();
      l[s] *= g;
      r[s] *= g;
    }

    self.filter.set_params(p.values[scene::FILT_MODE] as usize,
                           p.values[scene::FILT_CUTOFF],
                           p.values[scene::FILT_RESO], self.sr);
    self.filter.process_block(l, r, channels);

    self.drive.set_params(p.values[scene::DRIVE_AMT], p.values[scene::DRIVE_TONE], self.sr);
    self.drive.process_block(l, r, channels);

    self.delay.set_params(p.values[scene::DELAY_SYNC] as usize,
                          p.values[scene::DELAY_FB],
                          p.values[scene::DELAY_TONE],
                          p.values[scene::DELAY_WIDTH],
                          p.values[scene::DELAY_PING_PONG] > 0.5,
                          bpm);
    self.delay.process_block(l, r);

    self.reverb.set_params(p.values[scene::REV_SIZE],
                           p.values[scene::REV_DAMP],
                           p.values[scene::REV_PRE_DELAY],
                           p.values[scene::REV_WIDTH]);
    self.reverb.process_block(l, r, channels);

    let mix = mix.clamp(0.0, 1.0);
    if mix < 1.0 {
      for s in 0..n {
        l[s] = self.dry_l[s] + mix * (l[s] - self.dry_l[s]);
        r[s] = self.dry_r[s] + mix * (r[s] - self.dry_r[s]);
      }
    }

    self.out_gain.set_target(db_to_gain(out_gain_db));
    for s in 0..n {
      let g = self.out_gain.next();
      l[s] *= g;
      r[s] *= g;
    }

    if self.bypass.is_ramping() || self.bypass.current() > 0.001 {
      for s in 0..n {
        let bv = self.bypass.next();
        l[s] += bv * (self.dry_l[s] - l[s]);
        r[s] += bv * (self.dry_r[s] - r[s]);
      }
    }

    for s in 0..n {
      l[s] = l[s].clamp(-OUTPUT_CLAMP, OUTPUT_CLAMP);
      r[s] = r[s].clamp(-OUTPUT_CLAMP, OUTPUT_CLAMP);
    }
  }
}
