// Linear ramp toward a target over a fixed number of samples. One primitive,
// reused for the 14 scene parameters, the bypass crossfade, gain ramps and
// the delay-time smoother. Retargeting mid-ramp restarts from the current
// value, never the original one.

use super::registry;
use super::scene::{self, SceneParams};

#[derive(Clone, Debug)]
pub struct LinearRamp {
  current: f32,
  target: f32,
  step: f32,
  steps_left: u32,
  ramp_len: u32,
}

impl LinearRamp {
  pub fn new(sr: f32, seconds: f32) -> Self {
    Self {
      current: 0.0,
      target: 0.0,
      step: 0.0,
      steps_left: 0,
      ramp_len: (seconds * sr).round().max(0.0) as u32,
    }
  }

  pub fn reset_time(&mut self, sr: f32, seconds: f32) {
    self.ramp_len = (seconds * sr).round().max(0.0) as u32;
    self.steps_left = 0;
    self.current = self.target;
  }

  // Jump both current and target (no ramp).
  pub fn set(&mut self, v: f32) {
    self.current = v;
    self.target = v;
    self.steps_left = 0;
  }

  pub fn set_target(&mut self, t: f32) {
    if t == self.target { return; }
    self.target = t;
    if self.ramp_len == 0 {
      self.current = t;
      self.steps_left = 0;
      return;
    }
    self.step = (t - self.current) / self.ramp_len as f32;
    self.steps_left = self.ramp_len;
  }

  #[inline]
  pub fn next(&mut self) -> f32 {
    if self.steps_left > 0 {
      self.steps_left -= 1;
      if self.steps_left == 0 {
        self.current = self.target;
      } else {
        self.current += self.step;
      }
    }
    self.current
  }

  pub fn advance(&mut self, n: usize) {
    let n = (n as u32).min(self.steps_left);
    if n == 0 { return; }
    self.steps_left -= n;
    if self.steps_left == 0 {
      self.current = self.target;
    } else {
      self.current += self.step * n as f32;
    }
  }

  #[inline]
  pub fn current(&self) -> f32 { self.current }
  #[inline]
  pub fn target(&self) -> f32 { self.target }
  #[inline]
  pub fn is_ramping(&self) -> bool { self.steps_left > 0 }
}

// One ramp per scene parameter, each with the smoothing time of its registry
// category. Discrete parameters snap; continuous ones ramp.
pub struct SmoothBank {
  ramps: [LinearRamp; scene::SCENE_PARAM_COUNT],
}

impl SmoothBank {
  pub fn new(sr: f32) -> Self {
    let ramps = std::array::from_fn(|i| {
      let spec = &registry::ALL[registry::MODULE_BASE + i];
      let mut r = LinearRamp::new(sr, registry::smoothing_ms(spec.smooth) * 0.001);
      r.set(scene::INFO[i].default);
      r
    });
    Self { ramps }
  }

  pub fn reset(&mut self, sr: f32) {
    *self = Self::new(sr);
  }

  // Advance every ramp by one block toward the resolver's output and return
  // the values in effect at the end of the block.
  pub fn update(&mut self, resolved: &SceneParams, block_len: usize) -> SceneParams {
    let mut out = SceneParams { values: [0.0; scene::SCENE_PARAM_COUNT] };
    for i in 0..scene::SCENE_PARAM_COUNT {
      if scene::INFO[i].range.is_discrete() {
        // Instant snap: a discrete value must never pass through an invalid
        // intermediate state.
        self.ramps[i].set(resolved.values[i]);
      } else {
        self.ramps[i].set_target(resolved.values[i]);
        self.ramps[i].advance(block_len);
      }
      out.values[i] = self.ramps[i].current();
    }
    out
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn ramp_reaches_target_in_exact_step_count() {
    let mut r = LinearRamp::new(1000.0, 0.01); // 10 steps
    r.set(0.0);
    r.set_target(1.0);
    for _ in 0..9 {
      r.next();
      assert!(r.current() < 1.0);
    }
    assert_eq!(r.next(), 1.0);
    assert!(!r.is_ramping());
  }

  #[test]
  fn ramp_is_strictly_monotonic_toward_target() {
    let mut r = LinearRamp::new(1000.0, 0.05);
    r.set(2.0);
    r.set_target(-1.0);
    let mut prev = r.current();
    for _ in 0..50 {
      let v = r.next();
      assert!(v <= prev);
      prev = v;
    }
    assert_eq!(prev, -1.0);
  }

  #[test]
  fn retarget_mid_ramp_restarts_from_current_value() {
    let mut r = LinearRamp::new(1000.0, 0.01);
    r.set(0.0);
    r.set_target(1.0);
    r.advance(5);
    let mid = r.current();
    assert!((mid - 0.5).abs() < 1e-4);
    r.set_target(0.0);
    // First step moves away from mid, not from the original 0.0 start
    let v = r.next();
    assert!(v < mid && v > 0.0);
  }

  #[test]
  fn advance_matches_repeated_next() {
    let mut a = LinearRamp::new(48000.0, 0.02);
    let mut b = a.clone();
    a.set(0.2); b.set(0.2);
    a.set_target(0.9); b.set_target(0.9);
    for _ in 0..300 { a.next(); }
    b.advance(300);
    assert!((a.current() - b.current()).abs() < 1e-5);
  }

  #[test]
  fn zero_time_ramp_snaps() {
    let mut r = LinearRamp::new(48000.0, 0.0);
    r.set(0.3);
    r.set_target(0.8);
    assert_eq!(r.current(), 0.8);
  }

  #[test]
  fn bank_snaps_discrete_and_ramps_continuous() {
    let mut bank = SmoothBank::new(1000.0);
    let mut target = SceneParams::from_defaults();
    target.values[scene::FILT_MODE] = 2.0;
    target.values[scene::FILT_CUTOFF] = 500.0;
    let out = bank.update(&target, 1);
    assert_eq!(out.values[scene::FILT_MODE], 2.0);
    // cutoff ramps over 20 ms => still near its default after one sample
    assert!(out.values[scene::FILT_CUTOFF] > 7000.0);
    // after enough samples the ramp settles on the target
    let mut settled = out;
    for _ in 0..50 { settled = bank.update(&target, 1); }
    assert!((settled.values[scene::FILT_CUTOFF] - 500.0).abs() < 1e-3);
  }
}
