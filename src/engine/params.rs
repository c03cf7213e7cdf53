// Lock-free automated parameter storage. The control thread stores, the
// audio thread loads each value at most once per block. Single writer per
// scalar; relaxed ordering is enough.

use std::sync::atomic::{AtomicU32, Ordering};

use super::registry;
use super::scene::{self, SceneParams};

pub struct AtomicF32 {
  bits: AtomicU32,
}

impl AtomicF32 {
  pub fn new(v: f32) -> Self {
    Self { bits: AtomicU32::new(v.to_bits()) }
  }
  #[inline]
  pub fn store(&self, v: f32) {
    self.bits.store(v.to_bits(), Ordering::Relaxed);
  }
  #[inline]
  pub fn load(&self) -> f32 {
    f32::from_bits(self.bits.load(Ordering::Relaxed))
  }
}

pub struct ParamBank {
  values: [AtomicF32; registry::PARAM_COUNT],
}

impl ParamBank {
  pub fn new() -> Self {
    Self {
      values: std::array::from_fn(|i| AtomicF32::new(registry::ALL[i].default_value())),
    }
  }

  // Out-of-range values clamp to the registered range; out-of-range indices
  // are ignored (wrong value beats a crash on this path).
  pub fn set(&self, index: usize, v: f32) {
    if let Some(spec) = registry::ALL.get(index) {
      self.values[index].store(spec.clamp(v));
    }
  }

  pub fn set_by_id(&self, id: &str, v: f32) -> bool {
    match registry::find(id) {
      Some(i) => { self.set(i, v); true }
      None => false,
    }
  }

  #[inline]
  pub fn get(&self, index: usize) -> f32 {
    match self.values.get(index) {
      Some(a) => a.load(),
      None => 0.0,
    }
  }

  #[inline]
  pub fn get_bool(&self, index: usize) -> bool {
    self.get(index) > 0.5
  }

  #[inline]
  pub fn get_choice(&self, index: usize) -> usize {
    let n = registry::ALL.get(index).map(|s| s.choices.max(1)).unwrap_or(1);
    (self.get(index) as usize).min(n - 1)
  }

  pub fn reset_to_defaults(&self) {
    for (i, spec) in registry::ALL.iter().enumerate() {
      self.values[i].store(spec.default_value());
    }
  }
}

impl Default for ParamBank {
  fn default() -> Self { Self::new() }
}

// Last computed (morphed + macro'd + smoothed) scene values, written once per
// block by the audio thread for read-only UI feedback. Individual scalars are
// always valid; a torn read across the vector is tolerated by contract.
pub struct LastComputed {
  values: [AtomicF32; scene::SCENE_PARAM_COUNT],
}

impl LastComputed {
  pub fn new() -> Self {
    Self {
      values: std::array::from_fn(|i| AtomicF32::new(scene::INFO[i].default)),
    }
  }

  pub fn publish(&self, p: &SceneParams) {
    for i in 0..scene::SCENE_PARAM_COUNT {
      self.values[i].store(p.values[i]);
    }
  }

  pub fn read(&self) -> SceneParams {
    let mut out = SceneParams { values: [0.0; scene::SCENE_PARAM_COUNT] };
    for i in 0..scene::SCENE_PARAM_COUNT {
      out.values[i] = self.values[i].load();
    }
    out
  }
}

impl Default for LastComputed {
  fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn bank_starts_at_registry_defaults() {
    let bank = ParamBank::new();
    for (i, spec) in registry::ALL.iter().enumerate() {
      assert_eq!(bank.get(i), spec.default_value(), "{}", spec.id);
    }
    assert_eq!(bank.get(registry::SCENE_B), 1.0);
  }

  #[test]
  fn set_clamps_to_registered_range() {
    let bank = ParamBank::new();
    bank.set(registry::DELAY_FB, 2.0);
    assert_eq!(bank.get(registry::DELAY_FB), 0.95);
    bank.set(registry::INPUT_GAIN_DB, -100.0);
    assert_eq!(bank.get(registry::INPUT_GAIN_DB), -24.0);
    bank.set(registry::SCENE_A, 12.0);
    assert_eq!(bank.get_choice(registry::SCENE_A), 7);
  }

  #[test]
  fn set_by_id_resolves_identifiers() {
    let bank = ParamBank::new();
    assert!(bank.set_by_id("morph", 0.5));
    assert_eq!(bank.get(registry::MORPH), 0.5);
    assert!(!bank.set_by_id("unknown", 0.5));
  }

  #[test]
  fn last_computed_round_trips() {
    let last = LastComputed::new();
    let mut p = SceneParams::from_defaults();
    p.values[scene::FILT_CUTOFF] = 123.0;
    last.publish(&p);
    assert_eq!(last.read(), p);
  }
}
