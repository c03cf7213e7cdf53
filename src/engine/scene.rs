// Scene snapshots: each scene stores the 14 module parameter values
// (filter/drive/delay/reverb), not morph, macros or performance params.

pub const SCENE_PARAM_COUNT: usize = 14;
pub const NUM_SCENES: usize = 8;

// Scene table indices. Order is a binary-compatibility invariant: serialized
// data references entries by id, in-memory code by these indices.
pub const FILT_MODE: usize = 0;
pub const FILT_CUTOFF: usize = 1;
pub const FILT_RESO: usize = 2;
pub const DRIVE_AMT: usize = 3;
pub const DRIVE_TONE: usize = 4;
pub const DELAY_SYNC: usize = 5;
pub const DELAY_FB: usize = 6;
pub const DELAY_TONE: usize = 7;
pub const DELAY_WIDTH: usize = 8;
pub const DELAY_PING_PONG: usize = 9;
pub const REV_SIZE: usize = 10;
pub const REV_DAMP: usize = 11;
pub const REV_PRE_DELAY: usize = 12;
pub const REV_WIDTH: usize = 13;

// A parameter is either a continuous range or a discrete step count.
// Blending, macro offsets and smoothing all dispatch on this once, so the
// algorithms stay generic over both kinds.
#[derive(Clone, Copy, Debug)]
pub enum ParamRange {
  Continuous { min: f32, max: f32 },
  Discrete { steps: u32 },
}

impl ParamRange {
  #[inline]
  pub fn min(&self) -> f32 {
    match self {
      ParamRange::Continuous { min, .. } => *min,
      ParamRange::Discrete { .. } => 0.0,
    }
  }
  #[inline]
  pub fn max(&self) -> f32 {
    match self {
      ParamRange::Continuous { max, .. } => *max,
      ParamRange::Discrete { steps } => steps.saturating_sub(1) as f32,
    }
  }
  #[inline]
  pub fn span(&self) -> f32 { self.max() - self.min() }
  #[inline]
  pub fn is_discrete(&self) -> bool { matches!(self, ParamRange::Discrete { .. }) }
  #[inline]
  pub fn clamp(&self, v: f32) -> f32 { v.clamp(self.min(), self.max()) }

  // Continuous params interpolate linearly; discrete params hard-switch at
  // the midpoint, ties at exactly 0.5 resolving to b.
  #[inline]
  pub fn blend(&self, a: f32, b: f32, t: f32) -> f32 {
    match self {
      ParamRange::Discrete { .. } => if t < 0.5 { a } else { b },
      ParamRange::Continuous { .. } => {
        if t <= 0.0 { a } else if t >= 1.0 { b } else { a + t * (b - a) }
      }
    }
  }
}

#[derive(Clone, Copy, Debug)]
pub struct SceneParamInfo {
  pub id: &'static str, // must match the registry id
  pub range: ParamRange,
  pub default: f32,
}

pub static INFO: [SceneParamInfo; SCENE_PARAM_COUNT] = [
  SceneParamInfo { id: "filtMode",      range: ParamRange::Discrete { steps: 3 }, default: 0.0 },
  SceneParamInfo { id: "filtCutoffHz",  range: ParamRange::Continuous { min: 20.0, max: 20000.0 }, default: 8000.0 },
  SceneParamInfo { id: "filtReso",      range: ParamRange::Continuous { min: 0.0, max: 1.0 }, default: 0.2 },
  SceneParamInfo { id: "driveAmt",      range: ParamRange::Continuous { min: 0.0, max: 1.0 }, default: 0.0 },
  SceneParamInfo { id: "driveTone",     range: ParamRange::Continuous { min: 0.0, max: 1.0 }, default: 0.5 },
  SceneParamInfo { id: "delaySync",     range: ParamRange::Discrete { steps: 8 }, default: 2.0 },
  SceneParamInfo { id: "delayFeedback", range: ParamRange::Continuous { min: 0.0, max: 0.95 }, default: 0.25 },
  SceneParamInfo { id: "delayTone",     range: ParamRange::Continuous { min: 0.0, max: 1.0 }, default: 0.5 },
  SceneParamInfo { id: "delayWidth",    range: ParamRange::Continuous { min: 0.0, max: 1.0 }, default: 0.7 },
  SceneParamInfo { id: "delayPingPong", range: ParamRange::Discrete { steps: 2 }, default: 0.0 },
  SceneParamInfo { id: "revSize",       range: ParamRange::Continuous { min: 0.0, max: 1.0 }, default: 0.35 },
  SceneParamInfo { id: "revDamp",       range: ParamRange::Continuous { min: 0.0, max: 1.0 }, default: 0.5 },
  SceneParamInfo { id: "revPreDelayMs", range: ParamRange::Continuous { min: 0.0, max: 200.0 }, default: 10.0 },
  SceneParamInfo { id: "revWidth",      range: ParamRange::Continuous { min: 0.0, max: 1.0 }, default: 0.8 },
];

pub fn index_of(id: &str) -> Option<usize> {
  INFO.iter().position(|s| s.id == id)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneParams {
  pub values: [f32; SCENE_PARAM_COUNT],
}

impl SceneParams {
  pub fn from_defaults() -> Self {
    let mut values = [0.0f32; SCENE_PARAM_COUNT];
    for (v, inf) in values.iter_mut().zip(INFO.iter()) { *v = inf.default; }
    Self { values }
  }

  // Pure morph between two scenes; callable on and off the audio thread.
  pub fn morph(a: &SceneParams, b: &SceneParams, t: f32) -> SceneParams {
    let mut out = SceneParams { values: [0.0; SCENE_PARAM_COUNT] };
    for i in 0..SCENE_PARAM_COUNT {
      out.values[i] = INFO[i].range.blend(a.values[i], b.values[i], t);
    }
    out
  }

  pub fn clamp_to_ranges(&mut self) {
    for i in 0..SCENE_PARAM_COUNT {
      self.values[i] = INFO[i].range.clamp(self.values[i]);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn scene_with(f: impl Fn(usize) -> f32) -> SceneParams {
    let mut s = SceneParams::from_defaults();
    for i in 0..SCENE_PARAM_COUNT { s.values[i] = f(i); }
    s
  }

  #[test]
  fn morph_endpoints_are_exact() {
    let a = scene_with(|i| INFO[i].range.min());
    let b = scene_with(|i| INFO[i].range.max());
    assert_eq!(SceneParams::morph(&a, &b, 0.0), a);
    assert_eq!(SceneParams::morph(&a, &b, 1.0), b);
  }

  #[test]
  fn continuous_params_interpolate_linearly() {
    let a = scene_with(|_| 0.0);
    let mut b = scene_with(|_| 0.0);
    b.values[FILT_CUTOFF] = 1000.0;
    let m = SceneParams::morph(&a, &b, 0.25);
    assert!((m.values[FILT_CUTOFF] - 250.0).abs() < 1e-3);
  }

  #[test]
  fn discrete_params_switch_at_midpoint() {
    let mut a = SceneParams::from_defaults();
    let mut b = SceneParams::from_defaults();
    a.values[FILT_MODE] = 0.0;
    b.values[FILT_MODE] = 2.0;
    a.values[DELAY_SYNC] = 1.0;
    b.values[DELAY_SYNC] = 7.0;
    assert_eq!(SceneParams::morph(&a, &b, 0.49).values[FILT_MODE], 0.0);
    // A tie at exactly 0.5 resolves to b
    assert_eq!(SceneParams::morph(&a, &b, 0.5).values[FILT_MODE], 2.0);
    assert_eq!(SceneParams::morph(&a, &b, 0.5).values[DELAY_SYNC], 7.0);
    assert_eq!(SceneParams::morph(&a, &b, 0.99).values[DELAY_SYNC], 7.0);
  }

  #[test]
  fn discrete_params_are_never_fractional_mid_morph() {
    let mut a = SceneParams::from_defaults();
    let mut b = SceneParams::from_defaults();
    a.values[DELAY_PING_PONG] = 0.0;
    b.values[DELAY_PING_PONG] = 1.0;
    for t in [0.1, 0.3, 0.5, 0.7, 0.9] {
      let v = SceneParams::morph(&a, &b, t).values[DELAY_PING_PONG];
      assert!(v == 0.0 || v == 1.0);
    }
  }

  #[test]
  fn scene_table_matches_registry() {
    use crate::engine::registry;
    for (i, inf) in INFO.iter().enumerate() {
      let ri = registry::find(inf.id).expect("scene id missing from registry");
      assert_eq!(ri, registry::MODULE_BASE + i, "order mismatch for {}", inf.id);
      let spec = &registry::ALL[ri];
      assert_eq!(spec.default_value(), inf.default, "default mismatch for {}", inf.id);
      assert_eq!(inf.range.is_discrete(),
                 spec.kind == registry::ParamKind::Choice || spec.kind == registry::ParamKind::Toggle);
    }
  }
}
