// Macro mapping: each of the 4 macros offsets up to a handful of scene
// parameters by a signed amount through a response curve. Macros are applied
// after morph interpolation; discrete parameters are never touched.

use super::scene::{self, SceneParams};

pub const NUM_MACROS: usize = 4;
pub const MAX_TARGETS: usize = 4;

// Below this a macro contributes nothing, so macro = 0 is an exact no-op.
const DEAD_ZONE: f32 = 0.001;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MacroCurve {
  Linear,
  Exponential,
  Logarithmic,
  SCurve,
}

pub const CURVE_NAMES: [&str; 4] = ["Linear", "Exp", "Log", "S-Curve"];

impl MacroCurve {
  pub fn from_index(i: usize) -> Self {
    match i {
      1 => MacroCurve::Exponential,
      2 => MacroCurve::Logarithmic,
      3 => MacroCurve::SCurve,
      _ => MacroCurve::Linear,
    }
  }

  pub fn index(self) -> usize {
    match self {
      MacroCurve::Linear => 0,
      MacroCurve::Exponential => 1,
      MacroCurve::Logarithmic => 2,
      MacroCurve::SCurve => 3,
    }
  }

  // All curves map [0,1] onto [0,1] monotonically with f(0)=0 and f(1)=1.
  #[inline]
  pub fn apply(self, x: f32) -> f32 {
    let x = x.clamp(0.0, 1.0);
    match self {
      MacroCurve::Linear => x,
      MacroCurve::Exponential => x * x,
      MacroCurve::Logarithmic => x.sqrt(),
      MacroCurve::SCurve => x * x * (3.0 - 2.0 * x),
    }
  }
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct MacroTarget {
  pub param: usize,     // scene table index
  pub amount: f32,      // -1..+1, fraction of the parameter's full range
  pub curve: MacroCurve,
}

impl MacroTarget {
  pub fn new(param: usize, amount: f32) -> Self {
    Self { param, amount, curve: MacroCurve::Linear }
  }
}

pub struct MacroMap {
  // Target lists are only ever replaced wholesale (never mutated in place),
  // so a block that holds a reference sees a complete, consistent list.
  targets: [Vec<MacroTarget>; NUM_MACROS],
}

impl MacroMap {
  pub fn new() -> Self {
    let mut m = Self { targets: Default::default() };
    for (i, t) in default_mappings().into_iter().enumerate() {
      m.targets[i] = t;
    }
    m
  }

  pub fn empty() -> Self {
    Self { targets: Default::default() }
  }

  pub fn clear(&mut self) {
    for t in self.targets.iter_mut() { t.clear(); }
  }

  // Swap in a complete list for one macro. Out-of-range macro indices are
  // ignored; the list is truncated to MAX_TARGETS.
  pub fn set_targets(&mut self, index: usize, mut targets: Vec<MacroTarget>) {
    if index >= NUM_MACROS { return; }
    targets.truncate(MAX_TARGETS);
    self.targets[index] = targets;
  }

  pub fn targets(&self, index: usize) -> &[MacroTarget] {
    if index < NUM_MACROS { &self.targets[index] } else { &[] }
  }

  // Add macro offsets onto a morphed scene in place. Applied in macro index
  // order, then target-list order, clamping after every addition; when two
  // targets saturate the same parameter the result is order-dependent, and
  // that ordering is part of the observable behavior.
  pub fn apply(&self, params: &mut SceneParams, macro_values: &[f32; NUM_MACROS]) {
    for m in 0..NUM_MACROS {
      let raw = macro_values[m];
      if raw < DEAD_ZONE { continue; }
      for target in self.targets[m].iter() {
        if target.param >= scene::SCENE_PARAM_COUNT { continue; }
        let range = &scene::INFO[target.param].range;
        if range.is_discrete() { continue; }
        let curved = target.curve.apply(raw);
        let offset = curved * target.amount * range.span();
        params.values[target.param] = range.clamp(params.values[target.param] + offset);
      }
    }
  }
}

impl Default for MacroMap {
  fn default() -> Self { Self::new() }
}

// Musically useful factory defaults:
//   macro 1 "filter sweep", macro 2 "dirt", macro 3 "space", macro 4 "width".
pub fn default_mappings() -> [Vec<MacroTarget>; NUM_MACROS] {
  [
    vec![
      MacroTarget::new(scene::FILT_CUTOFF, 0.5),
      MacroTarget::new(scene::FILT_RESO, 0.3),
    ],
    vec![
      MacroTarget::new(scene::DRIVE_AMT, 0.7),
      MacroTarget::new(scene::DRIVE_TONE, -0.3),
    ],
    vec![
      MacroTarget::new(scene::DELAY_FB, 0.4),
      MacroTarget::new(scene::REV_SIZE, 0.5),
      MacroTarget::new(scene::REV_PRE_DELAY, 0.2),
    ],
    vec![
      MacroTarget::new(scene::DELAY_WIDTH, 0.3),
      MacroTarget::new(scene::REV_WIDTH, 0.2),
    ],
  ]
}
