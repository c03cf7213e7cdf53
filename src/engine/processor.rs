// The session object: owns the scene store, macro map, smoothing bank and
// effect chain, resolves the effective parameter vector once per block and
// runs the chain on it. One instance per engine; no shared globals, so
// several processors can coexist in one process.

use std::sync::Arc;

use super::chain::EffectChain;
use super::macro_map::{MacroMap, MacroTarget, NUM_MACROS};
use super::messages::EngineMsg;
use super::params::{LastComputed, ParamBank};
use super::presets::{self, PresetFile};
use super::registry;
use super::scene::{self, SceneParams, NUM_SCENES};
use super::smooth::SmoothBank;

pub struct Processor {
  sr: f32,
  scenes: [SceneParams; NUM_SCENES],
  macros: MacroMap,
  smooth: SmoothBank,
  chain: EffectChain,
  params: Arc<ParamBank>,
  last: Arc<LastComputed>,
  program: usize,
}

impl Processor {
  pub fn new(sr: f32, channels: usize, max_block: usize) -> Self {
    let mut p = Self {
      sr,
      scenes: [SceneParams::from_defaults(); NUM_SCENES],
      macros: MacroMap::empty(),
      smooth: SmoothBank::new(sr),
      chain: EffectChain::new(sr, channels, max_block),
      params: Arc::new(ParamBank::new()),
      last: Arc::new(LastComputed::new()),
      program: 0,
    };
    p.load_program(0);
    p
  }

  // Shared handles for the control/UI side.
  pub fn params(&self) -> Arc<ParamBank> { Arc::clone(&self.params) }
  pub fn last_computed(&self) -> Arc<LastComputed> { Arc::clone(&self.last) }

  pub fn program(&self) -> usize { self.program }
  pub fn program_name(&self) -> &'static str { presets::PROGRAM_NAMES[self.program] }

  // Call on stream (re)start: smoothers jump to their targets and the DSP
  // tails are flushed.
  pub fn reset(&mut self) {
    self.smooth.reset(self.sr);
    self.chain.reset();
  }

  // Morph + macro resolution from the current automated values. Pure with
  // respect to audio state, so flatten can reuse it off the audio path.
  pub fn resolve(&self) -> SceneParams {
    let a = self.params.get_choice(registry::SCENE_A).min(NUM_SCENES - 1);
    let b = self.params.get_choice(registry::SCENE_B).min(NUM_SCENES - 1);
    let t = self.params.get(registry::MORPH);
    let mut resolved = SceneParams::morph(&self.scenes[a], &self.scenes[b], t);
    let macro_values = [
      self.params.get(registry::MACRO_1),
      self.params.get(registry::MACRO_2),
      self.params.get(registry::MACRO_3),
      self.params.get(registry::MACRO_4),
    ];
    self.macros.apply(&mut resolved, &macro_values);
    resolved
  }

  pub fn process_block(&mut self, l: &mut [f32], r: &mut [f32], bpm: Option<f64>) {
    self.chain.set_bypassed(self.params.get_bool(registry::BYPASS));
    // Fully settled bypass: the block passes through untouched
    if self.chain.fully_bypassed() { return; }

    let resolved = self.resolve();
    let smoothed = self.smooth.update(&resolved, l.len().min(r.len()));
    self.last.publish(&smoothed);

    self.chain.process_block(
      l, r, &smoothed,
      self.params.get(registry::INPUT_GAIN_DB),
      self.params.get(registry::OUTPUT_GAIN_DB),
      self.params.get(registry::MIX),
      bpm,
    );
  }

  // ── Scene and macro edits ──────────────────────────────────────────────

  pub fn scene(&self, index: usize) -> &SceneParams {
    &self.scenes[index.min(NUM_SCENES - 1)]
  }

  pub fn macro_map(&self) -> &MacroMap { &self.macros }

  pub fn set_scene_param(&mut self, scene_idx: usize, param_idx: usize, value: f32) {
    if scene_idx >= NUM_SCENES || param_idx >= scene::SCENE_PARAM_COUNT { return; }
    self.scenes[scene_idx].values[param_idx] = scene::INFO[param_idx].range.clamp(value);
  }

  // Copy the automated module parameter values into a slot.
  pub fn store_scene(&mut self, index: usize) {
    if index >= NUM_SCENES { return; }
    for i in 0..scene::SCENE_PARAM_COUNT {
      self.scenes[index].values[i] = self.params.get(registry::MODULE_BASE + i);
    }
    self.scenes[index].clamp_to_ranges();
  }

  // Capture the current morphed + macro'd sound into a clean scene.
  pub fn flatten_to_scene(&mut self, index: usize) {
    if index >= NUM_SCENES { return; }
    self.scenes[index] = self.resolve();
  }

  pub fn set_macro_targets(&mut self, index: usize, targets: Vec<MacroTarget>) {
    self.macros.set_targets(index, targets);
  }

  // ── Programs and persisted state ───────────────────────────────────────

  pub fn load_program(&mut self, index: usize) {
    let index = index.min(presets::NUM_PROGRAMS - 1);
    let program = presets::factory_program(index);
    self.scenes = program.scenes;
    self.macros.clear();
    for (i, targets) in program.macros.into_iter().enumerate() {
      self.macros.set_targets(i, targets);
    }
    self.program = index;

    // Performance params go back to defaults on a program switch
    for i in [
      registry::BYPASS, registry::INPUT_GAIN_DB, registry::OUTPUT_GAIN_DB,
      registry::MIX, registry::SCENE_A, registry::SCENE_B, registry::MORPH,
      registry::MACRO_1, registry::MACRO_2, registry::MACRO_3, registry::MACRO_4,
    ] {
      self.params.set(i, registry::ALL[i].default_value());
    }
  }

  pub fn save_state(&self) -> PresetFile {
    PresetFile {
      format: presets::FORMAT_TAG.to_string(),
      version: 1,
      params: presets::params_to_data(|i| self.params.get(i)),
      scenes: self.scenes.iter().map(presets::scene_to_data).collect(),
      macros: (0..NUM_MACROS).map(|m| presets::targets_to_data(self.macros.targets(m))).collect(),
    }
  }

  // Applies a recognized container. A legacy document carrying only the flat
  // parameter set leaves scenes and macros as they are.
  pub fn load_state(&mut self, file: &PresetFile) {
    for (id, v) in file.params.iter() {
      self.params.set_by_id(id, *v);
    }
    for (i, data) in file.scenes.iter().enumerate().take(NUM_SCENES) {
      presets::scene_from_data(data, &mut self.scenes[i]);
    }
    if !file.macros.is_empty() {
      self.macros.clear();
      for (i, targets) in file.macros.iter().enumerate().take(NUM_MACROS) {
        self.macros.set_targets(i, presets::targets_from_data(targets));
      }
    }
  }

  // Control messages drained by the host once per block.
  pub fn apply_msg(&mut self, msg: EngineMsg) {
    match msg {
      EngineMsg::SetSceneParam { scene, param, value } => self.set_scene_param(scene, param, value),
      EngineMsg::StoreScene { scene } => self.store_scene(scene),
      EngineMsg::FlattenScene { scene } => self.flatten_to_scene(scene),
      EngineMsg::SetMacroTargets { index, targets } => self.set_macro_targets(index, targets),
      EngineMsg::ReplaceScenes { scenes } => self.scenes = scenes,
      EngineMsg::ReplaceMacros { macros } => {
        for (i, targets) in macros.into_iter().enumerate() {
          self.macros.set_targets(i, targets);
        }
      }
      EngineMsg::SetTempo { .. } | EngineMsg::Quit => {}
    }
  }
}
