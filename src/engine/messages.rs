use super::macro_map::{MacroTarget, NUM_MACROS};
use super::scene::{SceneParams, NUM_SCENES};

// Control-thread edits travel to the audio thread as complete owned values;
// the audio thread swaps them in while draining, so it never observes a
// half-updated scene or macro list.
#[derive(Clone, Debug)]
pub enum EngineMsg {
  SetSceneParam { scene: usize, param: usize, value: f32 },
  StoreScene { scene: usize },
  FlattenScene { scene: usize },
  SetMacroTargets { index: usize, targets: Vec<MacroTarget> },
  ReplaceScenes { scenes: [SceneParams; NUM_SCENES] },
  ReplaceMacros { macros: [Vec<MacroTarget>; NUM_MACROS] },
  SetTempo { bpm: f64 },
  Quit,
}
