pub mod engine {
  pub mod audio;
  pub mod chain;
  pub mod dsp;
  pub mod macro_map;
  pub mod messages;
  pub mod params;
  pub mod presets;
  pub mod processor;
  pub mod registry;
  pub mod scene;
  pub mod smooth;
}

pub use engine::audio::{AudioEngine, HostError};
pub use engine::macro_map::{MacroCurve, MacroMap, MacroTarget};
pub use engine::messages::EngineMsg;
pub use engine::params::{LastComputed, ParamBank};
pub use engine::presets::{PresetError, PresetFile};
pub use engine::processor::Processor;
pub use engine::scene::SceneParams;
