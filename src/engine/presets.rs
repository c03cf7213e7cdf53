// Factory programs and the preset container. A preset holds the flat
// automated parameter set, 8 scenes of named values and the 4 macro configs.
// Engine types stay serde-free; the DTOs here reference parameters by id so
// files survive any future reordering of in-memory indices.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::macro_map::{MacroCurve, MacroTarget, NUM_MACROS};
use super::macro_map;
use super::registry;
use super::scene::{self, SceneParams, NUM_SCENES};

// ── Factory programs ───────────────────────────────────────────────────────

pub const NUM_PROGRAMS: usize = 8;

pub const PROGRAM_NAMES: [&str; NUM_PROGRAMS] = [
  "Init",
  "Dark Ambience",
  "Rhythmic Delay",
  "Lo-Fi",
  "Shimmer Pad",
  "Dub Station",
  "Distortion Box",
  "Wide Stereo",
];

pub struct Program {
  pub name: &'static str,
  pub scenes: [SceneParams; NUM_SCENES],
  pub macros: [Vec<MacroTarget>; NUM_MACROS],
}

// Scale-then-offset one parameter across all eight scenes, clamped to range.
fn shift(scenes: &mut [SceneParams; NUM_SCENES], idx: usize, add: f32, mul: f32) {
  let range = &scene::INFO[idx].range;
  for s in scenes.iter_mut() {
    s.values[idx] = range.clamp(s.values[idx] * mul + add);
  }
}

fn base_scenes() -> [SceneParams; NUM_SCENES] {
  let mut s = [SceneParams::from_defaults(); NUM_SCENES];

  // 2: Dark Drive
  s[1].values[scene::FILT_CUTOFF] = 2000.0;
  s[1].values[scene::FILT_RESO] = 0.5;
  s[1].values[scene::DRIVE_AMT] = 0.4;
  s[1].values[scene::DRIVE_TONE] = 0.3;
  s[1].values[scene::REV_SIZE] = 0.7;

  // 3: Bright Echo (HP)
  s[2].values[scene::FILT_MODE] = 2.0;
  s[2].values[scene::FILT_CUTOFF] = 500.0;
  s[2].values[scene::DELAY_SYNC] = 4.0;
  s[2].values[scene::DELAY_FB] = 0.6;
  s[2].values[scene::DELAY_WIDTH] = 1.0;

  // 4: Wide Space
  s[3].values[scene::REV_SIZE] = 0.85;
  s[3].values[scene::REV_WIDTH] = 1.0;
  s[3].values[scene::REV_PRE_DELAY] = 50.0;
  s[3].values[scene::DELAY_WIDTH] = 1.0;
  s[3].values[scene::DELAY_PING_PONG] = 1.0;

  // 5: Crushed (BP, heavy drive)
  s[4].values[scene::FILT_MODE] = 1.0;
  s[4].values[scene::FILT_CUTOFF] = 1200.0;
  s[4].values[scene::FILT_RESO] = 0.7;
  s[4].values[scene::DRIVE_AMT] = 0.8;
  s[4].values[scene::DRIVE_TONE] = 0.7;

  // 6: Dub
  s[5].values[scene::DELAY_SYNC] = 3.0;
  s[5].values[scene::DELAY_FB] = 0.7;
  s[5].values[scene::DELAY_TONE] = 0.25;
  s[5].values[scene::DELAY_PING_PONG] = 1.0;
  s[5].values[scene::REV_SIZE] = 0.5;

  // 7: Shimmer
  s[6].values[scene::FILT_CUTOFF] = 12000.0;
  s[6].values[scene::REV_SIZE] = 0.9;
  s[6].values[scene::REV_DAMP] = 0.2;
  s[6].values[scene::REV_WIDTH] = 1.0;
  s[6].values[scene::REV_PRE_DELAY] = 30.0;

  // 8: Telephone (narrow BP, dry)
  s[7].values[scene::FILT_MODE] = 1.0;
  s[7].values[scene::FILT_CUTOFF] = 1500.0;
  s[7].values[scene::FILT_RESO] = 0.6;
  s[7].values[scene::DRIVE_AMT] = 0.2;
  s[7].values[scene::DELAY_FB] = 0.0;
  s[7].values[scene::REV_SIZE] = 0.1;

  s
}

pub fn factory_program(index: usize) -> Program {
  let index = index.min(NUM_PROGRAMS - 1);
  let mut scenes = base_scenes();
  let mut macros = macro_map::default_mappings();

  match index {
    1 => {
      // Dark Ambience
      shift(&mut scenes, scene::FILT_CUTOFF, 0.0, 0.35);
      shift(&mut scenes, scene::REV_SIZE, 0.3, 1.0);
      shift(&mut scenes, scene::REV_DAMP, 0.15, 1.0);
      shift(&mut scenes, scene::DRIVE_TONE, 0.0, 0.5);
      shift(&mut scenes, scene::DELAY_TONE, 0.0, 0.5);
      macros[0] = vec![
        MacroTarget::new(scene::FILT_CUTOFF, 0.8),
        MacroTarget::new(scene::REV_DAMP, -0.3),
      ];
      macros[2] = vec![
        MacroTarget::new(scene::REV_SIZE, 0.6),
        MacroTarget::new(scene::REV_PRE_DELAY, 0.4),
      ];
    }
    2 => {
      // Rhythmic Delay
      shift(&mut scenes, scene::DELAY_FB, 0.2, 1.0);
      shift(&mut scenes, scene::DELAY_WIDTH, 0.15, 1.0);
      shift(&mut scenes, scene::REV_SIZE, 0.0, 0.5);
      macros[2] = vec![
        MacroTarget::new(scene::DELAY_FB, 0.5),
        MacroTarget::new(scene::DELAY_WIDTH, 0.3),
        MacroTarget::new(scene::DELAY_TONE, -0.4),
      ];
    }
    3 => {
      // Lo-Fi
      shift(&mut scenes, scene::FILT_CUTOFF, 0.0, 0.5);
      shift(&mut scenes, scene::DRIVE_AMT, 0.25, 1.0);
      shift(&mut scenes, scene::FILT_RESO, 0.1, 1.0);
      macros[1] = vec![
        MacroTarget::new(scene::DRIVE_AMT, 0.5),
        MacroTarget::new(scene::DRIVE_TONE, -0.4),
        MacroTarget::new(scene::FILT_CUTOFF, -0.3),
      ];
    }
    4 => {
      // Shimmer Pad
      shift(&mut scenes, scene::FILT_CUTOFF, 0.0, 1.5);
      shift(&mut scenes, scene::REV_SIZE, 0.4, 1.0);
      shift(&mut scenes, scene::REV_DAMP, 0.0, 0.3);
      shift(&mut scenes, scene::REV_WIDTH, 0.2, 1.0);
      shift(&mut scenes, scene::DRIVE_AMT, 0.0, 0.3);
      macros[0] = vec![
        MacroTarget::new(scene::FILT_CUTOFF, 0.4),
        MacroTarget::new(scene::REV_SIZE, 0.3),
      ];
    }
    5 => {
      // Dub Station
      shift(&mut scenes, scene::DELAY_FB, 0.25, 1.0);
      shift(&mut scenes, scene::DELAY_TONE, 0.0, 0.4);
      shift(&mut scenes, scene::REV_SIZE, 0.15, 1.0);
      macros[2] = vec![
        MacroTarget::new(scene::DELAY_FB, 0.3),
        MacroTarget::new(scene::REV_SIZE, 0.4),
        MacroTarget::new(scene::DELAY_TONE, -0.3),
      ];
    }
    6 => {
      // Distortion Box
      shift(&mut scenes, scene::DRIVE_AMT, 0.4, 1.0);
      shift(&mut scenes, scene::FILT_CUTOFF, 0.0, 0.6);
      shift(&mut scenes, scene::REV_SIZE, 0.0, 0.3);
      shift(&mut scenes, scene::DELAY_FB, 0.0, 0.5);
      macros[1] = vec![
        MacroTarget::new(scene::DRIVE_AMT, 0.4),
        MacroTarget::new(scene::DRIVE_TONE, 0.5),
      ];
    }
    7 => {
      // Wide Stereo
      shift(&mut scenes, scene::DELAY_WIDTH, 0.2, 1.0);
      shift(&mut scenes, scene::REV_WIDTH, 0.2, 1.0);
      shift(&mut scenes, scene::REV_PRE_DELAY, 15.0, 1.0);
      for s in scenes.iter_mut() {
        if s.values[scene::DELAY_FB] > 0.1 {
          s.values[scene::DELAY_PING_PONG] = 1.0;
        }
      }
      macros[3] = vec![
        MacroTarget::new(scene::DELAY_WIDTH, 0.4),
        MacroTarget::new(scene::REV_WIDTH, 0.3),
        MacroTarget::new(scene::REV_PRE_DELAY, 0.3),
      ];
    }
    _ => {}
  }

  Program { name: PROGRAM_NAMES[index], scenes, macros }
}

// ── Preset container ───────────────────────────────────────────────────────

pub const FORMAT_TAG: &str = "MacroMorphPreset";

fn format_version() -> u32 { 1 }

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetData {
  pub param: String,
  pub amount: f32,
  pub curve: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresetFile {
  pub format: String,
  #[serde(default = "format_version")]
  pub version: u32,
  #[serde(default)]
  pub params: BTreeMap<String, f32>,
  // Absent in legacy files; factory data stays in place when missing
  #[serde(default)]
  pub scenes: Vec<BTreeMap<String, f32>>,
  #[serde(default)]
  pub macros: Vec<Vec<TargetData>>,
}

#[derive(Debug, Error)]
pub enum PresetError {
  #[error("preset io: {0}")]
  Io(#[from] std::io::Error),
  #[error("preset parse: {0}")]
  Json(#[from] serde_json::Error),
  #[error("unrecognized preset container")]
  BadFormat,
}

pub fn parse(bytes: &[u8]) -> Result<PresetFile, PresetError> {
  let file: PresetFile = serde_json::from_slice(bytes)?;
  if file.format != FORMAT_TAG {
    return Err(PresetError::BadFormat);
  }
  Ok(file)
}

pub fn load_file(path: &Path) -> Result<PresetFile, PresetError> {
  let bytes = fs::read(path)?;
  let file = parse(&bytes)?;
  log::info!("loaded preset from {}", path.display());
  Ok(file)
}

pub fn save_file(path: &Path, file: &PresetFile) -> Result<(), PresetError> {
  let bytes = serde_json::to_vec_pretty(file)?;
  fs::write(path, bytes)?;
  log::info!("saved preset to {}", path.display());
  Ok(())
}

// Id-keyed conversions between DTOs and engine values. Unknown identifiers
// are skipped on load so newer files degrade instead of failing.

pub fn scene_to_data(s: &SceneParams) -> BTreeMap<String, f32> {
  let mut map = BTreeMap::new();
  for (i, inf) in scene::INFO.iter().enumerate() {
    map.insert(inf.id.to_string(), s.values[i]);
  }
  map
}

pub fn scene_from_data(data: &BTreeMap<String, f32>, into: &mut SceneParams) {
  for (id, v) in data.iter() {
    if let Some(i) = scene::index_of(id) {
      into.values[i] = scene::INFO[i].range.clamp(*v);
    }
  }
}

pub fn targets_to_data(targets: &[MacroTarget]) -> Vec<TargetData> {
  targets.iter().map(|t| TargetData {
    param: scene::INFO[t.param].id.to_string(),
    amount: t.amount,
    curve: t.curve.index(),
  }).collect()
}

pub fn targets_from_data(data: &[TargetData]) -> Vec<MacroTarget> {
  data.iter().filter_map(|t| {
    scene::index_of(&t.param).map(|param| MacroTarget {
      param,
      amount: t.amount.clamp(-1.0, 1.0),
      curve: MacroCurve::from_index(t.curve),
    })
  }).collect()
}

pub fn params_to_data(get: impl Fn(usize) -> f32) -> BTreeMap<String, f32> {
  let mut map = BTreeMap::new();
  for (i, spec) in registry::ALL.iter().enumerate() {
    map.insert(spec.id.to_string(), get(i));
  }
  map
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn every_factory_scene_value_is_in_range() {
    for p in 0..NUM_PROGRAMS {
      let program = factory_program(p);
      assert_eq!(program.name, PROGRAM_NAMES[p]);
      for s in program.scenes.iter() {
        for (i, inf) in scene::INFO.iter().enumerate() {
          let v = s.values[i];
          assert!(v >= inf.range.min() && v <= inf.range.max(),
                  "program {p} {} = {v}", inf.id);
        }
      }
      for m in program.macros.iter() {
        assert!(m.len() <= macro_map::MAX_TARGETS);
        for t in m.iter() {
          assert!(t.param < scene::SCENE_PARAM_COUNT);
        }
      }
    }
  }

  #[test]
  fn program_index_out_of_range_clamps() {
    assert_eq!(factory_program(99).name, PROGRAM_NAMES[NUM_PROGRAMS - 1]);
  }

  #[test]
  fn container_round_trips_exactly() {
    let program = factory_program(5);
    let file = PresetFile {
      format: FORMAT_TAG.to_string(),
      version: 1,
      params: params_to_data(|i| registry::ALL[i].default_value()),
      scenes: program.scenes.iter().map(scene_to_data).collect(),
      macros: program.macros.iter().map(|m| targets_to_data(m)).collect(),
    };
    let bytes = serde_json::to_vec_pretty(&file).unwrap();
    let back = parse(&bytes).unwrap();
    assert_eq!(back.params, file.params);
    assert_eq!(back.scenes, file.scenes);
    for (a, b) in back.macros.iter().flatten().zip(file.macros.iter().flatten()) {
      assert_eq!(a.param, b.param);
      assert_eq!(a.amount, b.amount);
      assert_eq!(a.curve, b.curve);
    }
  }

  #[test]
  fn wrong_container_tag_is_rejected() {
    let json = br#"{ "format": "SomethingElse", "params": {} }"#;
    assert!(matches!(parse(json), Err(PresetError::BadFormat)));
  }

  #[test]
  fn legacy_params_only_document_loads() {
    let json = br#"{ "format": "MacroMorphPreset", "params": { "morph": 0.5 } }"#;
    let file = parse(json).unwrap();
    assert_eq!(file.params.get("morph"), Some(&0.5));
    assert!(file.scenes.is_empty());
    assert!(file.macros.is_empty());
    assert_eq!(file.version, 1);
  }

  #[test]
  fn unknown_identifiers_are_skipped_on_load() {
    let mut data = BTreeMap::new();
    data.insert("filtCutoffHz".to_string(), 440.0);
    data.insert("notAParam".to_string(), 9.0);
    let mut s = SceneParams::from_defaults();
    scene_from_data(&data, &mut s);
    assert_eq!(s.values[scene::FILT_CUTOFF], 440.0);

    let targets = targets_from_data(&[
      TargetData { param: "driveAmt".into(), amount: 2.0, curve: 3 },
      TargetData { param: "ghost".into(), amount: 0.5, curve: 0 },
    ]);
    assert_eq!(targets.len(), 1);
    assert_eq!(targets[0].param, scene::DRIVE_AMT);
    assert_eq!(targets[0].amount, 1.0); // clamped
    assert_eq!(targets[0].curve, MacroCurve::SCurve);
  }
}
