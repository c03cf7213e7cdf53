// Canonical parameter registry. Every automatable parameter id, range and
// default lives here; ids are never renamed once shipped (preset recall).

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ParamKind { Float01, FloatRange, Choice, Toggle }

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ParamScale { Linear, Log }

// Smoothing categories keep click-free changes consistent across modules.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SmoothGroup {
  None,
  Gain,      // input/output gain, mix
  Cutoff,    // filter cutoff
  Feedback,  // delay feedback
  Timeish,   // reverb size / predelay style params
  Tone,      // tone controls
}

pub fn smoothing_ms(g: SmoothGroup) -> f32 {
  match g {
    SmoothGroup::Gain => 20.0,
    SmoothGroup::Cutoff => 20.0,
    SmoothGroup::Feedback => 50.0,
    SmoothGroup::Timeish => 100.0,
    SmoothGroup::Tone => 30.0,
    SmoothGroup::None => 0.0,
  }
}

#[derive(Clone, Copy, Debug)]
pub struct ParamSpec {
  pub id: &'static str,
  pub kind: ParamKind,
  pub min: f32,
  pub max: f32,
  pub default: f32,
  // Choice parameters only
  pub choices: usize,
  pub default_choice: usize,
  pub scale: ParamScale,
  pub smooth: SmoothGroup,
}

impl ParamSpec {
  pub fn default_value(&self) -> f32 {
    match self.kind {
      ParamKind::Choice => self.default_choice as f32,
      _ => self.default,
    }
  }
  pub fn clamp(&self, v: f32) -> f32 {
    match self.kind {
      ParamKind::Choice => v.clamp(0.0, (self.choices.max(1) - 1) as f32),
      ParamKind::Toggle => v.clamp(0.0, 1.0),
      _ => v.clamp(self.min, self.max),
    }
  }
}

// Indices into ALL. Fixed forever; serialized data uses ids, code uses these.
pub const BYPASS: usize = 0;
pub const INPUT_GAIN_DB: usize = 1;
pub const OUTPUT_GAIN_DB: usize = 2;
pub const MIX: usize = 3;
pub const SCENE_A: usize = 4;
pub const SCENE_B: usize = 5;
pub const MORPH: usize = 6;
pub const MACRO_1: usize = 7;
pub const MACRO_2: usize = 8;
pub const MACRO_3: usize = 9;
pub const MACRO_4: usize = 10;
pub const FILT_MODE: usize = 11;
pub const FILT_CUTOFF: usize = 12;
pub const FILT_RESO: usize = 13;
pub const DRIVE_AMT: usize = 14;
pub const DRIVE_TONE: usize = 15;
pub const DELAY_SYNC: usize = 16;
pub const DELAY_FB: usize = 17;
pub const DELAY_TONE: usize = 18;
pub const DELAY_WIDTH: usize = 19;
pub const DELAY_PING_PONG: usize = 20;
pub const REV_SIZE: usize = 21;
pub const REV_DAMP: usize = 22;
pub const REV_PRE_DELAY: usize = 23;
pub const REV_WIDTH: usize = 24;

pub const PARAM_COUNT: usize = 25;

// First module parameter; ALL[MODULE_BASE..] mirrors the scene table order.
pub const MODULE_BASE: usize = FILT_MODE;

pub static ALL: [ParamSpec; PARAM_COUNT] = [
  // Global / performance
  p("bypass",        ParamKind::Toggle,     0.0, 1.0, 0.0, 2, 0, SmoothGroup::None),
  p("inputGainDb",   ParamKind::FloatRange, -24.0, 24.0, 0.0, 0, 0, SmoothGroup::Gain),
  p("outputGainDb",  ParamKind::FloatRange, -24.0, 24.0, 0.0, 0, 0, SmoothGroup::Gain),
  p("mix",           ParamKind::Float01,    0.0, 1.0, 1.0, 0, 0, SmoothGroup::Gain),
  p("sceneA",        ParamKind::Choice,     0.0, 7.0, 0.0, 8, 0, SmoothGroup::None),
  p("sceneB",        ParamKind::Choice,     0.0, 7.0, 0.0, 8, 1, SmoothGroup::None),
  p("morph",         ParamKind::Float01,    0.0, 1.0, 0.0, 0, 0, SmoothGroup::Gain),
  p("macro1",        ParamKind::Float01,    0.0, 1.0, 0.0, 0, 0, SmoothGroup::Gain),
  p("macro2",        ParamKind::Float01,    0.0, 1.0, 0.0, 0, 0, SmoothGroup::Gain),
  p("macro3",        ParamKind::Float01,    0.0, 1.0, 0.0, 0, 0, SmoothGroup::Gain),
  p("macro4",        ParamKind::Float01,    0.0, 1.0, 0.0, 0, 0, SmoothGroup::Gain),
  // Filter
  p("filtMode",      ParamKind::Choice,     0.0, 2.0, 0.0, 3, 0, SmoothGroup::None),
  plog("filtCutoffHz", ParamKind::FloatRange, 20.0, 20000.0, 8000.0, SmoothGroup::Cutoff),
  p("filtReso",      ParamKind::Float01,    0.0, 1.0, 0.2, 0, 0, SmoothGroup::Tone),
  // Drive
  p("driveAmt",      ParamKind::Float01,    0.0, 1.0, 0.0, 0, 0, SmoothGroup::Tone),
  p("driveTone",     ParamKind::Float01,    0.0, 1.0, 0.5, 0, 0, SmoothGroup::Tone),
  // Delay
  p("delaySync",     ParamKind::Choice,     0.0, 7.0, 2.0, 8, 2, SmoothGroup::None),
  p("delayFeedback", ParamKind::FloatRange, 0.0, 0.95, 0.25, 0, 0, SmoothGroup::Feedback),
  p("delayTone",     ParamKind::Float01,    0.0, 1.0, 0.5, 0, 0, SmoothGroup::Tone),
  p("delayWidth",    ParamKind::Float01,    0.0, 1.0, 0.7, 0, 0, SmoothGroup::Tone),
  p("delayPingPong", ParamKind::Toggle,     0.0, 1.0, 0.0, 2, 0, SmoothGroup::None),
  // Reverb
  p("revSize",       ParamKind::Float01,    0.0, 1.0, 0.35, 0, 0, SmoothGroup::Timeish),
  p("revDamp",       ParamKind::Float01,    0.0, 1.0, 0.5, 0, 0, SmoothGroup::Tone),
  p("revPreDelayMs", ParamKind::FloatRange, 0.0, 200.0, 10.0, 0, 0, SmoothGroup::Timeish),
  p("revWidth",      ParamKind::Float01,    0.0, 1.0, 0.8, 0, 0, SmoothGroup::Tone),
];

const fn p(id: &'static str, kind: ParamKind, min: f32, max: f32, default: f32,
           choices: usize, default_choice: usize, smooth: SmoothGroup) -> ParamSpec {
  ParamSpec { id, kind, min, max, default, choices, default_choice, scale: ParamScale::Linear, smooth }
}

const fn plog(id: &'static str, kind: ParamKind, min: f32, max: f32, default: f32,
              smooth: SmoothGroup) -> ParamSpec {
  ParamSpec { id, kind, min, max, default, choices: 0, default_choice: 0, scale: ParamScale::Log, smooth }
}

pub fn find(id: &str) -> Option<usize> {
  ALL.iter().position(|s| s.id == id)
}

pub fn choice_labels(index: usize) -> &'static [&'static str] {
  match index {
    FILT_MODE => &["LP", "BP", "HP"],
    SCENE_A | SCENE_B => &["1", "2", "3", "4", "5", "6", "7", "8"],
    DELAY_SYNC => &["1/32", "1/16", "1/8", "1/4", "1/2", "1 Bar", "1/8 Dot", "1/4 Dot"],
    _ => &["Off", "On"],
  }
}
