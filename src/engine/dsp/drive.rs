use super::OnePoleLP;

// Soft-clip waveshaper with a post-drive tone filter. Negligible drive skips
// the whole stage as a pure pass-through.
pub struct Drive {
  amount: f32,
  tone: [OnePoleLP; 2],
}

impl Drive {
  pub fn new() -> Self {
    Self { amount: 0.0, tone: [OnePoleLP::new(), OnePoleLP::new()] }
  }

  pub fn reset(&mut self) {
    for t in self.tone.iter_mut() { t.reset(); }
  }

  pub fn set_params(&mut self, amount01: f32, tone01: f32, sr: f32) {
    self.amount = amount01.clamp(0.0, 1.0);
    // tone 0 = dark (800 Hz), 1 = bright (20 kHz)
    let cutoff = 800.0 * (25.0f32).powf(tone01.clamp(0.0, 1.0));
    for t in self.tone.iter_mut() { t.set_cutoff(cutoff, sr); }
  }

  pub fn process_block(&mut self, l: &mut [f32], r: &mut [f32], channels: usize) {
    if self.amount < 0.001 { return; }
    let gain = 1.0 + self.amount * 49.0;
    for (ch, buf) in [l, r].into_iter().enumerate().take(channels) {
      let tone = &mut self.tone[ch];
      for s in buf.iter_mut() {
        *s = tone.tick((gain * *s).tanh());
      }
    }
  }
}
