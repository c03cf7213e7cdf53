pub mod delay;
pub mod drive;
pub mod filter;
pub mod reverb;

// Shared one-pole lowpass, used for feedback tone shaping and post-drive tone.
pub struct OnePoleLP { a: f32, y: f32 }
impl OnePoleLP {
  pub fn new() -> Self { Self { a: 1.0, y: 0.0 } }
  #[inline]
  pub fn set_cutoff(&mut self, hz: f32, sr: f32) {
    // y += a*(x-y) with a chosen so the pole sits at hz
    let hz = hz.clamp(1.0, sr * 0.5);
    self.a = 1.0 - (-core::f32::consts::TAU * hz / sr).exp();
  }
  #[inline]
  pub fn tick(&mut self, x: f32) -> f32 { self.y += self.a * (x - self.y); self.y }
  pub fn reset(&mut self) { self.y = 0.0; }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn one_pole_converges_on_dc() {
    let mut lp = OnePoleLP::new();
    lp.set_cutoff(500.0, 48000.0);
    let mut y = 0.0;
    for _ in 0..48000 { y = lp.tick(1.0); }
    assert!((y - 1.0).abs() < 1e-3);
  }

  #[test]
  fn one_pole_attenuates_more_when_darker() {
    // Impulse energy after the first tap is higher for a brighter cutoff
    let mut dark = OnePoleLP::new();
    let mut bright = OnePoleLP::new();
    dark.set_cutoff(500.0, 48000.0);
    bright.set_cutoff(20000.0, 48000.0);
    assert!(bright.tick(1.0) > dark.tick(1.0));
  }
}
