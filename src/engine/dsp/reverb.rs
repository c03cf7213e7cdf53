use freeverb::Freeverb;

// Algorithmic reverb collaborator: a freeverb instance set to pure wet
// (dry/wet is the orchestrator's job) behind a 0..200 ms pre-delay line.
pub struct ReverbUnit {
  verb: Freeverb,
  pre_buf: [Vec<f32>; 2],
  pre_wr: [usize; 2],
  pre_samples: usize,
  sr: f32,
}

const MAX_PRE_DELAY_SECONDS: f32 = 0.2;

impl ReverbUnit {
  pub fn new(sr: f32) -> Self {
    let mut verb = Freeverb::new(sr as usize);
    verb.set_wet(1.0);
    verb.set_dry(0.0);
    let pre_len = (sr * MAX_PRE_DELAY_SECONDS) as usize + 1;
    Self {
      verb,
      pre_buf: [vec![0.0; pre_len], vec![0.0; pre_len]],
      pre_wr: [0, 0],
      pre_samples: 0,
      sr,
    }
  }

  pub fn reset(&mut self) {
    // Freeverb keeps no public reset; rebuilding it flushes the comb tails
    let sr = self.sr;
    let mut verb = Freeverb::new(sr as usize);
    verb.set_wet(1.0);
    verb.set_dry(0.0);
    self.verb = verb;
    for b in self.pre_buf.iter_mut() { b.fill(0.0); }
    self.pre_wr = [0, 0];
  }

  pub fn set_params(&mut self, size01: f32, damp01: f32, pre_delay_ms: f32, width01: f32) {
    self.verb.set_room_size(size01.clamp(0.0, 1.0) as f64);
    self.verb.set_dampening(damp01.clamp(0.0, 1.0) as f64);
    self.verb.set_width(width01.clamp(0.0, 1.0) as f64);
    self.verb.set_wet(1.0);
    self.verb.set_dry(0.0);
    let max = self.pre_buf[0].len() - 1;
    self.pre_samples = ((pre_delay_ms * 0.001 * self.sr) as usize).min(max);
  }

  // Replaces the buffer contents with the reverb's wet signal.
  pub fn process_block(&mut self, l: &mut [f32], r: &mut [f32], channels: usize) {
    let n = l.len();
    for s in 0..n {
      let mut frame = [l[s], if channels > 1 { r[s] } else { l[s] }];
      if self.pre_samples > 0 {
        let pre_len = self.pre_buf[0].len();
        for ch in 0..2 {
          self.pre_buf[ch][self.pre_wr[ch]] = frame[ch];
          let rd = (self.pre_wr[ch] + pre_len - self.pre_samples) % pre_len;
          frame[ch] = self.pre_buf[ch][rd];
          self.pre_wr[ch] += 1;
          if self.pre_wr[ch] >= pre_len { self.pre_wr[ch] = 0; }
        }
      }
      let (wl, wr) = self.verb.tick((frame[0] as f64, frame[1] as f64));
      l[s] = wl as f32;
      if channels > 1 { r[s] = wr as f32; }
    }
  }
}
