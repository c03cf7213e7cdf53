use super::OnePoleLP;
use crate::engine::smooth::LinearRamp;

// Tempo-synced stereo delay: circular buffer per channel, fractional read,
// one-pole tone filter in the feedback loop, ping-pong routing and a
// mono/stereo width blend. The wet signal is summed into the input (an
// additive send, not a replace effect).

// Note lengths in beats for sync indices 0..7:
// 1/32, 1/16, 1/8, 1/4, 1/2, 1 bar, 1/8 dotted, 1/4 dotted.
pub const SYNC_BEATS: [f32; 8] = [0.125, 0.25, 0.5, 1.0, 2.0, 4.0, 0.75, 1.5];

pub const FALLBACK_BPM: f64 = 120.0;

// Max delay: 2 seconds of audio, which covers one bar down to 30 BPM.
const MAX_DELAY_SECONDS: f32 = 2.0;

pub struct TempoDelay {
  buf: [Vec<f32>; 2],
  wr: [usize; 2],
  len: usize,
  // Smoothed delay length in samples, advanced per sample and shared by both
  // channels so left/right stay time-locked.
  time: LinearRamp,
  tone: [OnePoleLP; 2],
  fb: f32,
  width: f32,
  ping_pong: bool,
  channels: usize,
  sr: f32,
}

impl TempoDelay {
  pub fn new(sr: f32, channels: usize) -> Self {
    let len = ((sr * MAX_DELAY_SECONDS) as usize).max(64);
    let mut time = LinearRamp::new(sr, 0.05);
    time.set((len / 4) as f32);
    Self {
      buf: [vec![0.0; len], vec![0.0; len]],
      wr: [0, 0],
      len,
      time,
      tone: [OnePoleLP::new(), OnePoleLP::new()],
      fb: 0.25,
      width: 0.7,
      ping_pong: false,
      channels: channels.clamp(1, 2),
      sr,
    }
  }

  pub fn reset(&mut self) {
    for b in self.buf.iter_mut() { b.fill(0.0); }
    self.wr = [0, 0];
    for t in self.tone.iter_mut() { t.reset(); }
  }

  pub fn set_params(&mut self, sync_index: usize, feedback: f32, tone01: f32,
                    width01: f32, ping_pong: bool, bpm: Option<f64>) {
    // Feedback is hard-capped below unity loop gain no matter what comes in
    self.fb = feedback.clamp(0.0, 0.95);
    self.width = width01.clamp(0.0, 1.0);
    self.ping_pong = ping_pong;

    let beats = SYNC_BEATS[sync_index.min(SYNC_BEATS.len() - 1)];
    // A missing or degenerate tempo report is treated as unknown
    let bpm = match bpm {
      Some(b) if b > 20.0 => b,
      _ => FALLBACK_BPM,
    };
    let samples = beats * (60.0 / bpm) as f32 * self.sr;
    self.time.set_target(samples.clamp(1.0, (self.len - 1) as f32));

    // tone 0 = dark (500 Hz), 1 = bright (20 kHz)
    let cutoff = 500.0 * (40.0f32).powf(tone01.clamp(0.0, 1.0));
    for t in self.tone.iter_mut() { t.set_cutoff(cutoff, self.sr); }
  }

  #[inline]
  fn read_frac(buf: &[f32], len: usize, pos: f32) -> f32 {
    let i0 = pos.floor() as i32;
    let frac = pos - i0 as f32;
    let m = len as i32;
    let wrap = |i: i32| -> usize { ((i % m + m) % m) as usize };
    let s0 = buf[wrap(i0)];
    let s1 = buf[wrap(i0 + 1)];
    s0 * (1.0 - frac) + s1 * frac
  }

  pub fn process_block(&mut self, l: &mut [f32], r: &mut [f32]) {
    let channels = self.channels;
    let pp = self.ping_pong && channels == 2;
    for n in 0..l.len() {
      // One shared time step per sample; both channels read the same length
      let d = self.time.next();

      // Read every channel before any write: ping-pong feedback consumes the
      // other channel's just-read sample, not a just-written one.
      let mut delayed = [0.0f32; 2];
      for ch in 0..channels {
        let pos = self.wr[ch] as f32 - d;
        delayed[ch] = Self::read_frac(&self.buf[ch], self.len, pos);
      }

      for ch in 0..channels {
        let x = if ch == 0 { l[n] } else { r[n] };
        let fb_src = if pp { delayed[1 - ch] } else { delayed[ch] };
        let fb_in = self.tone[ch].tick(fb_src) * self.fb;
        self.buf[ch][self.wr[ch]] = x + fb_in;

        let mut wet = delayed[ch];
        if self.width < 1.0 && channels == 2 {
          let mono = 0.5 * (delayed[0] + delayed[1]);
          wet = mono + self.width * (delayed[ch] - mono);
        }
        let out = x + wet;
        if ch == 0 { l[n] = out; } else { r[n] = out; }

        self.wr[ch] += 1;
        if self.wr[ch] >= self.len { self.wr[ch] = 0; }
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  // sr 1000 keeps delay lengths small: sync 0 (1/32) at 75 BPM is exactly
  // 0.125 * (60/75) * 1000 = 100 samples.
  const SR: f32 = 1000.0;
  const N: usize = 100;

  fn make(feedback: f32, width: f32, ping_pong: bool) -> TempoDelay {
    let mut d = TempoDelay::new(SR, 2);
    d.set_params(0, feedback, 1.0, width, ping_pong, Some(75.0));
    // settle the time ramp so echoes land on exact sample offsets
    let t = d.time.target();
    d.time.set(t);
    d
  }

  fn run_impulse(d: &mut TempoDelay, samples: usize) -> (Vec<f32>, Vec<f32>) {
    let mut out_l = Vec::with_capacity(samples);
    let mut out_r = Vec::with_capacity(samples);
    for i in 0..samples {
      let mut l = [if i == 0 { 1.0 } else { 0.0 }];
      let mut r = [0.0];
      d.process_block(&mut l, &mut r);
      out_l.push(l[0]);
      out_r.push(r[0]);
    }
    (out_l, out_r)
  }

  fn peak(v: &[f32], at: usize) -> f32 {
    v[at - 2..=at + 2].iter().fold(0.0f32, |m, x| m.max(x.abs()))
  }

  #[test]
  fn impulse_echoes_decay_by_the_feedback_factor() {
    let mut d = make(0.5, 1.0, false);
    let (l, _) = run_impulse(&mut d, 4 * N + 3);
    // Read-before-write: nothing may arrive a sample early
    assert_eq!(l[N - 1], 0.0);
    assert!((l[N] - 1.0).abs() < 1e-6, "first delayed image at N, got {}", l[N]);
    // Feedback repeats: each pass through the loop scales by ~0.5, with a
    // little smear from the tone filter
    let e2 = peak(&l, 2 * N);
    let e3 = peak(&l, 3 * N);
    assert!((e2 - 0.5).abs() < 0.05, "second echo {e2}");
    assert!((e3 - 0.25).abs() < 0.05, "third echo {e3}");
  }

  #[test]
  fn zero_width_collapses_both_channels_to_mono() {
    let mut d = make(0.5, 0.0, false);
    let (l, r) = run_impulse(&mut d, 3 * N);
    for i in 1..3 * N {
      // input was only ever on channel 0, so past the dry sample both wet
      // outputs must be identical
      assert!((l[i] - r[i]).abs() < 1e-6, "diverged at {i}");
    }
  }

  #[test]
  fn full_width_keeps_channel_images_independent() {
    let mut d = make(0.5, 1.0, false);
    let (_, r) = run_impulse(&mut d, 3 * N);
    assert!(r.iter().all(|x| x.abs() < 1e-9), "silent channel grew a signal");
  }

  #[test]
  fn ping_pong_alternates_channels_per_hop() {
    let mut d = make(0.5, 1.0, true);
    let (l, r) = run_impulse(&mut d, 4 * N + 3);
    // Direct delayed image of the impulse stays on channel 0
    assert!((l[N] - 1.0).abs() < 1e-6);
    assert!(r[N].abs() < 1e-6);
    // First feedback hop lands on channel 1, the next back on channel 0
    let (e_l2, e_r2) = (peak(&l, 2 * N), peak(&r, 2 * N));
    assert!((e_r2 - 0.5).abs() < 0.05, "hop 1 on R was {e_r2}");
    assert!(e_l2 < 0.05, "hop 1 leaked to L: {e_l2}");
    let (e_l3, e_r3) = (peak(&l, 3 * N), peak(&r, 3 * N));
    assert!((e_l3 - 0.25).abs() < 0.05, "hop 2 on L was {e_l3}");
    assert!(e_r3 < 0.05, "hop 2 leaked to R: {e_r3}");
  }

  #[test]
  fn feedback_is_capped_below_unity() {
    let mut d = make(5.0, 1.0, false);
    let (l, _) = run_impulse(&mut d, 10 * N);
    // With the 0.95 cap the echoes must decay, never grow
    let early = peak(&l, N);
    let late = peak(&l, 9 * N);
    assert!(late < early);
    assert!(l.iter().all(|x| x.is_finite()));
  }

  #[test]
  fn missing_or_bogus_tempo_falls_back_to_120() {
    let mut a = TempoDelay::new(48000.0, 2);
    let mut b = TempoDelay::new(48000.0, 2);
    let mut c = TempoDelay::new(48000.0, 2);
    a.set_params(3, 0.3, 0.5, 1.0, false, None);
    b.set_params(3, 0.3, 0.5, 1.0, false, Some(10.0));
    c.set_params(3, 0.3, 0.5, 1.0, false, Some(120.0));
    assert_eq!(a.time.target(), c.time.target());
    assert_eq!(b.time.target(), c.time.target());
    // 1/4 note at 120 BPM = half a second
    assert_eq!(c.time.target(), 24000.0);
  }

  #[test]
  fn delay_time_is_clamped_to_the_buffer() {
    let mut d = TempoDelay::new(1000.0, 2);
    // 1 bar at 21 BPM is ~11.4 s, far beyond the 2 s buffer
    d.set_params(5, 0.3, 0.5, 1.0, false, Some(21.0));
    assert_eq!(d.time.target(), (d.len - 1) as f32);
  }

  #[test]
  fn mono_ping_pong_degrades_to_plain_feedback() {
    let mut d = TempoDelay::new(SR, 1);
    d.set_params(0, 0.5, 1.0, 1.0, true, Some(75.0));
    let t = d.time.target();
    d.time.set(t);
    let (l, _) = run_impulse(&mut d, 3 * N + 3);
    assert!((l[N] - 1.0).abs() < 1e-6);
    let e2 = peak(&l, 2 * N);
    assert!((e2 - 0.5).abs() < 0.05);
  }
}
