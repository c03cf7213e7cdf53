use std::f32::consts::PI;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FilterMode {
    Lowpass,
    Bandpass,
    Highpass,
}

impl FilterMode {
    pub fn from_index(i: usize) -> Self {
        match i {
            1 => FilterMode::Bandpass,
            2 => FilterMode::Highpass,
            _ => FilterMode::Lowpass,
        }
    }
}

// TPT state-variable core, one per channel.
#[derive(Clone, Copy)]
struct SvfState {
    ic1eq: f32,
    ic2eq: f32,
}

impl SvfState {
    fn new() -> Self {
        Self { ic1eq: 0.0, ic2eq: 0.0 }
    }
    #[inline]
    fn tick(&mut self, x: f32, g: f32, k: f32) -> (f32, f32, f32) {
        let v1 = (self.ic1eq + g * (x - self.ic2eq)) / (1.0 + g * (g + k));
        let v2 = self.ic2eq + g * v1;
        self.ic1eq = 2.0 * v1 - self.ic1eq;
        self.ic2eq = 2.0 * v2 - self.ic2eq;
        let lp = v2;
        let bp = v1;
        let hp = x - k * bp - lp;
        (lp, bp, hp)
    }
}

pub struct MultiFilter {
    mode: FilterMode,
    g: f32,
    k: f32,
    state: [SvfState; 2],
}

impl MultiFilter {
    pub fn new() -> Self {
        Self {
            mode: FilterMode::Lowpass,
            g: 0.1,
            k: 1.0 / 0.7071,
            state: [SvfState::new(); 2],
        }
    }

    pub fn reset(&mut self) {
        self.state = [SvfState::new(); 2];
    }

    /// mode 0 = LP, 1 = BP, 2 = HP; reso01 maps 0 to a flat response and
    /// 1 to an aggressive Q near self-oscillation.
    pub fn set_params(&mut self, mode: usize, cutoff_hz: f32, reso01: f32, sr: f32) {
        self.mode = FilterMode::from_index(mode);
        self.g = (PI * (cutoff_hz / sr).clamp(0.0001, 0.49)).tan();
        let q = 0.7071 + reso01.clamp(0.0, 1.0) * 9.3;
        self.k = 1.0 / q;
    }

    pub fn process_block(&mut self, l: &mut [f32], r: &mut [f32], channels: usize) {
        let (g, k, mode) = (self.g, self.k, self.mode);
        for (ch, buf) in [l, r].into_iter().enumerate().take(channels) {
            let st = &mut self.state[ch];
            for s in buf.iter_mut() {
                let (lp, bp, hp) = st.tick(*s, g, k);
                *s = match mode {
                    FilterMode::Lowpass => lp,
                    FilterMode::Bandpass => bp,
                    FilterMode::Highpass => hp,
                };
            }
        }
    }
}
