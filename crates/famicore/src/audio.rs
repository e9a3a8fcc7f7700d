//! Audio output seam.
//!
//! This core does not synthesize audio; the sink exists so a console can be
//! wired into a host mixer ahead of an APU implementation.

pub trait AudioSink {
    /// Declares the host sample rate the sink expects.
    fn set_sample_rate(&mut self, sample_rate: u32);

    /// Accepts one mono sample in `[-1.0, 1.0]`.
    fn push_sample(&mut self, sample: f32);
}
