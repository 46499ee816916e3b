use nalgebra::Vector3;

/// Compute the smoothing factor of a first order low pass filter
/// with cutoff frequency `cutoff_freq` (in hz) sampled every `dt` seconds.
pub fn alpha(dt: f32, cutoff_freq: f32) -> f32 {
    if dt <= 0. || cutoff_freq <= 0. {
        return 1.;
    }
    let rc = 1.0 / (2.0 * core::f32::consts::PI * cutoff_freq);
    dt / (dt + rc)
}

/// First order low pass filter over a 3D sample.
#[derive(Clone, Debug)]
pub struct LowPassFilter {
    cutoff_freq: f32,
    output: Vector3<f32>,
    is_initialised: bool,
}

impl LowPassFilter {
    pub fn with_cutoff(cutoff_freq: f32) -> Self {
        Self {
            cutoff_freq,
            output: Vector3::zeros(),
            is_initialised: false,
        }
    }

    pub fn output(&self) -> Vector3<f32> {
        self.output
    }

    /// Apply a new sample taken `dt` seconds after the last one.
    /// The first sample initialises the filter output.
    pub fn apply(&mut self, sample: Vector3<f32>, dt: f32) -> Vector3<f32> {
        self.output = if self.is_initialised {
            self.output + (sample - self.output) * alpha(dt, self.cutoff_freq)
        } else {
            self.is_initialised = true;
            sample
        };
        self.output
    }

    pub fn reset(&mut self, value: Vector3<f32>) {
        self.is_initialised = true;
        self.output = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn first_sample_passes_through() {
        let mut filter = LowPassFilter::with_cutoff(5.);
        let sample = Vector3::new(1., 2., 3.);
        assert_eq!(filter.apply(sample, 0.02), sample);
    }

    #[test]
    fn converges_to_constant_input() {
        let mut filter = LowPassFilter::with_cutoff(5.);
        filter.reset(Vector3::zeros());

        let target = Vector3::new(1., -1., 0.5);
        let first = filter.apply(target, 0.02);
        assert!(first.x > 0. && first.x < 1.);

        for _ in 0..500 {
            filter.apply(target, 0.02);
        }
        assert_relative_eq!(filter.output(), target, epsilon = 1e-4);
    }

    #[test]
    fn zero_cutoff_disables_filtering() {
        assert_eq!(alpha(0.02, 0.), 1.);
    }
}
