use crate::core::Rgb8;
use crate::track::{Keyframe, Lerp, find_segment, interpolate};

/// Five-anchor scale from cold indigo through amber to hot red, anchors at
/// intensity 0, 0.25, 0.5, 0.75 and 1.
const RAMP_ANCHORS: [Rgb8; 5] = [
    Rgb8::new(0x31, 0x2e, 0x81),
    Rgb8::new(0x3b, 0x82, 0xf6),
    Rgb8::new(0xfa, 0xcc, 0x15),
    Rgb8::new(0xf9, 0x73, 0x16),
    Rgb8::new(0xdc, 0x26, 0x26),
];

#[derive(Clone, Copy, Debug)]
pub struct CurveOpts {
    /// Evenly spaced sample count across the duration, endpoints included.
    pub samples: usize,
    /// Mix weight of the pseudo-noise perturbation in [`complexity_curve`].
    pub noise_factor: f64,
}

impl Default for CurveOpts {
    fn default() -> Self {
        Self {
            samples: 200,
            noise_factor: 0.3,
        }
    }
}

/// One gradient stop of a rendered intensity ramp.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RampStop {
    /// Horizontal position in `[0, 1]` along the timeline strip.
    pub offset: f64,
    pub color: Rgb8,
}

/// One vertex of a rendered complexity curve.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CurvePoint {
    /// Horizontal position in `[0, 1]` along the timeline strip.
    pub offset: f64,
    /// Perturbed sample; the view maps this to a vertical offset.
    pub value: f64,
}

/// Map an intensity to the ramp scale, linear RGB blend between the two
/// bracketing anchors. Input is clamped to `[0, 1]`.
pub fn intensity_color(value: f64) -> Rgb8 {
    let scaled = value.clamp(0.0, 1.0) * (RAMP_ANCHORS.len() - 1) as f64;
    let idx = (scaled.floor() as usize).min(RAMP_ANCHORS.len() - 2);
    Rgb8::lerp(&RAMP_ANCHORS[idx], &RAMP_ANCHORS[idx + 1], scaled - idx as f64)
}

/// Densify a sparse intensity track into a gradient: `opts.samples` stops
/// across `[0, duration_secs]`, each sampled intensity mapped through the
/// ramp scale.
///
/// Deterministic: identical inputs yield identical stop sequences. Fewer than
/// two keyframes degrade to a flat ramp; an empty track holds the 0.0
/// baseline.
pub fn intensity_ramp(keys: &[Keyframe<f64>], duration_secs: f64, opts: CurveOpts) -> Vec<RampStop> {
    let n = opts.samples.max(2);
    (0..n)
        .map(|i| {
            let offset = i as f64 / (n - 1) as f64;
            RampStop {
                offset,
                color: intensity_color(sample_held(keys, offset * duration_secs)),
            }
        })
        .collect()
}

/// Densify a sparse complexity track into a plottable curve, perturbing each
/// sample with the fixed pseudo-noise term
/// `sin(i·0.4)·cos(i·0.15) · value · noise_factor`.
///
/// The noise depends only on the sample index and the clean sample, so
/// repeated renders of the same track are bit-identical. Degrades like
/// [`intensity_ramp`] below two keyframes.
pub fn complexity_curve(
    keys: &[Keyframe<f64>],
    duration_secs: f64,
    opts: CurveOpts,
) -> Vec<CurvePoint> {
    let n = opts.samples.max(2);
    (0..n)
        .map(|i| {
            let offset = i as f64 / (n - 1) as f64;
            let clean = sample_held(keys, offset * duration_secs);
            let i = i as f64;
            let noise = (i * 0.4).sin() * (i * 0.15).cos() * clean * opts.noise_factor;
            CurvePoint {
                offset,
                value: clean + noise,
            }
        })
        .collect()
}

/// Guarded sampling: interpolate when a segment exists, hold the single value
/// below two keyframes, hold 0.0 when empty.
fn sample_held(keys: &[Keyframe<f64>], t: f64) -> f64 {
    match keys.len() {
        0 => 0.0,
        1 => keys[0].value,
        _ => {
            let seg = find_segment(keys, t);
            interpolate(&seg.start.value, &seg.end.value, seg.start.time, seg.end.time, t)
        }
    }
}
