use crate::core::{Point, Rgb8, Vec3};
use crate::error::{PrevizError, PrevizResult};

/// A timestamped value on a piecewise-linear track.
///
/// The optional label is a categorical cue riding on the keyframe (a pose cue
/// on position tracks, an emotion name on intensity tracks, a movement name on
/// camera tracks).
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Keyframe<V> {
    pub time: f64,
    pub value: V,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl<V> Keyframe<V> {
    pub fn new(time: f64, value: V) -> Self {
        Self {
            time,
            value,
            label: None,
        }
    }

    pub fn labeled(time: f64, value: V, label: impl Into<String>) -> Self {
        Self {
            time,
            value,
            label: Some(label.into()),
        }
    }
}

pub trait Lerp: Sized {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        a + (b - a) * t
    }
}

impl Lerp for Point {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        Point::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t)
    }
}

impl Lerp for Vec3 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        Vec3::new(
            a.x + (b.x - a.x) * t,
            a.y + (b.y - a.y) * t,
            a.z + (b.z - a.z) * t,
        )
    }
}

impl Lerp for Rgb8 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        fn lerp_u8(a: u8, b: u8, t: f64) -> u8 {
            let a = f64::from(a);
            let b = f64::from(b);
            (a + (b - a) * t).round().clamp(0.0, 255.0) as u8
        }

        Self {
            r: lerp_u8(a.r, b.r, t),
            g: lerp_u8(a.g, b.g, t),
            b: lerp_u8(a.b, b.b, t),
        }
    }
}

/// The pair of keyframes bracketing a query time.
///
/// Outside the track's range both ends point at the same boundary keyframe
/// (held/clamped, never extrapolated).
#[derive(Clone, Copy, Debug)]
pub struct Segment<'a, V> {
    pub start: &'a Keyframe<V>,
    pub end: &'a Keyframe<V>,
}

/// Locate the bracketing pair for `t` in a time-ordered keyframe sequence.
///
/// Ordering is a caller invariant: sequences are authored sorted and validated
/// at document load; this function never sorts. A `NaN` query holds at the
/// first keyframe, like any pre-start time.
///
/// # Panics
///
/// Panics if `keys` is empty. Callers that may hold empty tracks go through
/// [`Track::sample`], which guards instead.
pub fn find_segment<'a, V>(keys: &'a [Keyframe<V>], t: f64) -> Segment<'a, V> {
    if keys.len() == 1 || t <= keys[0].time {
        return Segment {
            start: &keys[0],
            end: &keys[0],
        };
    }

    let idx = keys.partition_point(|k| k.time <= t);
    if idx == 0 {
        // Only a NaN query lands here (every time comparison is false);
        // hold at the first keyframe.
        return Segment {
            start: &keys[0],
            end: &keys[0],
        };
    }
    if idx >= keys.len() {
        let last = &keys[keys.len() - 1];
        return Segment {
            start: last,
            end: last,
        };
    }

    Segment {
        start: &keys[idx - 1],
        end: &keys[idx],
    }
}

/// Linear blend of `v1` at `t1` and `v2` at `t2`, clamped at both ends.
///
/// A degenerate segment (`t1 == t2`) yields `v1` for every `t`, so the
/// blend never divides by zero.
pub fn interpolate<V: Lerp + Clone>(v1: &V, v2: &V, t1: f64, t2: f64, t: f64) -> V {
    if t1 == t2 {
        return v1.clone();
    }
    if t <= t1 {
        return v1.clone();
    }
    if t >= t2 {
        return v2.clone();
    }
    let s = (t - t1) / (t2 - t1);
    V::lerp(v1, v2, s)
}

/// A sparse keyframe sequence for one animated field.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Track<V> {
    keys: Vec<Keyframe<V>>,
}

impl<V> Default for Track<V> {
    fn default() -> Self {
        Self { keys: Vec::new() }
    }
}

impl<V> Track<V> {
    pub fn new(keys: Vec<Keyframe<V>>) -> Self {
        Self { keys }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn keys(&self) -> &[Keyframe<V>] {
        &self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn validate(&self) -> PrevizResult<()> {
        if self.keys.iter().any(|k| !k.time.is_finite()) {
            return Err(PrevizError::timeline("keyframe times must be finite"));
        }
        if !self.keys.windows(2).all(|w| w[0].time <= w[1].time) {
            return Err(PrevizError::timeline(
                "keyframes must be sorted by time (non-decreasing)",
            ));
        }
        Ok(())
    }

    /// Sample the track at `t`; `None` when the track has no keyframes.
    pub fn sample(&self, t: f64) -> Option<V>
    where
        V: Lerp + Clone,
    {
        if self.keys.is_empty() {
            return None;
        }
        let seg = find_segment(&self.keys, t);
        Some(interpolate(
            &seg.start.value,
            &seg.end.value,
            seg.start.time,
            seg.end.time,
            t,
        ))
    }

    /// Label in effect at `t`: the bracketing segment's start keyframe label.
    pub fn active_label(&self, t: f64) -> Option<&str> {
        if self.keys.is_empty() {
            return None;
        }
        find_segment(&self.keys, t).start.label.as_deref()
    }
}
