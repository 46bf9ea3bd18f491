use std::collections::{BTreeMap, BTreeSet};

use crate::core::Point;
use crate::ease::Ease;
use crate::track::Lerp;

/// Head orientation relative to the rig's rest pose, in radians.
///
/// Positive `pitch` dips the chin, positive `yaw` turns toward stage left.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct HeadPose {
    pub pitch: f64,
    pub yaw: f64,
}

impl HeadPose {
    pub const NEUTRAL: HeadPose = HeadPose {
        pitch: 0.0,
        yaw: 0.0,
    };

    pub fn new(pitch: f64, yaw: f64) -> Self {
        Self { pitch, yaw }
    }
}

impl Lerp for HeadPose {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        Self {
            pitch: a.pitch + (b.pitch - a.pitch) * t,
            yaw: a.yaw + (b.yaw - a.yaw) * t,
        }
    }
}

/// Declarative pose-cue vocabulary: label → head target.
///
/// Unknown labels (and absent ones) resolve to [`HeadPose::NEUTRAL`], so a
/// script may use cues this table does not carry without breaking playback.
#[derive(Clone, Debug)]
pub struct PoseCueTable {
    cues: BTreeMap<String, HeadPose>,
}

impl Default for PoseCueTable {
    fn default() -> Self {
        Self::empty()
            .with_cue("look down", HeadPose::new(0.5, 0.0))
            .with_cue("look up", HeadPose::new(-0.4, 0.0))
            .with_cue("look left", HeadPose::new(0.0, 0.6))
            .with_cue("look right", HeadPose::new(0.0, -0.6))
            .with_cue("nod", HeadPose::new(0.3, 0.0))
            .with_cue("tilt", HeadPose::new(0.15, 0.3))
    }
}

impl PoseCueTable {
    pub fn empty() -> Self {
        Self {
            cues: BTreeMap::new(),
        }
    }

    pub fn with_cue(mut self, label: impl Into<String>, pose: HeadPose) -> Self {
        self.cues.insert(label.into(), pose);
        self
    }

    pub fn resolve(&self, label: Option<&str>) -> HeadPose {
        label
            .and_then(|l| self.cues.get(l))
            .copied()
            .unwrap_or(HeadPose::NEUTRAL)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct PoseOpts {
    /// Smoothing window for a cue change, in wall-clock seconds.
    pub transition_secs: f64,
    /// Easing curve shaping the window. Progress is reported raw.
    pub ease: Ease,
}

impl Default for PoseOpts {
    fn default() -> Self {
        Self {
            transition_secs: 0.8,
            ease: Ease::InOutCubic,
        }
    }
}

/// What one tick tells the blender about one entity.
///
/// Built from sampled script tracks during playback and from authoritative
/// entity positions in the edit view; the blender does not care which.
#[derive(Clone, Debug)]
pub struct PoseObservation {
    pub identity: String,
    pub label: Option<String>,
    pub planar: Point,
}

impl PoseObservation {
    pub fn new(identity: impl Into<String>, label: Option<String>, planar: Point) -> Self {
        Self {
            identity: identity.into(),
            label,
            planar,
        }
    }
}

/// Smoothed render values for one entity at one instant.
#[derive(Clone, Debug)]
pub struct BlendedPose {
    pub identity: String,
    pub planar: Point,
    pub head: HeadPose,
    /// Raw transition progress in `[0, 1]`; `1.0` means settled on target.
    pub progress: f64,
}

impl BlendedPose {
    pub fn settled(&self) -> bool {
        self.progress >= 1.0
    }
}

/// One shared eased clock driving both blended channels of an entity.
#[derive(Clone, Debug)]
struct PoseAnimationState {
    label: Option<String>,
    start_time: f64,
    duration: f64,
    head_start: HeadPose,
    head_target: HeadPose,
    planar_start: Point,
    planar_target: Point,
}

impl PoseAnimationState {
    fn progress(&self, now: f64) -> f64 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        ((now - self.start_time) / self.duration).clamp(0.0, 1.0)
    }

    fn rendered(&self, now: f64, ease: Ease) -> (Point, HeadPose, f64) {
        let p = self.progress(now);
        let eased = ease.apply(p);
        (
            <Point as Lerp>::lerp(&self.planar_start, &self.planar_target, eased),
            HeadPose::lerp(&self.head_start, &self.head_target, eased),
            p,
        )
    }
}

/// Per-entity state machine smoothing discrete pose cues into continuous
/// motion.
///
/// A cue change restarts the blend from the currently rendered values; a
/// moving planar target with an unchanged cue is retargeted in place so the
/// eased clock keeps running. Settled states simply hold their target; there
/// is no completion event, re-evaluating every frame is idempotent.
#[derive(Debug)]
pub struct PoseBlender {
    opts: PoseOpts,
    cues: PoseCueTable,
    states: BTreeMap<String, PoseAnimationState>,
}

impl PoseBlender {
    pub fn new(opts: PoseOpts) -> Self {
        Self::with_cues(opts, PoseCueTable::default())
    }

    pub fn with_cues(opts: PoseOpts, cues: PoseCueTable) -> Self {
        Self {
            opts,
            cues,
            states: BTreeMap::new(),
        }
    }

    /// Advance every observed entity to `now` and return its render values.
    ///
    /// Identities absent from `observations` are pruned; an entity observed
    /// for the first time commits directly at its target so entering a scene
    /// never plays a startup transition.
    pub fn advance(&mut self, now: f64, observations: &[PoseObservation]) -> Vec<BlendedPose> {
        let ease = self.opts.ease;
        let mut out = Vec::with_capacity(observations.len());

        for obs in observations {
            let st = match self.states.entry(obs.identity.clone()) {
                std::collections::btree_map::Entry::Vacant(slot) => {
                    let head = self.cues.resolve(obs.label.as_deref());
                    slot.insert(PoseAnimationState {
                        label: obs.label.clone(),
                        start_time: now,
                        duration: 0.0,
                        head_start: head,
                        head_target: head,
                        planar_start: obs.planar,
                        planar_target: obs.planar,
                    })
                }
                std::collections::btree_map::Entry::Occupied(slot) => {
                    let st = slot.into_mut();
                    if st.label != obs.label {
                        // Cue change: restart from the rendered values, never
                        // from the old targets, so mid-transition changes do
                        // not snap.
                        let (planar_now, head_now, _) = st.rendered(now, ease);
                        st.label = obs.label.clone();
                        st.start_time = now;
                        st.duration = self.opts.transition_secs;
                        st.head_start = head_now;
                        st.head_target = self.cues.resolve(obs.label.as_deref());
                        st.planar_start = planar_now;
                        st.planar_target = obs.planar;
                    } else {
                        st.planar_target = obs.planar;
                    }
                    st
                }
            };

            let (planar, head, progress) = st.rendered(now, ease);
            out.push(BlendedPose {
                identity: obs.identity.clone(),
                planar,
                head,
                progress,
            });
        }

        let observed: BTreeSet<&str> = observations.iter().map(|o| o.identity.as_str()).collect();
        self.states.retain(|id, _| observed.contains(id.as_str()));

        out
    }

    /// Identities currently carrying blend state (stable order).
    pub fn tracked(&self) -> impl Iterator<Item = &str> {
        self.states.keys().map(String::as_str)
    }
}
