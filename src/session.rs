use crate::core::{Timeline, Vec3};
use crate::curve::{self, CurveOpts, CurvePoint, RampStop};
use crate::error::PrevizResult;
use crate::feedback::{
    EditFeedbackCoordinator, FeedbackClient, FeedbackNote, FeedbackOpts, FeedbackReply,
};
use crate::model::{SceneSnapshot, SceneState};
use crate::pose::{BlendedPose, PoseBlender, PoseCueTable, PoseObservation, PoseOpts};
use crate::script::SceneScript;
use crate::store::SceneGraphStore;

#[derive(Clone, Copy, Debug, Default)]
pub struct SessionOpts {
    pub pose: PoseOpts,
    pub feedback: FeedbackOpts,
    pub curve: CurveOpts,
}

/// Everything one tick produces for the views.
///
/// Returned by value: the scene is derived fresh each tick and discarded by
/// the caller, never retained by the engine.
#[derive(Clone, Debug)]
pub struct TickFrame {
    /// Clamped playback time the frame was derived at.
    pub time: f64,
    pub scene: SceneState,
    pub poses: Vec<BlendedPose>,
}

/// One loaded scene: script, store, blender and feedback coordinator wired
/// to a single cooperative tick.
///
/// The shell owns the clocks. `media_time` is whatever the playback element
/// last reported (clamped here); `wall_time` drives pose smoothing and the
/// feedback debounce. Drop the session to unload the scene; nothing global
/// survives it.
#[derive(Debug)]
pub struct SceneSession {
    script: SceneScript,
    timeline: Timeline,
    store: SceneGraphStore,
    blender: PoseBlender,
    feedback: EditFeedbackCoordinator,
    curve_opts: CurveOpts,
}

impl SceneSession {
    pub fn new(script: SceneScript, opts: SessionOpts) -> PrevizResult<Self> {
        Self::with_cues(script, opts, PoseCueTable::default())
    }

    /// Like [`SceneSession::new`] with a custom pose-cue vocabulary.
    pub fn with_cues(
        script: SceneScript,
        opts: SessionOpts,
        cues: PoseCueTable,
    ) -> PrevizResult<Self> {
        script.validate()?;
        let timeline = script.timeline()?;
        Ok(Self {
            script,
            timeline,
            store: SceneGraphStore::new(),
            blender: PoseBlender::with_cues(opts.pose, cues),
            feedback: EditFeedbackCoordinator::new(opts.feedback),
            curve_opts: opts.curve,
        })
    }

    pub fn script(&self) -> &SceneScript {
        &self.script
    }

    pub fn timeline(&self) -> Timeline {
        self.timeline
    }

    /// Drive one frame: derive the scene at the (clamped) playback time,
    /// blend poses at wall-clock time, poll the feedback debounce.
    ///
    /// Pose observations join the derived actors with the authoritative ones;
    /// the two identity spaces are disjoint, so both views animate from the
    /// same blender without colliding.
    pub fn tick(
        &mut self,
        media_time: f64,
        wall_time: f64,
        client: &mut dyn FeedbackClient,
    ) -> TickFrame {
        let time = self.timeline.clamp(media_time);
        let scene = SceneGraphStore::derive(&self.script, time);

        let mut observations: Vec<PoseObservation> = scene
            .actors()
            .map(|a| {
                PoseObservation::new(a.identity.clone(), a.pose_cue.clone(), a.position.to_stage())
            })
            .collect();
        if let Some(auth) = self.store.authoritative() {
            observations.extend(auth.actors().map(|a| {
                PoseObservation::new(a.identity.clone(), a.pose_cue.clone(), a.position.to_stage())
            }));
        }

        let poses = self.blender.advance(wall_time, &observations);
        self.feedback.tick(wall_time, client);

        TickFrame { time, scene, poses }
    }

    /// Install the authoritative layout produced by an analysis call.
    pub fn load_analysis(&mut self, snapshot: SceneSnapshot) -> PrevizResult<&SceneState> {
        self.store.load_authoritative(snapshot)
    }

    /// Drop the authoritative layout (scene change).
    pub fn clear_analysis(&mut self) {
        self.store.clear_authoritative();
    }

    /// The authoritative layout the edit view reads, if one is loaded.
    pub fn layout(&self) -> Option<&SceneState> {
        self.store.authoritative()
    }

    /// Move one authoritative entity and record the edit burst.
    ///
    /// Returns whether the edit landed; a rejected edit (unknown identity, no
    /// layout loaded) records nothing, so it can never trigger feedback.
    pub fn apply_edit(&mut self, identity: &str, position: Vec3, wall_time: f64) -> bool {
        match self.store.apply_edit(identity, position) {
            Some(state) => {
                self.feedback.record_edit(state, identity, wall_time);
                true
            }
            None => false,
        }
    }

    /// Deliver a feedback outcome; stale generations are discarded.
    pub fn complete_feedback(
        &mut self,
        generation: u64,
        outcome: Result<FeedbackReply, crate::error::PrevizError>,
    ) -> bool {
        self.feedback.complete(generation, outcome)
    }

    pub fn in_flight(&self) -> bool {
        self.feedback.in_flight()
    }

    pub fn feedback_note(&self) -> Option<&FeedbackNote> {
        self.feedback.note()
    }

    pub fn take_feedback_note(&mut self) -> Option<FeedbackNote> {
        self.feedback.take_note()
    }

    /// Dense camera-complexity curve for the timeline strip.
    pub fn camera_complexity_curve(&self) -> Vec<CurvePoint> {
        let keys = self.script.camera.complexity_keys();
        curve::complexity_curve(&keys, self.timeline.duration_secs(), self.curve_opts)
    }

    /// Dense emotion-intensity ramp for one character's timeline strip.
    pub fn emotion_ramp(&self, character: &str) -> Option<Vec<RampStop>> {
        let ch = self.script.character(character)?;
        Some(curve::intensity_ramp(
            ch.emotions.keys(),
            self.timeline.duration_secs(),
            self.curve_opts,
        ))
    }
}
