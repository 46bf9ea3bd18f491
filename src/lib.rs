//! Previz is a film-scene previsualization engine.
//!
//! It turns an authored [`SceneScript`] (sparse keyframe tracks per character
//! and camera) into per-frame scene state, smooths discrete pose cues into
//! continuous motion, densifies sparse tracks into timeline graphs, and
//! coalesces interactive layout edits into bounded feedback requests.
//!
//! The public API is session-oriented:
//!
//! - Author or decode a [`SceneScript`]
//! - Create a [`SceneSession`]
//! - Drive [`SceneSession::tick`] from the shell's render loop; load analysis
//!   snapshots and apply entity edits as the user works
#![forbid(unsafe_code)]

pub mod core;
pub mod curve;
pub mod ease;
pub mod error;
pub mod feedback;
pub mod model;
pub mod pose;
pub mod script;
pub mod session;
pub mod store;
pub mod track;

pub use crate::core::{Point, Rgb8, STAGE_CENTER, STAGE_SIZE, Timeline, Vec2, Vec3};
pub use crate::curve::{
    CurveOpts, CurvePoint, RampStop, complexity_curve, intensity_color, intensity_ramp,
};
pub use crate::ease::Ease;
pub use crate::error::{PrevizError, PrevizResult};
pub use crate::feedback::{
    EditFeedbackCoordinator, FALLBACK_MESSAGE, FeedbackClient, FeedbackNote, FeedbackOpts,
    FeedbackReply, FeedbackRequest, RecordingFeedback,
};
pub use crate::model::{
    Actor, ActorSnapshot, CameraRig, CameraSnapshot, Entity, Light, LightSnapshot, Prop,
    PropSnapshot, SceneOrigin, SceneSnapshot, SceneState,
};
pub use crate::pose::{
    BlendedPose, HeadPose, PoseBlender, PoseCueTable, PoseObservation, PoseOpts,
};
pub use crate::script::{CameraMove, CameraTimeline, CharacterTimeline, SceneScript, ScriptBuilder};
pub use crate::session::{SceneSession, SessionOpts, TickFrame};
pub use crate::store::SceneGraphStore;
pub use crate::track::{Keyframe, Lerp, Segment, Track, find_segment, interpolate};
