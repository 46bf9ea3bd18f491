use crate::core::{STAGE_CENTER, Vec3};
use crate::error::PrevizResult;
use crate::model::{Actor, CameraRig, Entity, SceneOrigin, SceneSnapshot, SceneState};
use crate::script::SceneScript;

/// Owns the authoritative scene state and derives transient ones.
///
/// Derivation is a pure function of script and time, recomputed every tick;
/// nothing derived is retained here. The authoritative state, once loaded
/// from an analysis snapshot, lives in the store and is the only state edits
/// apply to.
#[derive(Debug, Default)]
pub struct SceneGraphStore {
    authoritative: Option<SceneState>,
}

impl SceneGraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive the scene state at time `t` from the script.
    ///
    /// Characters with no position keys stand at stage center. Emotion falls
    /// back to a zero-intensity neutral, the camera to a static centered move
    /// with zero complexity. Entity identities are the character names plus
    /// `camera`, so they are stable across ticks.
    #[tracing::instrument(skip(script))]
    pub fn derive(script: &SceneScript, t: f64) -> SceneState {
        let mut entities = Vec::with_capacity(script.characters.len() + 1);

        for ch in &script.characters {
            let planar = ch.positions.sample(t).unwrap_or(STAGE_CENTER);
            entities.push(Entity::Actor(Actor {
                identity: ch.name.clone(),
                name: ch.name.clone(),
                position: Vec3::on_stage(planar),
                emotion: ch
                    .emotions
                    .active_label(t)
                    .unwrap_or("neutral")
                    .to_string(),
                intensity: ch.emotions.sample(t).unwrap_or(0.0),
                pose_cue: ch.positions.active_label(t).map(str::to_string),
            }));
        }

        let (focus, complexity, movement) = match script.camera.moves.sample(t) {
            Some(mv) => (
                mv.focus,
                mv.complexity,
                script.camera.moves.active_label(t).map(str::to_string),
            ),
            None => (STAGE_CENTER, 0.0, None),
        };
        entities.push(Entity::Camera(CameraRig {
            identity: "camera".to_string(),
            name: "Camera".to_string(),
            position: Vec3::on_stage(focus),
            look_at: None,
            movement,
            complexity,
        }));

        SceneState {
            origin: SceneOrigin::Derived,
            entities,
            environment: script.environment.clone(),
            mood: script.mood.clone(),
        }
    }

    /// Replace the stored state with one built from an analysis snapshot.
    ///
    /// The snapshot assigns fresh identities, so any references into the
    /// previous authoritative state are invalidated wholesale.
    pub fn load_authoritative(&mut self, snapshot: SceneSnapshot) -> PrevizResult<&SceneState> {
        let state = snapshot.into_scene_state();
        state.validate()?;
        Ok(self.authoritative.insert(state))
    }

    /// Move one entity of the authoritative state, first match by identity.
    ///
    /// Only the position changes. An unknown identity, or an edit before any
    /// snapshot was loaded, is a logged no-op returning `None`: stale edits
    /// from the shell must never poison the store.
    pub fn apply_edit(&mut self, identity: &str, position: Vec3) -> Option<&SceneState> {
        let Some(state) = self.authoritative.as_mut() else {
            tracing::warn!("edit to '{identity}' before any authoritative state was loaded");
            return None;
        };
        match state.find_mut(identity) {
            Some(entity) => {
                entity.set_position(position);
                Some(&*state)
            }
            None => {
                tracing::warn!("edit to unknown entity identity '{identity}', ignoring");
                None
            }
        }
    }

    pub fn authoritative(&self) -> Option<&SceneState> {
        self.authoritative.as_ref()
    }

    /// Drop the authoritative state, returning to derived-only operation.
    pub fn clear_authoritative(&mut self) {
        self.authoritative = None;
    }
}
