use std::fmt::Write as _;

use crate::core::Vec3;
use crate::error::{PrevizError, PrevizResult};

/// Which lifecycle a [`SceneState`] belongs to.
///
/// Derived states are rebuilt from the script every tick and discarded;
/// authoritative states are loaded wholesale from an analysis snapshot and
/// edited in place. The two never merge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SceneOrigin {
    Derived,
    Authoritative,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Actor {
    pub identity: String,
    pub name: String,
    pub position: Vec3,
    pub emotion: String,
    pub intensity: f64,
    /// Active pose cue from the position track (drives pose blending).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pose_cue: Option<String>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct CameraRig {
    pub identity: String,
    pub name: String,
    pub position: Vec3,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub look_at: Option<Vec3>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub movement: Option<String>,
    pub complexity: f64,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Light {
    pub identity: String,
    pub name: String,
    pub position: Vec3,
    pub intensity: f64,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Prop {
    pub identity: String,
    pub name: String,
    pub position: Vec3,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub enum Entity {
    Actor(Actor),
    Camera(CameraRig),
    Light(Light),
    Prop(Prop),
}

impl Entity {
    pub fn identity(&self) -> &str {
        match self {
            Self::Actor(a) => &a.identity,
            Self::Camera(c) => &c.identity,
            Self::Light(l) => &l.identity,
            Self::Prop(p) => &p.identity,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Actor(a) => &a.name,
            Self::Camera(c) => &c.name,
            Self::Light(l) => &l.name,
            Self::Prop(p) => &p.name,
        }
    }

    pub fn position(&self) -> Vec3 {
        match self {
            Self::Actor(a) => a.position,
            Self::Camera(c) => c.position,
            Self::Light(l) => l.position,
            Self::Prop(p) => p.position,
        }
    }

    /// Overwrite the position, leaving every other field untouched.
    pub fn set_position(&mut self, position: Vec3) {
        match self {
            Self::Actor(a) => a.position = position,
            Self::Camera(c) => c.position = position,
            Self::Light(l) => l.position = position,
            Self::Prop(p) => p.position = position,
        }
    }
}

/// The current spatial/attribute state of the scene: an ordered entity list
/// plus scene-level attributes.
///
/// Serializes as the preset document format, so a saved preset is just
/// [`SceneState::to_json`] output written somewhere by the shell.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct SceneState {
    pub origin: SceneOrigin,
    pub entities: Vec<Entity>,
    #[serde(default)]
    pub environment: String,
    #[serde(default)]
    pub mood: String,
}

impl SceneState {
    /// First entity with the given identity, if any (first-match semantics).
    pub fn find(&self, identity: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.identity() == identity)
    }

    pub fn find_mut(&mut self, identity: &str) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.identity() == identity)
    }

    pub fn actors(&self) -> impl Iterator<Item = &Actor> {
        self.entities.iter().filter_map(|e| match e {
            Entity::Actor(a) => Some(a),
            _ => None,
        })
    }

    pub fn camera(&self) -> Option<&CameraRig> {
        self.entities.iter().find_map(|e| match e {
            Entity::Camera(c) => Some(c),
            _ => None,
        })
    }

    /// Authoritative states must not contain duplicate identities; edits use
    /// first-match lookup, so a duplicate would shadow its twin.
    pub fn validate(&self) -> PrevizResult<()> {
        for (i, e) in self.entities.iter().enumerate() {
            if self.entities[..i]
                .iter()
                .any(|o| o.identity() == e.identity())
            {
                return Err(PrevizError::validation(format!(
                    "duplicate entity identity '{}'",
                    e.identity()
                )));
            }
        }
        Ok(())
    }

    /// Compact human-readable digest of the scene, used as the body of a
    /// feedback request.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        let env = if self.environment.is_empty() {
            "unspecified environment"
        } else {
            &self.environment
        };
        let _ = write!(out, "Scene: {env}");
        if !self.mood.is_empty() {
            let _ = write!(out, " (mood: {})", self.mood);
        }
        out.push('.');

        for e in &self.entities {
            let p = e.position();
            let _ = write!(out, " {} at ({:.0}, {:.0}, {:.0})", e.name(), p.x, p.y, p.z);
            match e {
                Entity::Actor(a) => {
                    let _ = write!(out, ", {} ({:.2})", a.emotion, a.intensity);
                }
                Entity::Camera(c) => {
                    if let Some(m) = &c.movement {
                        let _ = write!(out, ", {m}");
                    }
                }
                Entity::Light(l) => {
                    let _ = write!(out, ", intensity {:.2}", l.intensity);
                }
                Entity::Prop(_) => {}
            }
            out.push('.');
        }
        out
    }

    /// Serialize to the preset blob format.
    pub fn to_json(&self) -> PrevizResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| PrevizError::snapshot(format!("failed to encode scene state: {e}")))
    }

    /// Decode a preset blob previously produced by [`SceneState::to_json`].
    pub fn from_json(s: &str) -> PrevizResult<Self> {
        let state: Self = serde_json::from_str(s)
            .map_err(|e| PrevizError::snapshot(format!("failed to decode scene state: {e}")))?;
        state.validate()?;
        Ok(state)
    }
}

/// Analysis-service response document (camelCase wire contract).
///
/// Every positional field is a 0–100-scaled 3D coordinate. Optional fields
/// default rather than fail: the analysis service omits what it cannot see.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneSnapshot {
    #[serde(default)]
    pub actors: Vec<ActorSnapshot>,
    #[serde(default)]
    pub camera: Option<CameraSnapshot>,
    #[serde(default)]
    pub lights: Vec<LightSnapshot>,
    #[serde(default)]
    pub props: Vec<PropSnapshot>,
    #[serde(default)]
    pub environment_description: String,
    #[serde(default)]
    pub overall_mood: String,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorSnapshot {
    #[serde(default)]
    pub name: Option<String>,
    pub position: Vec3,
    #[serde(default)]
    pub emotion: Option<String>,
    #[serde(default)]
    pub intensity: Option<f64>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraSnapshot {
    pub position: Vec3,
    #[serde(default)]
    pub look_at: Option<Vec3>,
    #[serde(default)]
    pub movement: Option<String>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LightSnapshot {
    #[serde(default)]
    pub label: Option<String>,
    pub position: Vec3,
    #[serde(default = "default_light_intensity")]
    pub intensity: f64,
}

fn default_light_intensity() -> f64 {
    1.0
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropSnapshot {
    #[serde(default)]
    pub label: Option<String>,
    pub position: Vec3,
}

impl SceneSnapshot {
    /// Build the authoritative scene state.
    ///
    /// Identities are assigned here, sequentially per entity kind, and stay
    /// stable for the lifetime of this state: `actor-0…`, `camera`,
    /// `light-0…`, `prop-0…`. Display names fall back to numbered defaults
    /// when the analysis omitted them.
    pub fn into_scene_state(self) -> SceneState {
        let mut entities = Vec::new();

        for (i, a) in self.actors.into_iter().enumerate() {
            entities.push(Entity::Actor(Actor {
                identity: format!("actor-{i}"),
                name: a.name.unwrap_or_else(|| format!("Actor {}", i + 1)),
                position: a.position,
                emotion: a.emotion.unwrap_or_else(|| "neutral".to_string()),
                intensity: a.intensity.unwrap_or(0.5),
                pose_cue: None,
            }));
        }

        if let Some(c) = self.camera {
            entities.push(Entity::Camera(CameraRig {
                identity: "camera".to_string(),
                name: "Camera".to_string(),
                position: c.position,
                look_at: c.look_at,
                movement: c.movement,
                complexity: 0.0,
            }));
        }

        for (i, l) in self.lights.into_iter().enumerate() {
            entities.push(Entity::Light(Light {
                identity: format!("light-{i}"),
                name: l.label.unwrap_or_else(|| format!("Light {}", i + 1)),
                position: l.position,
                intensity: l.intensity,
            }));
        }

        for (i, p) in self.props.into_iter().enumerate() {
            entities.push(Entity::Prop(Prop {
                identity: format!("prop-{i}"),
                name: p.label.unwrap_or_else(|| format!("Prop {}", i + 1)),
                position: p.position,
            }));
        }

        SceneState {
            origin: SceneOrigin::Authoritative,
            entities,
            environment: self.environment_description,
            mood: self.overall_mood,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn basic_snapshot() -> SceneSnapshot {
        serde_json::from_value(json!({
            "actors": [
                {"name": "Ada", "position": {"x": 30.0, "y": 40.0, "z": 0.0},
                 "emotion": "tense", "intensity": 0.8},
                {"position": {"x": 70.0, "y": 55.0, "z": 0.0}}
            ],
            "camera": {"position": {"x": 50.0, "y": 90.0, "z": 20.0},
                       "lookAt": {"x": 50.0, "y": 45.0, "z": 0.0},
                       "movement": "slow push-in"},
            "lights": [
                {"label": "Key light", "position": {"x": 20.0, "y": 20.0, "z": 80.0},
                 "intensity": 0.7},
                {"position": {"x": 80.0, "y": 20.0, "z": 80.0}}
            ],
            "props": [{"label": "Steel table", "position": {"x": 50.0, "y": 48.0, "z": 0.0}}],
            "environmentDescription": "dim interview room",
            "overallMood": "claustrophobic"
        }))
        .unwrap()
    }

    #[test]
    fn snapshot_decodes_camel_case_wire_names() {
        let snap = basic_snapshot();
        assert_eq!(snap.environment_description, "dim interview room");
        assert_eq!(snap.camera.as_ref().unwrap().look_at.unwrap().y, 45.0);
        // Omitted light intensity defaults to full.
        assert_eq!(snap.lights[1].intensity, 1.0);
    }

    #[test]
    fn into_scene_state_assigns_stable_identities_and_fallback_names() {
        let state = basic_snapshot().into_scene_state();
        state.validate().unwrap();
        assert_eq!(state.origin, SceneOrigin::Authoritative);

        let ids: Vec<&str> = state.entities.iter().map(|e| e.identity()).collect();
        assert_eq!(
            ids,
            vec!["actor-0", "actor-1", "camera", "light-0", "light-1", "prop-0"]
        );
        assert_eq!(state.find("actor-1").unwrap().name(), "Actor 2");
        assert_eq!(state.find("light-1").unwrap().name(), "Light 2");
        assert_eq!(state.find("actor-0").unwrap().name(), "Ada");
        // Provided labels become display names; `label` is the wire key for
        // lights and props, not `name`.
        assert_eq!(state.find("light-0").unwrap().name(), "Key light");
        assert_eq!(state.find("prop-0").unwrap().name(), "Steel table");
    }

    #[test]
    fn find_uses_first_match() {
        let mut state = basic_snapshot().into_scene_state();
        // Force a duplicate; validate flags it, find still returns the first.
        let mut dup = state.entities[0].clone();
        dup.set_position(Vec3::new(1.0, 2.0, 3.0));
        state.entities.push(dup);
        assert!(state.validate().is_err());
        assert_eq!(state.find("actor-0").unwrap().position().x, 30.0);
    }

    #[test]
    fn set_position_leaves_other_fields_untouched() {
        let mut state = basic_snapshot().into_scene_state();
        let before = match state.find("actor-0").unwrap() {
            Entity::Actor(a) => (a.emotion.clone(), a.intensity),
            _ => unreachable!(),
        };
        state
            .find_mut("actor-0")
            .unwrap()
            .set_position(Vec3::new(10.0, 0.0, 10.0));
        match state.find("actor-0").unwrap() {
            Entity::Actor(a) => {
                assert_eq!(a.position, Vec3::new(10.0, 0.0, 10.0));
                assert_eq!((a.emotion.clone(), a.intensity), before);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn summary_names_every_entity() {
        let state = basic_snapshot().into_scene_state();
        let s = state.summary();
        assert!(s.contains("dim interview room"));
        assert!(s.contains("claustrophobic"));
        for e in &state.entities {
            assert!(s.contains(e.name()), "summary missing {}", e.name());
        }
    }

    #[test]
    fn preset_roundtrip_preserves_entities() {
        let state = basic_snapshot().into_scene_state();
        let blob = state.to_json().unwrap();
        let back = SceneState::from_json(&blob).unwrap();
        assert_eq!(back.entities.len(), state.entities.len());
        assert_eq!(back.find("prop-0").unwrap().name(), "Steel table");
    }

    #[test]
    fn from_json_rejects_duplicate_identities() {
        let mut state = basic_snapshot().into_scene_state();
        let dup = state.entities[0].clone();
        state.entities.push(dup);
        let blob = serde_json::to_string(&state).unwrap();
        assert!(SceneState::from_json(&blob).is_err());
    }
}
