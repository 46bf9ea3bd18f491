use crate::core::{Point, Timeline};
use crate::error::{PrevizError, PrevizResult};
use crate::track::{Keyframe, Lerp, Track};

/// One camera keyframe value: the stage point the camera is trained on and how
/// busy the movement is (0 = locked off, 1 = frantic).
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub struct CameraMove {
    pub focus: Point,
    pub complexity: f64,
}

impl Lerp for CameraMove {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        Self {
            focus: <Point as Lerp>::lerp(&a.focus, &b.focus, t),
            complexity: a.complexity + (b.complexity - a.complexity) * t,
        }
    }
}

#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct CameraTimeline {
    pub moves: Track<CameraMove>,
}

impl CameraTimeline {
    pub fn validate(&self) -> PrevizResult<()> {
        self.moves.validate()
    }

    /// Project the scalar complexity sequence for timeline graphs, keeping
    /// times and movement labels.
    pub fn complexity_keys(&self) -> Vec<Keyframe<f64>> {
        self.moves
            .keys()
            .iter()
            .map(|k| Keyframe {
                time: k.time,
                value: k.value.complexity,
                label: k.label.clone(),
            })
            .collect()
    }
}

/// Sparse authored tracks for one character.
///
/// Position keyframes may carry pose-cue labels ("look down", "nod"); emotion
/// keyframes carry the emotion name and a 0–1 intensity.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct CharacterTimeline {
    pub name: String,
    #[serde(default)]
    pub positions: Track<Point>,
    #[serde(default)]
    pub emotions: Track<f64>,
}

impl CharacterTimeline {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            positions: Track::empty(),
            emotions: Track::empty(),
        }
    }

    pub fn validate(&self) -> PrevizResult<()> {
        if self.name.trim().is_empty() {
            return Err(PrevizError::validation("character name must be non-empty"));
        }
        self.positions.validate()?;
        self.emotions.validate()?;
        Ok(())
    }
}

/// The human-authored scene document: everything the playback views derive
/// from. Keyframe sequences are immutable once loaded.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct SceneScript {
    #[serde(default)]
    pub title: String,
    pub duration_secs: f64,
    #[serde(default)]
    pub characters: Vec<CharacterTimeline>,
    #[serde(default)]
    pub camera: CameraTimeline,
    #[serde(default)]
    pub environment: String,
    #[serde(default)]
    pub mood: String,
}

impl SceneScript {
    pub fn validate(&self) -> PrevizResult<()> {
        let timeline = self.timeline()?;

        for (i, ch) in self.characters.iter().enumerate() {
            ch.validate()?;
            if self.characters[..i].iter().any(|o| o.name == ch.name) {
                return Err(PrevizError::validation(format!(
                    "duplicate character name '{}'",
                    ch.name
                )));
            }
            check_key_times_in_range(ch.positions.keys(), timeline, &ch.name)?;
            check_key_times_in_range(ch.emotions.keys(), timeline, &ch.name)?;
        }

        self.camera.validate()?;
        check_key_times_in_range(self.camera.moves.keys(), timeline, "camera")?;
        Ok(())
    }

    pub fn timeline(&self) -> PrevizResult<Timeline> {
        Timeline::new(self.duration_secs)
    }

    pub fn character(&self, name: &str) -> Option<&CharacterTimeline> {
        self.characters.iter().find(|c| c.name == name)
    }
}

fn check_key_times_in_range<V>(
    keys: &[Keyframe<V>],
    timeline: Timeline,
    owner: &str,
) -> PrevizResult<()> {
    for k in keys {
        if k.time < 0.0 || k.time > timeline.duration_secs() {
            return Err(PrevizError::validation(format!(
                "'{owner}' keyframe at {}s is outside the scene duration",
                k.time
            )));
        }
    }
    Ok(())
}

pub struct ScriptBuilder {
    title: String,
    duration_secs: f64,
    characters: Vec<CharacterTimeline>,
    camera: CameraTimeline,
    environment: String,
    mood: String,
}

impl ScriptBuilder {
    pub fn new(title: impl Into<String>, duration_secs: f64) -> Self {
        Self {
            title: title.into(),
            duration_secs,
            characters: Vec::new(),
            camera: CameraTimeline::default(),
            environment: String::new(),
            mood: String::new(),
        }
    }

    pub fn character(mut self, character: CharacterTimeline) -> PrevizResult<Self> {
        if self.characters.iter().any(|c| c.name == character.name) {
            return Err(PrevizError::validation(format!(
                "duplicate character name '{}'",
                character.name
            )));
        }
        self.characters.push(character);
        Ok(self)
    }

    pub fn camera(mut self, moves: Track<CameraMove>) -> Self {
        self.camera = CameraTimeline { moves };
        self
    }

    pub fn environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = environment.into();
        self
    }

    pub fn mood(mut self, mood: impl Into<String>) -> Self {
        self.mood = mood.into();
        self
    }

    pub fn build(self) -> PrevizResult<SceneScript> {
        let script = SceneScript {
            title: self.title,
            duration_secs: self.duration_secs,
            characters: self.characters,
            camera: self.camera,
            environment: self.environment,
            mood: self.mood,
        };
        script.validate()?;
        Ok(script)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basic_script() -> SceneScript {
        let mut ada = CharacterTimeline::new("Ada");
        ada.positions = Track::new(vec![
            Keyframe::labeled(0.0, Point::new(20.0, 30.0), "idle"),
            Keyframe::labeled(6.0, Point::new(60.0, 40.0), "look down"),
        ]);
        ada.emotions = Track::new(vec![
            Keyframe::labeled(0.0, 0.2, "calm"),
            Keyframe::labeled(6.0, 0.9, "tense"),
        ]);

        let camera = Track::new(vec![
            Keyframe::labeled(
                0.0,
                CameraMove {
                    focus: Point::new(50.0, 50.0),
                    complexity: 0.1,
                },
                "static wide",
            ),
            Keyframe::labeled(
                8.0,
                CameraMove {
                    focus: Point::new(60.0, 40.0),
                    complexity: 0.7,
                },
                "slow dolly",
            ),
        ]);

        ScriptBuilder::new("Interrogation", 12.0)
            .character(ada)
            .unwrap()
            .camera(camera)
            .environment("dim interview room")
            .mood("claustrophobic")
            .build()
            .unwrap()
    }

    #[test]
    fn json_roundtrip() {
        let script = basic_script();
        let s = serde_json::to_string_pretty(&script).unwrap();
        let de: SceneScript = serde_json::from_str(&s).unwrap();
        assert_eq!(de.title, "Interrogation");
        assert_eq!(de.characters.len(), 1);
        assert_eq!(de.characters[0].positions.len(), 2);
        de.validate().unwrap();
    }

    #[test]
    fn validate_rejects_duplicate_character_names() {
        let script = SceneScript {
            title: String::new(),
            duration_secs: 10.0,
            characters: vec![CharacterTimeline::new("Ada"), CharacterTimeline::new("Ada")],
            camera: CameraTimeline::default(),
            environment: String::new(),
            mood: String::new(),
        };
        assert!(script.validate().is_err());
    }

    #[test]
    fn validate_rejects_out_of_range_keyframes() {
        let mut script = basic_script();
        script.characters[0].positions = Track::new(vec![Keyframe::new(99.0, Point::ZERO)]);
        assert!(script.validate().is_err());
    }

    #[test]
    fn validate_rejects_non_positive_duration() {
        let mut script = basic_script();
        script.duration_secs = 0.0;
        assert!(script.validate().is_err());
    }

    #[test]
    fn builder_rejects_duplicate_character() {
        let b = ScriptBuilder::new("x", 5.0)
            .character(CharacterTimeline::new("Ada"))
            .unwrap();
        assert!(b.character(CharacterTimeline::new("Ada")).is_err());
    }

    #[test]
    fn complexity_keys_keeps_times_and_labels() {
        let script = basic_script();
        let keys = script.camera.complexity_keys();
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[0].time, 0.0);
        assert_eq!(keys[0].value, 0.1);
        assert_eq!(keys[1].label.as_deref(), Some("slow dolly"));
    }

    #[test]
    fn camera_move_lerp_blends_focus_and_complexity() {
        let a = CameraMove {
            focus: Point::new(0.0, 0.0),
            complexity: 0.0,
        };
        let b = CameraMove {
            focus: Point::new(10.0, 20.0),
            complexity: 1.0,
        };
        let mid = <CameraMove as Lerp>::lerp(&a, &b, 0.5);
        assert_eq!(mid.focus, Point::new(5.0, 10.0));
        assert_eq!(mid.complexity, 0.5);
    }
}
