use crate::error::{PrevizError, PrevizResult};

pub use kurbo::{Point, Vec2};

/// Stage-plane coordinates are percentages: both axes span `0.0..=100.0`.
pub const STAGE_SIZE: f64 = 100.0;

/// Default placement for entities whose track has no keyframes.
pub const STAGE_CENTER: Point = Point::new(50.0, 50.0);

/// 3D world position on the analysis scale (each axis 0–100).
///
/// kurbo only models the plane, so the depth-carrying variant lives here.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Lift a 2D stage point into world space with zero depth.
    pub fn on_stage(p: Point) -> Self {
        Self {
            x: p.x,
            y: p.y,
            z: 0.0,
        }
    }

    /// Project back onto the stage plane (drops depth).
    pub fn to_stage(self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Straight (non-premultiplied) RGB color, 8 bits per channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb8 {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Playback timeline extent in seconds.
///
/// The playback element reports `currentTime` at whatever rate it likes; every
/// consumption of that value goes through [`Timeline::clamp`] so the engine
/// only ever samples inside `[0, duration]`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Timeline {
    duration_secs: f64,
}

impl Timeline {
    pub fn new(duration_secs: f64) -> PrevizResult<Self> {
        if !duration_secs.is_finite() || duration_secs <= 0.0 {
            return Err(PrevizError::validation(
                "Timeline duration_secs must be finite and > 0",
            ));
        }
        Ok(Self { duration_secs })
    }

    pub fn duration_secs(self) -> f64 {
        self.duration_secs
    }

    /// Clamp an externally reported time into `[0, duration]`.
    ///
    /// Non-finite input maps to 0 rather than poisoning downstream sampling.
    pub fn clamp(self, t: f64) -> f64 {
        if !t.is_finite() {
            return 0.0;
        }
        t.clamp(0.0, self.duration_secs)
    }
}
