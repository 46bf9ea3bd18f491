use std::fmt::Write as _;

use previz::{
    CameraMove, CurveOpts, Keyframe, Point, SceneScript, ScriptBuilder, Track, complexity_curve,
    intensity_ramp,
};

fn mix64(mut z: u64) -> u64 {
    // SplitMix64 mixing function.
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

fn digest_u64(bytes: &[u8]) -> u64 {
    let mut state = 0x9E37_79B9_7F4A_7C15u64;
    for chunk in bytes.chunks(8) {
        let mut v = 0u64;
        for (i, &b) in chunk.iter().enumerate() {
            v |= (b as u64) << (i * 8);
        }
        state = mix64(state ^ v);
    }
    state
}

fn spike_keys() -> Vec<Keyframe<f64>> {
    vec![
        Keyframe::new(0.0, 0.05),
        Keyframe::new(3.0, 0.6),
        Keyframe::new(7.5, 0.35),
        Keyframe::new(12.0, 0.95),
    ]
}

#[test]
fn ramp_snapshot_is_deterministic() {
    let stops = intensity_ramp(&spike_keys(), 12.0, CurveOpts::default());
    assert_eq!(stops.len(), 200);

    let mut rendered = String::new();
    for s in &stops {
        let _ = write!(
            rendered,
            "{:.6}:{:02x}{:02x}{:02x};",
            s.offset, s.color.r, s.color.g, s.color.b
        );
    }
    let digest = digest_u64(rendered.as_bytes());

    // Updated when ramp semantics change (intentionally should be rare).
    let expected: u64 = 708_507_313_849_335_749;
    assert_eq!(digest, expected);
}

#[test]
fn complexity_curve_survives_a_script_roundtrip_bit_identically() {
    let script = dolly_script();
    let json = serde_json::to_string(&script).unwrap();
    let decoded: SceneScript = serde_json::from_str(&json).unwrap();

    let a = complexity_curve(
        &script.camera.complexity_keys(),
        script.duration_secs,
        CurveOpts::default(),
    );
    let b = complexity_curve(
        &decoded.camera.complexity_keys(),
        decoded.duration_secs,
        CurveOpts::default(),
    );
    assert_eq!(a, b);
}

fn dolly_script() -> SceneScript {
    let moves = Track::new(vec![
        Keyframe::labeled(
            0.0,
            CameraMove {
                focus: Point::new(50.0, 50.0),
                complexity: 0.12,
            },
            "static wide",
        ),
        Keyframe::new(
            4.7,
            CameraMove {
                focus: Point::new(61.0, 44.0),
                complexity: 0.58,
            },
        ),
        Keyframe::labeled(
            12.0,
            CameraMove {
                focus: Point::new(72.0, 40.0),
                complexity: 0.91,
            },
            "handheld push",
        ),
    ]);
    ScriptBuilder::new("Dolly", 12.0)
        .camera(moves)
        .build()
        .expect("valid script")
}
