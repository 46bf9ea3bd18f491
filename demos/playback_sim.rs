use previz::{RecordingFeedback, SceneScript, SceneSession, SessionOpts};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let s = include_str!("../tests/data/interrogation_scene.json");
    let script: SceneScript = serde_json::from_str(s)?;
    let mut session = SceneSession::new(script, SessionOpts::default())?;
    let mut client = RecordingFeedback::default();

    // Play through, then park the playhead and let the head transitions land.
    let ticks = [
        (0.0, 0.0),
        (3.0, 0.3),
        (6.0, 0.6),
        (9.0, 0.9),
        (9.0, 1.4),
        (9.0, 1.8),
        (14.0, 2.0),
    ];
    for (media, wall) in ticks {
        let frame = session.tick(media, wall, &mut client);
        let camera = frame.scene.camera().expect("derived scenes carry a camera");
        println!(
            "t={:>4.1}s  camera '{}' (complexity {:.2})",
            frame.time,
            camera.movement.as_deref().unwrap_or("unset"),
            camera.complexity,
        );
        for pose in &frame.poses {
            println!(
                "    {:<6} at ({:5.1}, {:5.1})  pitch {:+.2} yaw {:+.2}  blend {:3.0}%",
                pose.identity,
                pose.planar.x,
                pose.planar.y,
                pose.head.pitch,
                pose.head.yaw,
                pose.progress * 100.0,
            );
        }
    }

    // The graphs the timeline strip draws from the same script.
    let ramp = session.emotion_ramp("Ada").expect("Ada is scripted");
    println!("\nAda emotion ramp ({} stops):", ramp.len());
    for stop in ramp.iter().step_by(50).chain(ramp.last()) {
        let c = stop.color;
        println!("  {:.3} -> #{:02x}{:02x}{:02x}", stop.offset, c.r, c.g, c.b);
    }

    let curve = session.camera_complexity_curve();
    let peak = curve.iter().map(|p| p.value).fold(f64::MIN, f64::max);
    println!("camera complexity curve: {} samples, peak {:.3}", curve.len(), peak);

    Ok(())
}
