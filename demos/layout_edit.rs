use previz::{
    CharacterTimeline, FeedbackReply, Keyframe, Point, RecordingFeedback, SceneSession,
    SceneSnapshot, ScriptBuilder, SessionOpts, Track, Vec3,
};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let mut ada = CharacterTimeline::new("Ada");
    ada.positions = Track::new(vec![Keyframe::labeled(
        0.0,
        Point::new(35.0, 50.0),
        "look right",
    )]);
    let script = ScriptBuilder::new("Blocking pass", 8.0)
        .character(ada)?
        .environment("sound stage 4")
        .mood("methodical")
        .build()?;

    let mut session = SceneSession::new(script, SessionOpts::default())?;
    let mut client = RecordingFeedback::default();

    let snapshot: SceneSnapshot = serde_json::from_value(serde_json::json!({
        "actors": [
            {"name": "Ada", "position": {"x": 35.0, "y": 50.0, "z": 0.0}},
            {"name": "Stand-in", "position": {"x": 62.0, "y": 44.0, "z": 0.0}}
        ],
        "camera": {"position": {"x": 50.0, "y": 90.0, "z": 20.0}, "movement": "locked off"},
        "lights": [{"label": "Key", "position": {"x": 20.0, "y": 20.0, "z": 85.0}}],
        "environmentDescription": "sound stage 4",
        "overallMood": "methodical"
    }))?;
    println!("analysis: {}", session.load_analysis(snapshot)?.summary());

    // Drag Ada downstage in three quick events. Only the last one should
    // reach the feedback collaborator, half a second after the burst stops.
    for (y, wall) in [(48.0, 0.05), (42.0, 0.21), (38.0, 0.38)] {
        session.apply_edit("actor-0", Vec3::new(35.0, y, 0.0), wall);
    }
    session.tick(0.0, 0.5, &mut client);
    println!("at 0.5s: {} request(s) dispatched", client.requests.len());
    session.tick(0.0, 0.9, &mut client);
    println!("at 0.9s: {} request(s) dispatched", client.requests.len());

    let request = client.requests.last().expect("burst went quiet");
    println!(
        "request #{} about '{}': {}",
        request.generation, request.entity_name, request.scene_summary
    );

    session.complete_feedback(
        request.generation,
        Ok(FeedbackReply {
            impact: "Ada now blocks the key light's throw".to_string(),
            suggestion: "cheat her half a metre stage left".to_string(),
        }),
    );
    if let Some(note) = session.take_feedback_note() {
        println!("note: {note:?}");
    }

    let layout = session.layout().expect("analysis loaded");
    println!("final: {}", layout.summary());
    Ok(())
}
