use previz::{
    CharacterTimeline, FeedbackNote, FeedbackReply, Keyframe, Point, PrevizError,
    RecordingFeedback, SceneScript, SceneSession, SceneSnapshot, ScriptBuilder, SessionOpts,
    Track, Vec3,
};

fn chase_script() -> SceneScript {
    let mut ada = CharacterTimeline::new("Ada");
    ada.positions = Track::new(vec![
        Keyframe::labeled(0.0, Point::new(20.0, 50.0), "look left"),
        Keyframe::labeled(5.0, Point::new(50.0, 50.0), "look down"),
        Keyframe::new(10.0, Point::new(80.0, 50.0)),
    ]);
    ada.emotions = Track::new(vec![
        Keyframe::labeled(0.0, 0.1, "calm"),
        Keyframe::labeled(10.0, 0.9, "tense"),
    ]);
    ScriptBuilder::new("Chase", 10.0)
        .character(ada)
        .expect("unique name")
        .environment("rain-slick alley")
        .mood("urgent")
        .build()
        .expect("valid script")
}

fn alley_analysis() -> SceneSnapshot {
    serde_json::from_value(serde_json::json!({
        "actors": [
            {"name": "Ada", "position": {"x": 30.0, "y": 45.0, "z": 0.0}},
            {"name": "Pursuer", "position": {"x": 75.0, "y": 60.0, "z": 0.0}}
        ],
        "camera": {"position": {"x": 50.0, "y": 95.0, "z": 15.0},
                   "movement": "low tracking shot"},
        "environmentDescription": "rain-slick alley",
        "overallMood": "urgent"
    }))
    .unwrap()
}

fn reply(impact: &str) -> FeedbackReply {
    FeedbackReply {
        impact: impact.to_string(),
        suggestion: "push the key light back".to_string(),
    }
}

#[test]
fn playback_edit_and_feedback_flow() {
    let mut session = SceneSession::new(chase_script(), SessionOpts::default()).unwrap();
    let mut client = RecordingFeedback::default();

    // Playback start: first observation commits without a transition.
    let f0 = session.tick(0.0, 0.0, &mut client);
    assert_eq!(f0.poses.len(), 1);
    assert!(f0.poses[0].settled());
    assert_eq!(f0.poses[0].planar, Point::new(20.0, 50.0));

    // Scrub past the 5s keyframe: the cue flips to "look down" and a
    // transition starts at the current wall time.
    let f1 = session.tick(6.0, 1.0, &mut client);
    assert_eq!(f1.poses[0].progress, 0.0);
    let f2 = session.tick(6.0, 1.8, &mut client);
    assert!(f2.poses[0].settled());
    assert!((f2.poses[0].head.pitch - 0.5).abs() < 1e-9);

    // Analysis lands: authoritative actors join the blend under their own
    // identities.
    session.load_analysis(alley_analysis()).unwrap();
    let joined = session.tick(6.0, 2.0, &mut client);
    let ids: Vec<&str> = joined.poses.iter().map(|p| p.identity.as_str()).collect();
    assert_eq!(ids, vec!["Ada", "actor-0", "actor-1"]);

    // A drag burst: the moved entity tracks instantly, and exactly one
    // request goes out once the burst goes quiet.
    assert!(session.apply_edit("actor-0", Vec3::new(40.0, 40.0, 0.0), 2.1));
    assert!(session.apply_edit("actor-0", Vec3::new(45.0, 40.0, 0.0), 2.3));
    let dragged = session.tick(6.0, 2.5, &mut client);
    assert_eq!(dragged.poses[1].planar, Point::new(45.0, 40.0));
    assert!(client.requests.is_empty());

    session.tick(6.0, 2.8, &mut client);
    assert_eq!(client.requests.len(), 1);
    assert_eq!(client.requests[0].entity_name, "Ada");
    assert!(client.requests[0].scene_summary.contains("rain-slick alley"));
    let g1 = client.requests[0].generation;
    assert!(session.in_flight());

    // A second burst goes out while the first reply is still on the wire.
    assert!(session.apply_edit("actor-1", Vec3::new(70.0, 60.0, 0.0), 3.0));
    session.tick(6.0, 3.5, &mut client);
    assert_eq!(client.requests.len(), 2);
    let g2 = client.requests[1].generation;

    // The straggling first reply is stale and must not surface.
    assert!(!session.complete_feedback(g1, Ok(reply("it crowds the frame"))));
    assert!(session.feedback_note().is_none());
    assert!(session.complete_feedback(g2, Ok(reply("stronger diagonal"))));
    match session.take_feedback_note() {
        Some(FeedbackNote::Reply(r)) => assert_eq!(r.impact, "stronger diagonal"),
        other => panic!("unexpected note: {other:?}"),
    }
    assert!(!session.in_flight());

    // A transport failure degrades to the fallback note.
    assert!(session.apply_edit("actor-0", Vec3::new(42.0, 40.0, 0.0), 4.0));
    session.tick(6.0, 4.5, &mut client);
    let g3 = client.requests[2].generation;
    assert!(session.complete_feedback(g3, Err(PrevizError::timeline("request failed"))));
    assert_eq!(session.feedback_note(), Some(&FeedbackNote::Fallback));

    // Every applied edit stuck; nothing else about the layout moved.
    let layout = session.layout().unwrap();
    assert_eq!(layout.find("actor-0").unwrap().position().x, 42.0);
    assert_eq!(layout.find("actor-1").unwrap().position().x, 70.0);
    assert_eq!(layout.camera().unwrap().movement.as_deref(), Some("low tracking shot"));
}

#[test]
fn scene_change_clears_the_edit_view() {
    let mut session = SceneSession::new(chase_script(), SessionOpts::default()).unwrap();
    let mut client = RecordingFeedback::default();

    session.load_analysis(alley_analysis()).unwrap();
    assert!(session.layout().is_some());

    session.clear_analysis();
    assert!(session.layout().is_none());
    assert!(!session.apply_edit("actor-0", Vec3::ZERO, 0.0));

    // Only the scripted actor remains in the blend.
    let frame = session.tick(0.0, 0.5, &mut client);
    assert_eq!(frame.poses.len(), 1);
    assert!(client.requests.is_empty());
}

#[test]
fn timeline_graphs_come_from_the_session() {
    let session = SceneSession::new(chase_script(), SessionOpts::default()).unwrap();

    let ramp = session.emotion_ramp("Ada").expect("known character");
    assert_eq!(ramp.len(), 200);
    assert_eq!(ramp.first().unwrap().offset, 0.0);
    assert_eq!(ramp.last().unwrap().offset, 1.0);

    // No camera moves authored: the curve is a flat baseline.
    let curve = session.camera_complexity_curve();
    assert!(curve.iter().all(|p| p.value == 0.0));
}
