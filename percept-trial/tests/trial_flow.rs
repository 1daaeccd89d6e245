use std::time::Duration;

use percept_core::{Combine, Fill, PerceptError};
use percept_render::render_trial;
use percept_timing::ManualTimer;
use percept_trial::{SessionConfig, TrialParams, TrialSession, normalize};

fn params(json: &str) -> TrialParams {
    TrialParams::from_json(json).unwrap()
}

#[test]
fn disc_trial_from_json() {
    let p = params(r#"{"items": [{"kind": "disc", "radius": 40, "gray": 0.8}]}"#);
    let n = normalize(&p);
    let surface = render_trial(&n.context, &n.items).unwrap();

    assert_eq!((surface.width(), surface.height()), (800, 600));
    assert_eq!(surface.gray_at(400, 300), Some(204));
    assert_eq!(surface.gray_at(400, 300 - 38), Some(204));
    assert_eq!(surface.gray_at(400, 300 - 42), Some(128));
    assert_eq!(surface.gray_at(0, 0), Some(128));
}

#[test]
fn grating_trial_from_json() {
    let p = params(
        r#"{"items": {"kind": "grating", "width": 100, "height": 100,
            "orientation": 0, "barWidth": 10, "contrast": 0.4}}"#,
    );
    let n = normalize(&p);
    let surface = render_trial(&n.context, &n.items).unwrap();

    let mut seen = Vec::new();
    for band in 0..10 {
        let v = surface.gray_at(350 + band * 10 + 5, 300).unwrap();
        assert!(v == 76 || v == 178, "band {band} = {v}");
        seen.push(v);
    }
    assert!(seen.windows(2).all(|w| w[0] != w[1]));
    assert_eq!(surface.gray_at(349, 300), Some(128));
}

#[test]
fn legacy_trial_renders_one_shape() {
    let p = params(r#"{"backgroundGray": 0, "kind": "square", "size": 20, "gray": 1}"#);
    let n = normalize(&p);
    assert_eq!(n.items.len(), 1);
    assert_eq!(n.items[0].fill, Fill::Gray(1.0));
    let surface = render_trial(&n.context, &n.items).unwrap();
    assert_eq!(surface.gray_at(400, 300), Some(255));
    assert_eq!(surface.gray_at(400, 315), Some(0));
}

#[test]
fn degree_geometry_with_calibration() {
    let p = params(
        r#"{"pixelsPerDegree": 20, "backgroundGray": 0,
            "items": [{"kind": "disc", "radiusDeg": 1, "xDeg": 5, "gray": 1}]}"#,
    );
    let n = normalize(&p);
    let surface = render_trial(&n.context, &n.items).unwrap();
    // Centered 100 px right of the canvas center with a 20 px radius.
    assert_eq!(surface.gray_at(500, 300), Some(255));
    assert_eq!(surface.gray_at(500 + 17, 300), Some(255));
    assert_eq!(surface.gray_at(500 + 23, 300), Some(0));
    assert_eq!(surface.gray_at(400, 300), Some(0));
}

#[test]
fn max_combine_keeps_the_brighter_layer() {
    let p = params(
        r#"{"combine": "max", "backgroundGray": 0.5, "items": [
            {"kind": "rect", "width": 40, "height": 40, "gray": 0.2},
            {"kind": "rect", "width": 40, "height": 40, "gray": 0.8, "x": 100}]}"#,
    );
    let n = normalize(&p);
    assert_eq!(n.context.combine, Combine::Max);
    let surface = render_trial(&n.context, &n.items).unwrap();
    assert_eq!(surface.gray_at(400, 300), Some(128));
    assert_eq!(surface.gray_at(500, 300), Some(204));
}

#[test]
fn zero_sized_canvas_fails_setup() {
    let p = params(r#"{"canvasWidth": 0, "items": {"kind": "disc"}}"#);
    let n = normalize(&p);
    assert!(render_trial(&n.context, &n.items).is_err());
}

#[test]
fn oversize_canvas_is_a_surface_error() {
    let p = params(r#"{"canvasWidth": 500000000, "canvasHeight": 500000000}"#);
    let n = normalize(&p);
    let err = render_trial(&n.context, &n.items).unwrap_err();
    assert!(matches!(err, PerceptError::Surface(_)), "{err}");
}

#[test]
fn session_echoes_normalized_items() {
    let p = params(
        r#"{"trialId": 9, "choices": ["f", "j"], "items": [
            {"kind": "noise", "seed": 3, "z": 2},
            {"kind": "cross", "z": 5, "blend": "lighter"}]}"#,
    );
    let n = normalize(&p);
    let clock = ManualTimer::new();
    let mut session = TrialSession::new(SessionConfig::from(&p), &n.items, clock.clone());

    session.stimulus_shown();
    clock.advance(Duration::from_millis(420));
    assert!(session.respond("j"));
    let record = session.finish();

    assert_eq!(record.trial_id, 9);
    assert_eq!(record.rt_ms, Some(420.0));
    let kinds: Vec<_> = record.items.iter().map(|i| i.kind.as_str()).collect();
    assert_eq!(kinds, ["texture", "cross"]);
    assert_eq!(record.items[0].seed, Some(3));

    let json = serde_json::to_string(&record).unwrap();
    assert!(json.contains("\"blend\":\"lighter\""));
}
