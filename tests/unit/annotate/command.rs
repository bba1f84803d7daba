use super::*;
use crate::record::RawSeconds;

fn rec(kind: &str, points: &str) -> AnnotationRecord {
    AnnotationRecord {
        id: "a1".to_owned(),
        kind: kind.to_owned(),
        timestamp: RawSeconds::Text("1.5".to_owned()),
        page_id: "p1".to_owned(),
        color: "16711680,1".to_owned(),
        line_size: "3".to_owned(),
        points: points.to_owned(),
        ..Default::default()
    }
}

fn draw(parsed: Parsed) -> DrawObject {
    match parsed {
        Parsed::Event(AnnotationEvent::Draw(d)) => d,
        other => panic!("expected draw, got {other:?}"),
    }
}

#[test]
fn rectangle_parses_points_color_and_width() {
    let d = draw(CommandParser::new().parse(&rec("6", "(0,0),(10,10)")));
    assert_eq!(d.kind, DrawKind::Rectangle);
    assert_eq!(d.points, vec![(0, 0), (10, 10)]);
    assert_eq!(d.color, Rgb8::new(255, 0, 0));
    assert_eq!(d.stroke_width, 3.0);
    assert_eq!(d.created_at.secs(), 1.5);
    assert_eq!(d.text, None);
}

#[test]
fn decimal_coordinates_truncate() {
    let d = draw(CommandParser::new().parse(&rec("2", "(10.9,20.2) (30.5, 40.99);(-1.7,5)")));
    assert_eq!(d.points, vec![(10, 20), (30, 40), (-1, 5)]);
}

#[test]
fn text_keeps_payload() {
    let mut r = rec("4", "(0,0),(160,40)");
    r.text = "hello world".to_owned();
    let d = draw(CommandParser::new().parse(&r));
    assert_eq!(d.kind, DrawKind::Text);
    assert_eq!(d.text.as_deref(), Some("hello world"));
}

#[test]
fn removed_field_yields_remove_directive() {
    let mut r = rec("3", "");
    r.id = "r9".to_owned();
    r.removed = "a1".to_owned();
    assert_eq!(
        CommandParser::new().parse(&r),
        Parsed::Event(AnnotationEvent::Remove(RemoveDirective {
            id: "r9".to_owned(),
            target_id: "a1".to_owned(),
        }))
    );
}

#[test]
fn unsupported_kind_with_removed_target_is_discarded() {
    let p = CommandParser::new();
    for kind in ["9", "42", ""] {
        let mut r = rec(kind, "");
        r.removed = "a1".to_owned();
        assert_eq!(
            p.parse(&r),
            Parsed::Discard(DiscardReason::UnsupportedKind(kind.to_owned())),
            "kind {kind:?}"
        );
    }
}

#[test]
fn supported_draw_kind_with_removed_target_removes() {
    let mut r = rec("2", "(0,0),(1,1)");
    r.id = "r2".to_owned();
    r.removed = "a1".to_owned();
    assert_eq!(
        CommandParser::new().parse(&r),
        Parsed::Event(AnnotationEvent::Remove(RemoveDirective {
            id: "r2".to_owned(),
            target_id: "a1".to_owned(),
        }))
    );
}

#[test]
fn unknown_and_vendor_kinds_are_discarded() {
    let p = CommandParser::new();
    assert!(matches!(
        p.parse(&rec("9", "(0,0),(1,1)")),
        Parsed::Discard(DiscardReason::UnsupportedKind(_))
    ));
    assert!(matches!(
        p.parse(&rec("42", "(0,0),(1,1)")),
        Parsed::Discard(DiscardReason::UnsupportedKind(_))
    ));
    assert!(matches!(
        p.parse(&rec("3", "")),
        Parsed::Discard(DiscardReason::UnsupportedKind(_))
    ));
}

#[test]
fn malformed_points_are_discarded_not_errors() {
    let p = CommandParser::new();
    for bad in ["(1,2),(x,4)", "(1,2) junk", "garbage", "(1;2)"] {
        assert!(
            matches!(
                p.parse(&rec("2", bad)),
                Parsed::Discard(DiscardReason::MalformedPoints(_))
            ),
            "{bad}"
        );
    }
}

#[test]
fn rectangle_needs_two_points() {
    assert_eq!(
        CommandParser::new().parse(&rec("6", "(1,1)")),
        Parsed::Discard(DiscardReason::TooFewPoints {
            needed: 2,
            found: 1
        })
    );
}

#[test]
fn color_formats() {
    assert_eq!(parse_color("#00ff00").unwrap(), Rgb8::new(0, 255, 0));
    assert_eq!(parse_color("0x0000FF,0").unwrap(), Rgb8::new(0, 0, 255));
    assert_eq!(parse_color("").unwrap(), Rgb8::BLACK);
    assert!(parse_color("red").is_err());
}

#[test]
fn stroke_width_defaults_and_rejects() {
    assert_eq!(parse_stroke_width("").unwrap(), 1.0);
    assert_eq!(parse_stroke_width(" 2.5 ").unwrap(), 2.5);
    assert!(parse_stroke_width("-1").is_err());
    assert!(parse_stroke_width("thick").is_err());
}

#[test]
fn parse_command_routes_page_and_time() {
    let cmd = CommandParser::new()
        .parse_command(&rec("8", "(0,0),(5,5)"))
        .unwrap();
    assert_eq!(cmd.page_id, "p1");
    assert_eq!(cmd.timestamp.secs(), 1.5);
    assert_eq!(cmd.event.id(), "a1");
}

#[test]
fn negative_timestamp_is_discarded() {
    let mut r = rec("8", "(0,0),(5,5)");
    r.timestamp = RawSeconds::Number(-2.0);
    assert!(matches!(
        CommandParser::new().parse_command(&r),
        Err(DiscardReason::MalformedTimestamp(_))
    ));
}

#[test]
fn draw_objects_compare_by_id() {
    let a = draw(CommandParser::new().parse(&rec("6", "(0,0),(10,10)")));
    let b = draw(CommandParser::new().parse(&rec("2", "(3,3)")));
    assert_eq!(a, b);
}

#[test]
fn carries_text_only_for_drawable_text() {
    let p = CommandParser::new();
    let mut text = rec("4", "(0,0),(100,20)");
    text.text = "note".to_owned();
    assert!(p.carries_text(&text));

    let mut blank = text.clone();
    blank.text = "   ".to_owned();
    assert!(!p.carries_text(&blank));

    let mut removal = text.clone();
    removal.removed = "a0".to_owned();
    assert!(!p.carries_text(&removal));

    assert!(!p.carries_text(&rec("6", "(0,0),(1,1)")));
}
