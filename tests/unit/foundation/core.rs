use super::*;

#[test]
fn fps_frames_secs_roundtrip_floor() {
    let fps = Fps::new(30000, 1001).unwrap();
    let secs = fps.frames_to_secs(123);
    assert_eq!(fps.secs_to_frames_floor(secs), 123);
}

#[test]
fn fps_rejects_zero_parts() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(10, 0).is_err());
}

#[test]
fn fps_from_probe_rate() {
    assert_eq!(Fps::from_f64(25.0).unwrap(), Fps { num: 25, den: 1 });
    assert_eq!(Fps::from_f64(29.97).unwrap(), Fps { num: 29970, den: 1000 });
    assert!(Fps::from_f64(f64::NAN).is_err());
}

#[test]
fn frame_index_floors_and_starts_at_zero() {
    let fps = Fps::whole(10).unwrap();
    assert_eq!(frame_index(Timestamp::ZERO, fps), FrameIndex(0));
    assert_eq!(frame_index(Timestamp::new(0.09).unwrap(), fps), FrameIndex(0));
    assert_eq!(frame_index(Timestamp::new(0.1).unwrap(), fps), FrameIndex(1));
    assert_eq!(frame_index(Timestamp::new(1.0).unwrap(), fps), FrameIndex(10));
    assert_eq!(frame_index(Timestamp::new(1.99).unwrap(), fps), FrameIndex(19));
}

#[test]
fn frame_index_absorbs_decimal_representation_error() {
    let fps = Fps::whole(10).unwrap();
    // 2.3 * 10.0 == 22.999999999999996 in binary floating point.
    assert_eq!(frame_index(Timestamp::parse("2.3").unwrap(), fps), FrameIndex(23));
}

#[test]
#[should_panic(expected = "non-negative")]
fn frame_index_secs_fails_fast_on_negative() {
    let fps = Fps::whole(10).unwrap();
    let _ = frame_index_secs(-0.5, fps);
}

#[test]
fn timestamp_validation() {
    assert!(Timestamp::new(-1.0).is_err());
    assert!(Timestamp::new(f64::INFINITY).is_err());
    assert!(Timestamp::parse("abc").is_err());
    assert_eq!(Timestamp::parse(" 12.5 ").unwrap().secs(), 12.5);
}

#[test]
fn timestamp_span_is_order_insensitive() {
    let start = Timestamp::parse("5801.734").unwrap();
    let stop = Timestamp::parse("5801.684").unwrap();
    let span = Timestamp::span_abs(start, stop);
    assert!((span - 0.05).abs() < 1e-6);
    assert_eq!(span, Timestamp::span_abs(stop, start));
}

#[test]
fn total_frames_floors_duration() {
    let fps = Fps::whole(10).unwrap();
    assert_eq!(total_frames(3.27, fps), 32);
    assert_eq!(total_frames(0.0, fps), 0);
    assert_eq!(total_frames(-4.0, fps), 0);
}

#[test]
fn rgb_from_packed() {
    assert_eq!(Rgb8::from_packed(0xff8000), Rgb8::new(255, 128, 0));
    assert_eq!(Rgb8::from_packed(0x01_00_00_ff), Rgb8::new(0, 0, 255));
}

#[test]
fn canvas_rejects_empty() {
    assert!(Canvas::new(0, 10).is_err());
    assert_eq!(Canvas::new(4, 2).unwrap().rgba_len(), 32);
}
