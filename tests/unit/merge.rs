use super::*;
use crate::encode::sink::InMemorySink;
use crate::media::source::InMemorySource;

fn c(w: u32, h: u32) -> Canvas {
    Canvas::new(w, h).unwrap()
}

fn layout() -> MergeLayout {
    MergeLayout {
        slides: c(4, 4),
        camera: c(2, 2),
        chat: c(2, 3),
    }
}

#[test]
fn compose_places_columns() {
    let red = Rgb8::new(255, 0, 0);
    let green = Rgb8::new(0, 255, 0);
    let blue = Rgb8::new(0, 0, 255);
    let out = layout()
        .compose(
            &FrameRGBA::solid(c(4, 4), red),
            &FrameRGBA::solid(c(2, 2), green),
            &FrameRGBA::solid(c(2, 3), blue),
        )
        .unwrap();
    assert_eq!((out.width, out.height), (6, 4));
    assert_eq!(out.pixel(3, 3), Some(red.to_rgba()));
    assert_eq!(out.pixel(4, 1), Some(green.to_rgba()));
    assert_eq!(out.pixel(5, 2), Some(blue.to_rgba()));
    // Chat is cropped to the slides height.
    assert_eq!(out.pixel(5, 3), Some(blue.to_rgba()));
}

#[test]
fn narrow_chat_leaves_black_padding() {
    let layout = MergeLayout {
        slides: c(2, 4),
        camera: c(3, 1),
        chat: c(1, 1),
    };
    let white = Rgb8::new(255, 255, 255);
    let out = layout
        .compose(
            &FrameRGBA::solid(c(2, 4), white),
            &FrameRGBA::solid(c(3, 1), white),
            &FrameRGBA::solid(c(1, 1), white),
        )
        .unwrap();
    assert_eq!(out.pixel(2, 1), Some(white.to_rgba()));
    assert_eq!(out.pixel(3, 1), Some(Rgb8::BLACK.to_rgba()));
    assert_eq!(out.pixel(2, 3), Some(Rgb8::BLACK.to_rgba()));
}

#[test]
fn exhausted_inputs_hold_last_frame_or_black() {
    let green = Rgb8::new(0, 255, 0);
    let mut slides = InMemorySource::repeat(&FrameRGBA::solid(c(4, 4), Rgb8::new(9, 9, 9)), 5);
    let mut camera = InMemorySource::repeat(&FrameRGBA::solid(c(2, 2), green), 2);
    let mut chat = InMemorySource::new(Vec::new());
    let mut sink = InMemorySink::new();
    let merger = StackedMerger::new(layout(), Fps::whole(10).unwrap(), 4).unwrap();
    let stats = merger
        .run(&mut slides, &mut camera, &mut chat, &mut sink)
        .unwrap();

    assert_eq!(stats.frames_written, 4);
    assert_eq!(stats.frames_held, 2 + 4);
    let last = &sink.frames()[3].1;
    assert_eq!(last.pixel(4, 0), Some(green.to_rgba()));
    assert_eq!(last.pixel(4, 3), Some(Rgb8::BLACK.to_rgba()));
    assert_eq!(sink.config().unwrap().width, 6);
}

#[test]
fn total_frames_follow_longest_input() {
    let fps = Fps::whole(10).unwrap();
    assert_eq!(merged_total_frames(&[1.0, 3.25, 2.0], fps).unwrap(), 32);
    assert!(merged_total_frames(&[], fps).is_err());
}
