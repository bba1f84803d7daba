use super::*;
use crate::foundation::core::Fps;

fn cfg(width: u32, height: u32) -> SinkConfig {
    SinkConfig {
        width,
        height,
        fps: Fps::whole(10).unwrap(),
    }
}

#[test]
fn flatten_premul_alpha_0_returns_bg() {
    let src = vec![0u8, 0, 0, 0];
    let mut dst = vec![0u8; 4];
    flatten_premul_over_bg_to_opaque_rgba8(&mut dst, &src, [10, 20, 30, 255]).unwrap();
    assert_eq!(dst, vec![10, 20, 30, 255]);
}

#[test]
fn flatten_premul_alpha_255_is_identity() {
    let src = vec![1u8, 2, 3, 255];
    let mut dst = vec![0u8; 4];
    flatten_premul_over_bg_to_opaque_rgba8(&mut dst, &src, [10, 20, 30, 255]).unwrap();
    assert_eq!(dst, src);
}

#[test]
fn flatten_rejects_mismatched_buffers() {
    let mut dst = vec![0u8; 8];
    assert!(flatten_premul_over_bg_to_opaque_rgba8(&mut dst, &[0u8; 4], [0, 0, 0, 255]).is_err());
}

#[test]
fn args_describe_rawvideo_input_and_output_path() {
    let args = FfmpegSinkOpts::new("out/session.mp4")
        .ffmpeg_args(&cfg(320, 240))
        .unwrap();
    assert_eq!(args[0], "-y");
    let s = args.join(" ");
    assert!(s.contains("-f rawvideo -pix_fmt rgba -s 320x240 -r 10/1 -i pipe:0"));
    assert!(!s.contains("scale="));
    assert!(s.contains("-i pipe:0 -an"));
    assert_eq!(args.last().map(String::as_str), Some("out/session.mp4"));
}

#[test]
fn resize_adds_scale_filter() {
    let opts = FfmpegSinkOpts::new("o.mp4").with_resize(Canvas::new(640, 480).unwrap());
    let args = opts.ffmpeg_args(&cfg(320, 240)).unwrap();
    let vf = args.iter().position(|a| a == "-vf").unwrap();
    assert_eq!(args[vf + 1], "scale=640:480");
}

#[test]
fn odd_sizes_are_rejected() {
    assert!(FfmpegSinkOpts::new("o.mp4").ffmpeg_args(&cfg(321, 240)).is_err());
    let opts = FfmpegSinkOpts::new("o.mp4").with_resize(Canvas::new(641, 480).unwrap());
    assert!(opts.ffmpeg_args(&cfg(320, 240)).is_err());
}

#[test]
fn no_overwrite_uses_n_flag() {
    let mut opts = FfmpegSinkOpts::new("o.mp4");
    opts.overwrite = false;
    assert_eq!(opts.ffmpeg_args(&cfg(2, 2)).unwrap()[0], "-n");
}

#[test]
fn push_before_begin_fails() {
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new("o.mp4"));
    let frame = FrameRGBA::solid(Canvas::new(2, 2).unwrap(), crate::foundation::core::Rgb8::BLACK);
    assert!(sink.push_frame(FrameIndex(0), &frame).is_err());
}

#[test]
fn opts_deserialize_with_defaults() {
    let opts: FfmpegSinkOpts = serde_json::from_str(r#"{"out_path":"a.mp4"}"#).unwrap();
    assert!(opts.overwrite);
    assert_eq!(opts.bg_rgba, [0, 0, 0, 255]);
    assert_eq!(opts.resize, None);
    assert_eq!(opts.audio_path, None);
}

#[test]
fn audio_input_is_mapped_after_the_frame_pipe() {
    let opts = FfmpegSinkOpts::new("final.mp4").with_audio("in/camera.mp4");
    let args = opts.ffmpeg_args(&cfg(640, 480)).unwrap();
    let s = args.join(" ");
    assert!(s.contains("-i pipe:0 -i in/camera.mp4 -map 0:v:0 -map 1:a:0? -c:a aac"));
    assert!(!args.iter().any(|a| a == "-an"));
    assert_eq!(args.last().map(String::as_str), Some("final.mp4"));
}

#[test]
fn audio_path_deserializes() {
    let opts: FfmpegSinkOpts =
        serde_json::from_str(r#"{"out_path":"a.mp4","audio_path":"cam.mp4"}"#).unwrap();
    assert_eq!(opts.audio_path, Some(PathBuf::from("cam.mp4")));
}

#[test]
fn unstarted_sink_drops_quietly() {
    drop(FfmpegSink::new(FfmpegSinkOpts::new("never.mp4")));
}

#[cfg(target_os = "linux")]
#[test]
fn abandoned_sink_reaps_ffmpeg() {
    if !is_ffmpeg_on_path() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(dir.path().join("cut.mp4")));
    sink.begin(cfg(16, 16)).unwrap();
    let pid = sink.child.as_ref().unwrap().id();
    assert!(std::path::Path::new(&format!("/proc/{pid}")).exists());
    drop(sink);
    assert!(!std::path::Path::new(&format!("/proc/{pid}")).exists());
}
