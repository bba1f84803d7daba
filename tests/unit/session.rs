use super::*;

#[test]
fn manifest_parses_tagged_jobs() {
    let json = r#"{
      "threads": 2,
      "jobs": [
        {"kind": "chat", "records": "c.json",
         "output": {"format": "png", "dir": "out/chat"},
         "opts": {"capacity": 5}},
        {"kind": "annotate", "records": "a.json", "video": "v.mp4",
         "output": {"format": "mp4", "out_path": "out/a.mp4"},
         "resize": {"width": 640, "height": 480}},
        {"kind": "merge", "slides": "s.mp4", "camera": "g.mp4", "chat": "c.mp4",
         "output": {"format": "mp4", "out_path": "out/final.mp4", "overwrite": false}}
      ]
    }"#;
    let manifest: BatchManifest = serde_json::from_str(json).unwrap();
    assert_eq!(manifest.threads, Some(2));
    assert_eq!(manifest.jobs.len(), 3);
    match &manifest.jobs[0] {
        Job::Chat(j) => {
            assert_eq!(j.opts.capacity, 5);
            assert_eq!(j.opts.width, 320);
            assert_eq!(j.output, OutputTarget::png("out/chat"));
        }
        other => panic!("expected chat job, got {other:?}"),
    }
    match &manifest.jobs[1] {
        Job::Annotate(j) => {
            assert_eq!(j.resize, Some(Canvas::new(640, 480).unwrap()));
            assert_eq!(j.opts, AnnotateOpts::default());
        }
        other => panic!("expected annotate job, got {other:?}"),
    }
    match &manifest.jobs[2] {
        Job::Merge(j) => {
            assert_eq!(j.fps, Fps::whole(10).unwrap());
            assert!(matches!(&j.output, OutputTarget::Mp4(o) if !o.overwrite));
        }
        other => panic!("expected merge job, got {other:?}"),
    }
}

#[test]
fn resize_only_applies_when_size_differs() {
    let native = Canvas::new(320, 240).unwrap();
    let target = OutputTarget::mp4("a.mp4");
    assert_eq!(target.with_resize(Some(native), native), target);
    assert_eq!(target.with_resize(None, native), target);
    let bigger = Canvas::new(640, 480).unwrap();
    assert!(matches!(
        target.with_resize(Some(bigger), native),
        OutputTarget::Mp4(o) if o.resize == Some(bigger)
    ));
    let png = OutputTarget::png("dir");
    assert_eq!(png.with_resize(Some(bigger), native), png);
}

#[test]
fn chat_job_writes_png_sequence() {
    let dir = tempfile::tempdir().unwrap();
    let records = dir.path().join("chat.json");
    std::fs::write(
        &records,
        r#"[{"timestamp": "0.2", "senderId": "u1", "sender": "Ann", "content": "hi"},
            {"timestamp": "0.4", "senderId": "u2", "sender": "Bo", "content": "hey"}]"#,
    )
    .unwrap();
    let job = Job::Chat(ChatJob {
        records,
        output: OutputTarget::png(dir.path().join("frames")),
        opts: ChatRenderOpts {
            width: 64,
            height: 48,
            ..ChatRenderOpts::default()
        },
    });
    let JobReport::Chat(stats) = job.run().unwrap() else {
        panic!("expected chat report");
    };
    assert_eq!(stats.frames_written, 5);
    assert!(dir.path().join("frames/frame_000004.png").exists());
    assert!(job.label().starts_with("chat "));
}

#[test]
fn missing_records_file_is_reported() {
    let job = ChatJob {
        records: PathBuf::from("/definitely/not/here.json"),
        output: OutputTarget::png("unused"),
        opts: ChatRenderOpts::default(),
    };
    let err = run_chat(&job).unwrap_err();
    assert!(err.to_string().contains("here.json"));
}

#[test]
fn merge_output_takes_camera_audio() {
    let camera = Path::new("in/camera.mp4");
    assert!(matches!(
        OutputTarget::mp4("final.mp4").with_audio(camera),
        OutputTarget::Mp4(o) if o.audio_path.as_deref() == Some(camera)
    ));
    let preset = OutputTarget::Mp4(FfmpegSinkOpts::new("final.mp4").with_audio("narration.m4a"));
    assert_eq!(preset.with_audio(camera), preset);
    let png = OutputTarget::png("frames");
    assert_eq!(png.with_audio(camera), png);
}

#[test]
fn configured_font_must_load() {
    let err = build_surface(Some(Path::new("/no/such/font.ttf")), 16.0, 18.0, false).unwrap_err();
    assert!(err.to_string().contains("font.ttf"));
}

#[test]
fn chat_job_without_usable_font_fails_before_writing() {
    let dir = tempfile::tempdir().unwrap();
    let records = dir.path().join("chat.json");
    std::fs::write(&records, r#"[{"timestamp": 0.1, "sender": "Ann", "content": "hi"}]"#).unwrap();
    let not_a_font = dir.path().join("empty.ttf");
    std::fs::write(&not_a_font, b"").unwrap();
    let job = ChatJob {
        records,
        output: OutputTarget::png(dir.path().join("frames")),
        opts: ChatRenderOpts {
            font_path: Some(not_a_font),
            ..ChatRenderOpts::default()
        },
    };
    assert!(run_chat(&job).is_err());
    assert!(!dir.path().join("frames").exists());
}

#[test]
fn record_span_tolerates_out_of_order_stamps() {
    let stamps = [
        RawSeconds::Number(12.5),
        RawSeconds::Text("bogus".into()),
        RawSeconds::Number(3.0),
        RawSeconds::Number(-1.0),
    ];
    assert_eq!(record_span_secs(&stamps), Some(9.5));
    assert_eq!(record_span_secs(&stamps[..1]), Some(0.0));
    assert_eq!(record_span_secs(&stamps[1..2]), None);
    assert_eq!(record_span_secs(std::iter::empty()), None);
}
