use super::*;
use crate::chat::engine::ChatRenderOpts;
use crate::session::{ChatJob, OutputTarget};

#[test]
fn results_keep_input_order() {
    let items: Vec<u64> = (0..64).collect();
    let out = run_batch_with(&items, Some(4), |n| n * n).unwrap();
    assert_eq!(out, items.iter().map(|n| n * n).collect::<Vec<_>>());
}

#[test]
fn zero_threads_is_rejected() {
    assert!(run_batch_with(&[1u8], Some(0), |n| *n).is_err());
}

#[test]
fn failing_job_does_not_stop_the_batch() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("good.json");
    std::fs::write(&good, r#"[{"timestamp": 0.3, "sender": "A", "senderId": "a", "content": "x"}]"#)
        .unwrap();
    let job = |records: std::path::PathBuf, out: &str| {
        Job::Chat(ChatJob {
            records,
            output: OutputTarget::png(dir.path().join(out)),
            opts: ChatRenderOpts {
                width: 32,
                height: 32,
                ..ChatRenderOpts::default()
            },
        })
    };
    let jobs = vec![
        job(good.clone(), "one"),
        job(dir.path().join("missing.json"), "two"),
        job(good, "three"),
    ];
    let results = run_batch(&jobs, Some(2)).unwrap();
    assert_eq!(results.len(), 3);
    assert!(results[0].is_ok());
    assert!(results[1].is_err());
    assert!(matches!(&results[2], Ok(JobReport::Chat(s)) if s.frames_written == 4));
}
