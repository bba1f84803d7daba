use super::*;
use crate::foundation::core::Timestamp;

fn msg(n: u32) -> ChatMessage {
    ChatMessage {
        sender_id: "u".to_owned(),
        sender_name: "U".to_owned(),
        text: format!("m{n}"),
        timestamp: Timestamp::new(f64::from(n)).unwrap(),
    }
}

fn texts(w: &ChatWindow) -> Vec<String> {
    w.messages().map(|m| m.text.clone()).collect()
}

#[test]
fn capacity_three_keeps_last_three() {
    let mut w = ChatWindow::new(3).unwrap();
    for n in 1..=3 {
        assert!(w.admit(msg(n)).is_none());
    }
    let evicted = w.admit(msg(4)).unwrap();
    assert_eq!(evicted.text, "m1");
    assert_eq!(texts(&w), vec!["m2", "m3", "m4"]);
}

#[test]
fn zero_capacity_is_rejected() {
    assert!(ChatWindow::new(0).is_err());
}

#[test]
fn eviction_count_cuts_overflowing_and_older() {
    // Newest first: 30, 40 (70), 50 (120 > 100) → the 50 and everything older go.
    let heights = [10.0, 50.0, 40.0, 30.0];
    assert_eq!(foresee_eviction_count(heights, 100.0, |h| h), 2);
    assert_eq!(foresee_eviction_count(heights, 130.0, |h| h), 0);
    assert_eq!(foresee_eviction_count(heights, 129.0, |h| h), 1);
}

#[test]
fn eviction_count_edge_cases() {
    let none: [f64; 0] = [];
    assert_eq!(foresee_eviction_count(none, 10.0, |h| h), 0);
    // Exactly at the budget still fits.
    assert_eq!(foresee_eviction_count([5.0, 5.0], 10.0, |h| h), 0);
    // A single message taller than the budget evicts itself.
    assert_eq!(foresee_eviction_count([20.0], 10.0, |h| h), 1);
}

#[test]
fn foresee_and_evict_drops_from_front() {
    let mut w = ChatWindow::new(10).unwrap();
    for n in 1..=5 {
        w.admit(msg(n));
    }
    let evicted = w.foresee_and_evict(25.0, |_| 10.0);
    assert_eq!(evicted, 3);
    assert_eq!(texts(&w), vec!["m4", "m5"]);
}
