use super::*;
use crate::foundation::core::Timestamp;

fn msg(sender: &str) -> ChatMessage {
    ChatMessage {
        sender_id: sender.to_owned(),
        sender_name: sender.to_uppercase(),
        text: "x".to_owned(),
        timestamp: Timestamp::ZERO,
    }
}

#[test]
fn palette_is_deterministic_and_per_sender() {
    let msgs = vec![msg("u1"), msg("u2"), msg("u1")];
    let a = SenderPalette::build(&msgs, Rgb8::new(10, 10, 10));
    let b = SenderPalette::build(msgs.iter().rev(), Rgb8::new(10, 10, 10));
    assert_eq!(a, b);
    assert_eq!(a.len(), 2);
    assert_ne!(a.color("u1"), a.color("u2"));
}

#[test]
fn unknown_sender_gets_fallback() {
    let p = SenderPalette::build(&[msg("u1")], Rgb8::new(10, 10, 10));
    assert_eq!(p.color("stranger"), Rgb8::new(10, 10, 10));
    assert!(SenderPalette::build(std::iter::empty(), Rgb8::BLACK).is_empty());
}
