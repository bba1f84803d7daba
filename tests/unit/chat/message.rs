use super::*;
use crate::record::RawSeconds;

#[test]
fn clean_text_replaces_html_fragments() {
    assert_eq!(clean_text("a&nbsp;b"), "a b");
    assert_eq!(clean_text("line\n    next"), "line next");
    assert_eq!(clean_text(r#"hi<img src="smile.gif"/>there"#), "hi there");
    assert_eq!(
        clean_text(r#"<SPAN style="color:red">important</SPAN>"#),
        "important"
    );
    assert_eq!(clean_text("plain"), "plain");
}

#[test]
fn from_record_cleans_and_validates() {
    let rec = ChatRecord {
        timestamp: RawSeconds::Text("4.25".to_owned()),
        sender_id: "u1".to_owned(),
        sender_name: "Ann".to_owned(),
        content: "hello&nbsp;all".to_owned(),
    };
    let msg = ChatMessage::from_record(&rec).unwrap();
    assert_eq!(msg.text, "hello all");
    assert_eq!(msg.timestamp.secs(), 4.25);
    assert_eq!(msg.display_line(), "[Ann] hello all");
}

#[test]
fn from_record_rejects_bad_timestamps() {
    let mut rec = ChatRecord {
        timestamp: RawSeconds::Number(-1.0),
        ..Default::default()
    };
    assert!(ChatMessage::from_record(&rec).is_err());
    rec.timestamp = RawSeconds::Text("later".to_owned());
    assert!(ChatMessage::from_record(&rec).is_err());
}
