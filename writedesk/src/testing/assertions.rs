//! Assertions over editor responses and audit events.

use crate::core::Severity;
use crate::editor::EditorResponse;
use crate::events::CollectingEventSink;
use crate::partials::PatchScript;

/// Asserts that the response is a full page and returns its HTML.
pub fn assert_page(response: &EditorResponse) -> &str {
    match response {
        EditorResponse::Page(html) => html,
        other => panic!("Expected a page, got {other:?}"),
    }
}

/// Asserts that the response is a patch script and returns it.
pub fn assert_patch(response: &EditorResponse) -> &PatchScript {
    match response {
        EditorResponse::Patch(script) => script,
        other => panic!("Expected a patch script, got {other:?}"),
    }
}

/// Asserts that the response shows a message of `severity` containing `text`.
pub fn assert_message(response: &EditorResponse, severity: Severity, text: &str) {
    match response {
        EditorResponse::Page(html) => {
            let class = format!("messageflash {severity}");
            assert!(
                html.contains(&class),
                "Expected a {severity} message, page has none"
            );
            assert!(
                html.contains(text),
                "Expected the page to mention '{text}'"
            );
        }
        EditorResponse::Patch(script) => {
            assert_eq!(
                script.announce.severity, severity,
                "Expected a {severity} announcement, got {:?}",
                script.announce
            );
            assert!(
                script.announce.text.contains(text),
                "Expected the announcement to mention '{text}', got '{}'",
                script.announce.text
            );
        }
        EditorResponse::Xml(xml) => panic!("Expected a rendered editor, got {xml}"),
    }
}

/// Asserts that the sink saw exactly `count` events of `kind`.
pub fn assert_event_count(events: &CollectingEventSink, kind: &str, count: usize) {
    let seen = events.events_of_type(kind).len();
    assert_eq!(
        seen,
        count,
        "Expected {count} '{kind}' events, saw {seen}; all events: {:?}",
        events.event_types()
    );
}

/// Asserts that the sink saw no events at all.
pub fn assert_no_events(events: &CollectingEventSink) {
    assert!(
        events.is_empty(),
        "Expected no events, saw {:?}",
        events.event_types()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Message;
    use crate::events::EventSink;

    #[test]
    fn test_assert_page() {
        let response = EditorResponse::Page("<html />".into());
        assert_eq!(assert_page(&response), "<html />");
    }

    #[test]
    #[should_panic(expected = "Expected a page")]
    fn test_assert_page_rejects_xml() {
        assert_page(&EditorResponse::Xml("<x />".into()));
    }

    #[test]
    fn test_assert_message_on_patch() {
        let response = EditorResponse::Patch(PatchScript::new(Message::warning("Heads up")));
        assert_message(&response, Severity::Warning, "Heads");
    }

    #[test]
    #[should_panic(expected = "Expected a error announcement")]
    fn test_assert_message_checks_severity() {
        let response = EditorResponse::Patch(PatchScript::new(Message::success("Done")));
        assert_message(&response, Severity::Error, "Done");
    }

    #[test]
    fn test_assert_event_count() {
        let sink = CollectingEventSink::new();
        sink.try_emit("article.saved", None);
        assert_event_count(&sink, "article.saved", 1);
        assert_event_count(&sink, "article.posted", 0);
    }
}
