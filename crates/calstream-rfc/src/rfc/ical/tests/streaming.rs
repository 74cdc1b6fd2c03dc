//! Iteration behavior: laziness, ordering, error fusing, hooks and sources.

use std::cell::RefCell;
use std::rc::Rc;

use super::fixtures::*;
use crate::rfc::ical::core::{Component, ComponentKind, Property};
use crate::rfc::ical::parse::{
    CalendarDeserializer, ComponentFactory, ComponentHooks, ParseErrorKind, parse_reader,
};

#[test_log::test]
fn event_with_alarm_yields_one_component() {
    let components = CalendarDeserializer::from_text(EVENT_WITH_ALARM)
        .collect::<Result<Vec<_>, _>>()
        .unwrap();

    assert_eq!(components.len(), 1);
    let event = &components[0];
    assert_eq!(event.name, "VEVENT");
    assert!(event.properties.is_empty());
    assert_eq!(event.children.len(), 1);
    assert_eq!(event.children[0].name, "VALARM");
    assert!(event.children[0].properties.is_empty());
}

#[test_log::test]
fn mismatched_end_yields_no_components() {
    let results: Vec<_> =
        CalendarDeserializer::from_text("BEGIN:VEVENT\r\nEND:VTODO\r\n").collect();

    assert_eq!(results.len(), 1);
    let err = results[0].as_ref().unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::MismatchedEnd);
    assert!(err.is_structural());
}

#[test_log::test]
fn property_before_begin_is_structural() {
    let err = CalendarDeserializer::from_text("VERSION:2.0\r\nBEGIN:VCALENDAR\r\n")
        .next()
        .unwrap()
        .unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::MissingBegin);
    assert_eq!(err.line, 1);
}

#[test_log::test]
fn top_level_components_come_in_document_order() {
    let names: Vec<_> = CalendarDeserializer::from_text(TWO_CALENDARS)
        .map(|c| {
            c.unwrap()
                .get_property("X-WR-CALNAME")
                .and_then(Property::as_text)
                .map(str::to_string)
        })
        .collect();
    assert_eq!(names, [Some("First".into()), Some("Second".into())]);
}

#[test_log::test]
fn components_are_yielded_before_later_input_is_read() {
    let input = format!("{TWO_CALENDARS}BROKEN LINE\r\n");
    let mut components = CalendarDeserializer::from_text(&input);

    assert!(components.next().unwrap().is_ok());
    // Only the first calendar (three lines) has been consumed.
    assert_eq!(components.line(), 4);
    assert!(components.next().unwrap().is_ok());

    let err = components.next().unwrap().unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::MalformedFieldName);
    assert_eq!(err.line, 7);
}

#[test_log::test]
fn nothing_is_yielded_after_an_error() {
    let input = format!("END:VCALENDAR\r\n{TWO_CALENDARS}");
    let mut components = CalendarDeserializer::from_text(&input);

    assert!(components.next().unwrap().is_err());
    assert!(components.next().is_none());
    assert!(components.next().is_none());
}

#[derive(Clone, Default)]
struct Recorder {
    events: Rc<RefCell<Vec<String>>>,
}

impl ComponentHooks for Recorder {
    fn on_deserializing(&self, component: &mut Component) {
        self.events
            .borrow_mut()
            .push(format!("deserializing {}", component.name));
    }

    fn on_deserialized(&self, component: &mut Component) {
        self.events.borrow_mut().push(format!(
            "deserialized {} ({} children)",
            component.name,
            component.children.len()
        ));
        component.add_property(Property::text("X-SEEN", "yes"));
    }
}

#[test_log::test]
fn hooks_run_around_each_component() {
    let recorder = Recorder::default();
    let components = CalendarDeserializer::builder()
        .hooks(recorder.clone())
        .build_text(EVENT_WITH_ALARM)
        .collect::<Result<Vec<_>, _>>()
        .unwrap();

    assert_eq!(
        *recorder.events.borrow(),
        [
            "deserializing VEVENT",
            "deserializing VALARM",
            "deserialized VALARM (0 children)",
            "deserialized VEVENT (1 children)",
        ]
    );

    // Changes made by the hook are visible on the yielded tree.
    assert_eq!(
        components[0].get_property("X-SEEN").and_then(Property::as_text),
        Some("yes")
    );
    assert!(components[0].children[0].get_property("X-SEEN").is_some());
}

struct TaskFactory;

impl ComponentFactory for TaskFactory {
    fn build(&self, name: &str) -> Component {
        if name.eq_ignore_ascii_case("X-TASK") {
            let mut todo = Component::new(ComponentKind::Todo);
            todo.name = "X-TASK".into();
            todo
        } else {
            Component::custom(name)
        }
    }
}

#[test_log::test]
fn custom_component_factory() {
    let components = CalendarDeserializer::builder()
        .component_factory(TaskFactory)
        .build_text("BEGIN:X-TASK\r\nSUMMARY:write docs\r\nEND:x-task\r\n")
        .collect::<Result<Vec<_>, _>>()
        .unwrap();

    assert_eq!(components[0].kind, ComponentKind::Todo);
    assert_eq!(components[0].summary(), Some("write docs"));
}

#[test_log::test]
fn reader_and_text_sources_agree() {
    let from_reader = parse_reader(SIMPLE_VEVENT.as_bytes()).unwrap();
    let from_text = CalendarDeserializer::from_text(SIMPLE_VEVENT)
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    assert_eq!(from_reader, from_text);
}

#[test_log::test]
fn tiny_read_buffer_keeps_multibyte_characters() {
    let input = "BEGIN:VEVENT\r\nSUMMARY:Café ☕ in Zürich\r\nEND:VEVENT\r\n";
    let components = CalendarDeserializer::builder()
        .buffer_capacity(1)
        .build_read(input.as_bytes())
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    assert_eq!(components[0].summary(), Some("Café ☕ in Zürich"));
}

#[test_log::test]
fn invalid_utf8_from_reader() {
    let input: &[u8] = b"BEGIN:VEVENT\r\nSUMMARY:\xff\r\nEND:VEVENT\r\n";
    let err = parse_reader(input).unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::InvalidUtf8);
    assert_eq!(err.line, 2);
}

#[test_log::test]
fn unknown_components_keep_their_name() {
    let components = CalendarDeserializer::from_text(
        "BEGIN:VCALENDAR\r\nBEGIN:X-VENDOR-THING\r\nX-A:1\r\nEND:X-VENDOR-THING\r\nEND:VCALENDAR\r\n",
    )
    .collect::<Result<Vec<_>, _>>()
    .unwrap();

    let child = &components[0].children[0];
    assert_eq!(child.kind, ComponentKind::Unknown);
    assert_eq!(child.name, "X-VENDOR-THING");
    assert_eq!(child.properties.len(), 1);
}
