//! Streaming component assembler.

use std::io::{BufRead, BufReader, Read};

use calstream_core::config::ParserConfig;

use super::context::{Frame, ParseContext, PropertyFrame};
use super::cursor::{CharSource, Cursor, ReaderSource, StrSource};
use super::dispatch::{
    DataTypeMapper, DefaultSerializerFactory, Dispatcher, SerializerFactory, TypeMapper,
};
use super::error::{ParseError, ParseErrorKind, ParseResult};
use super::factory::{ComponentFactory, ComponentHooks, ComponentRegistry, NoopHooks};
use super::lexer::{Parameters, ValueMode, read_field_name, read_value};
use crate::rfc::ical::core::{Component, Property, names};

/// Default read buffer for [`DeserializerBuilder::build_read`].
pub const DEFAULT_BUFFER_CAPACITY: usize = 8192;

/// Reads whole properties, one content line at a time.
struct PropertyReader<S> {
    cursor: Cursor<S>,
    dispatcher: Dispatcher,
}

impl<S: CharSource> PropertyReader<S> {
    /// Reads the next property and the line it started on, or `None` at the
    /// end of the stream.
    ///
    /// The property frame stays on the context when an error is returned, so
    /// the error can be attributed to it.
    fn read_property(&mut self, ctx: &mut ParseContext) -> ParseResult<Option<(Property, usize)>> {
        if self.cursor.is_at_end()? {
            return Ok(None);
        }
        let line = self.cursor.line();

        let (name, has_params) = read_field_name(&mut self.cursor)?;
        let mut property = Property::new(name);
        ctx.push(Frame::Property(PropertyFrame::new(property.name.clone())));

        if has_params {
            for param in Parameters::new(&mut self.cursor, ctx) {
                property.add_param(param?);
            }
        }

        let raw = read_value(&mut self.cursor, ValueMode::for_property(&property))?;
        self.dispatcher.apply(&mut property, raw, ctx, line);
        ctx.pop();

        tracing::trace!(
            line,
            name = %property.name,
            params = property.params.len(),
            values = property.values.len(),
            "property read"
        );
        Ok(Some((property, line)))
    }
}

/// Lazily deserializes top-level components from a character stream.
///
/// Each call to [`Iterator::next`] reads properties only until the next
/// top-level component closes. Nested components are attached to their
/// parent and never yielded on their own. The first error is yielded once,
/// after which the iterator is exhausted.
pub struct CalendarDeserializer<S> {
    reader: PropertyReader<S>,
    ctx: ParseContext,
    factory: Box<dyn ComponentFactory>,
    hooks: Box<dyn ComponentHooks>,
    max_depth: Option<usize>,
    current: Option<Component>,
    ancestors: Vec<Option<Component>>,
    finished: bool,
}

impl<'a> CalendarDeserializer<StrSource<'a>> {
    /// Deserializes from in-memory text with the default collaborators.
    #[must_use]
    pub fn from_text(input: &'a str) -> Self {
        DeserializerBuilder::new().build_text(input)
    }

    /// Starts configuring a deserializer for any kind of source.
    #[must_use]
    pub fn builder() -> DeserializerBuilder {
        DeserializerBuilder::new()
    }
}

impl<R: BufRead> CalendarDeserializer<ReaderSource<R>> {
    /// Deserializes from a buffered reader with the default collaborators.
    #[must_use]
    pub fn from_reader(reader: R) -> Self {
        DeserializerBuilder::new().build_reader(reader)
    }
}

impl<S: CharSource> CalendarDeserializer<S> {
    /// Current line of the underlying cursor.
    #[must_use]
    pub fn line(&self) -> usize {
        self.reader.cursor.line()
    }

    fn advance(&mut self) -> ParseResult<Option<Component>> {
        loop {
            let Some((property, line)) = self.reader.read_property(&mut self.ctx)? else {
                return match &self.current {
                    Some(open) => Err(ParseError::new(ParseErrorKind::MissingEnd, self.line())
                        .with_context(format!("no END:{}", open.name))),
                    None => Ok(None),
                };
            };

            if !property.is_structural() {
                match self.current.as_mut() {
                    Some(component) => component.add_property(property),
                    None => {
                        return Err(ParseError::new(ParseErrorKind::MissingBegin, line)
                            .with_context(format!("{} outside of any component", property.name)));
                    }
                }
            } else if property.name == names::BEGIN {
                self.begin(&property.raw_value, line)?;
            } else if let Some(done) = self.end(&property.raw_value, line)? {
                return Ok(Some(done));
            }
        }
    }

    fn begin(&mut self, name: &str, line: usize) -> ParseResult<()> {
        if name.is_empty() {
            return Err(ParseError::new(ParseErrorKind::InvalidValue, line)
                .with_context("BEGIN without a component name"));
        }
        let depth = self.ctx.component_depth() + 1;
        if self.max_depth.is_some_and(|max| depth > max) {
            return Err(ParseError::new(ParseErrorKind::NestingTooDeep, line)
                .with_context(format!("BEGIN:{name} at depth {depth}")));
        }

        let mut component = self.factory.build(name);
        self.hooks.on_deserializing(&mut component);
        self.ctx.push(Frame::Component(component.name.clone()));
        self.ancestors.push(self.current.replace(component));
        Ok(())
    }

    fn end(&mut self, name: &str, line: usize) -> ParseResult<Option<Component>> {
        let Some(mut component) = self.current.take() else {
            return Err(ParseError::new(ParseErrorKind::MissingBegin, line)
                .with_context(format!("END:{name} with no open component")));
        };
        if !component.name.eq_ignore_ascii_case(name) {
            let err = ParseError::new(ParseErrorKind::MismatchedEnd, line).with_context(format!(
                "expected END:{}, found END:{name}",
                component.name
            ));
            self.current = Some(component);
            return Err(err);
        }

        self.hooks.on_deserialized(&mut component);
        self.ctx.pop();
        self.current = self.ancestors.pop().flatten();

        match self.current.as_mut() {
            Some(parent) => {
                parent.add_child(component);
                Ok(None)
            }
            None => {
                tracing::debug!(
                    name = %component.name,
                    properties = component.properties.len(),
                    components = component.subtree_len(),
                    "component deserialized"
                );
                Ok(Some(component))
            }
        }
    }
}

impl<S: CharSource> Iterator for CalendarDeserializer<S> {
    type Item = ParseResult<Component>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.advance() {
            Ok(Some(component)) => Some(Ok(component)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(err) => {
                self.finished = true;
                let err = err.at_path(&self.ctx.path());
                if err.is_structural() {
                    tracing::warn!(line = err.line, error = %err, "calendar structure is invalid");
                }
                Some(Err(err))
            }
        }
    }
}

impl<S: CharSource> std::iter::FusedIterator for CalendarDeserializer<S> {}

/// Configures collaborators and limits for a [`CalendarDeserializer`].
pub struct DeserializerBuilder {
    type_mapper: Box<dyn TypeMapper>,
    serializer_factory: Box<dyn SerializerFactory>,
    component_factory: Box<dyn ComponentFactory>,
    hooks: Box<dyn ComponentHooks>,
    max_depth: Option<usize>,
    buffer_capacity: usize,
}

impl Default for DeserializerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DeserializerBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            type_mapper: Box::new(DataTypeMapper),
            serializer_factory: Box::new(DefaultSerializerFactory),
            component_factory: Box::new(ComponentRegistry::default()),
            hooks: Box::new(NoopHooks),
            max_depth: None,
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
        }
    }

    /// Applies the `[parser]` settings.
    #[must_use]
    pub fn from_config(config: &ParserConfig) -> Self {
        let mut builder = Self::new().buffer_capacity(config.buffer_capacity);
        builder.max_depth = config.max_depth;
        builder
    }

    #[must_use]
    pub fn type_mapper(mut self, mapper: impl TypeMapper + 'static) -> Self {
        self.type_mapper = Box::new(mapper);
        self
    }

    #[must_use]
    pub fn serializer_factory(mut self, factory: impl SerializerFactory + 'static) -> Self {
        self.serializer_factory = Box::new(factory);
        self
    }

    #[must_use]
    pub fn component_factory(mut self, factory: impl ComponentFactory + 'static) -> Self {
        self.component_factory = Box::new(factory);
        self
    }

    #[must_use]
    pub fn hooks(mut self, hooks: impl ComponentHooks + 'static) -> Self {
        self.hooks = Box::new(hooks);
        self
    }

    /// Limits how deeply components may nest; a top-level component has
    /// depth 1.
    #[must_use]
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    /// Buffer size used by [`Self::build_read`].
    #[must_use]
    pub fn buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity.max(1);
        self
    }

    #[must_use]
    pub fn build_text(self, input: &str) -> CalendarDeserializer<StrSource<'_>> {
        self.build(StrSource::new(input))
    }

    #[must_use]
    pub fn build_reader<R: BufRead>(self, reader: R) -> CalendarDeserializer<ReaderSource<R>> {
        self.build(ReaderSource::new(reader))
    }

    /// Wraps an unbuffered reader with the configured buffer capacity.
    #[must_use]
    pub fn build_read<R: Read>(self, reader: R) -> CalendarDeserializer<ReaderSource<BufReader<R>>> {
        let reader = BufReader::with_capacity(self.buffer_capacity, reader);
        self.build_reader(reader)
    }

    fn build<S: CharSource>(self, source: S) -> CalendarDeserializer<S> {
        CalendarDeserializer {
            reader: PropertyReader {
                cursor: Cursor::new(source),
                dispatcher: Dispatcher::new(self.type_mapper, self.serializer_factory),
            },
            ctx: ParseContext::new(),
            factory: self.component_factory,
            hooks: self.hooks,
            max_depth: self.max_depth,
            current: None,
            ancestors: Vec::new(),
            finished: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rfc::ical::core::{ComponentKind, Value};

    #[test_log::test]
    fn nested_components_attach_to_parent() {
        let input = "BEGIN:VCALENDAR\r\n\
                     VERSION:2.0\r\n\
                     BEGIN:VEVENT\r\n\
                     UID:1\r\n\
                     BEGIN:VALARM\r\n\
                     ACTION:DISPLAY\r\n\
                     END:VALARM\r\n\
                     END:VEVENT\r\n\
                     END:VCALENDAR\r\n";
        let mut components = CalendarDeserializer::from_text(input);

        let calendar = components.next().unwrap().unwrap();
        assert_eq!(calendar.kind, ComponentKind::Calendar);
        assert_eq!(calendar.properties.len(), 1);
        let event = calendar.events()[0];
        assert_eq!(event.uid(), Some("1"));
        assert_eq!(event.alarms().len(), 1);
        assert!(components.next().is_none());
    }

    #[test_log::test]
    fn structural_errors_report_starting_line() {
        let input = "BEGIN:VCALENDAR\r\nBEGIN:VEVENT\r\nEND:VTODO\r\n";
        let err = CalendarDeserializer::from_text(input)
            .next()
            .unwrap()
            .unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::MismatchedEnd);
        assert_eq!(err.line, 3);
        assert_eq!(
            err.context.as_deref(),
            Some("VCALENDAR > VEVENT: expected END:VEVENT, found END:VTODO")
        );
    }

    #[test_log::test]
    fn end_without_begin() {
        let err = CalendarDeserializer::from_text("END:VEVENT\r\n")
            .next()
            .unwrap()
            .unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::MissingBegin);
        assert_eq!(err.line, 1);
    }

    #[test_log::test]
    fn open_component_at_end_of_stream() {
        let err = CalendarDeserializer::from_text("BEGIN:VCALENDAR\r\nVERSION:2.0\r\n")
            .next()
            .unwrap()
            .unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::MissingEnd);
        assert_eq!(err.context.as_deref(), Some("VCALENDAR: no END:VCALENDAR"));
    }

    #[test_log::test]
    fn lexer_errors_carry_property_path() {
        let input = "BEGIN:VEVENT\r\nDTSTART;TZID=Europe/Rome\rX:2026\r\nEND:VEVENT\r\n";
        let err = CalendarDeserializer::from_text(input)
            .next()
            .unwrap()
            .unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnexpectedLineEnding);
        assert_eq!(err.line, 2);
        assert_eq!(err.context.as_deref(), Some("VEVENT > DTSTART;TZID"));
    }

    #[test_log::test]
    fn rejected_value_does_not_stop_the_stream() {
        let input = "BEGIN:VEVENT\r\nDTSTART;TZID=Europe/Rome:2026\r\nEND:VEVENT\r\n";
        let event = CalendarDeserializer::from_text(input)
            .next()
            .unwrap()
            .unwrap();
        let dtstart = event.get_property("DTSTART").unwrap();
        assert_eq!(dtstart.raw_value, "2026");
        assert_eq!(dtstart.values, [Value::Unknown("2026".into())]);
    }

    #[test_log::test]
    fn max_depth_limits_nesting() {
        let input = "BEGIN:VCALENDAR\r\nBEGIN:VEVENT\r\nEND:VEVENT\r\nEND:VCALENDAR\r\n";

        let err = CalendarDeserializer::builder()
            .max_depth(1)
            .build_text(input)
            .next()
            .unwrap()
            .unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::NestingTooDeep);
        assert_eq!(err.line, 2);

        let ok = CalendarDeserializer::builder()
            .max_depth(2)
            .build_text(input)
            .next()
            .unwrap();
        assert!(ok.is_ok());
    }

    #[test_log::test]
    fn config_applies_parser_settings() {
        let config = ParserConfig {
            max_depth: Some(1),
            buffer_capacity: 16,
        };
        let input = "BEGIN:VCALENDAR\r\nBEGIN:VTODO\r\nEND:VTODO\r\nEND:VCALENDAR\r\n";
        let err = DeserializerBuilder::from_config(&config)
            .build_read(input.as_bytes())
            .next()
            .unwrap()
            .unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::NestingTooDeep);
    }

    #[test_log::test]
    fn empty_begin_is_rejected() {
        let err = CalendarDeserializer::from_text("BEGIN:\r\n")
            .next()
            .unwrap()
            .unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidValue);
    }

    #[test_log::test]
    fn empty_input_yields_nothing() {
        assert!(CalendarDeserializer::from_text("").next().is_none());
    }
}
