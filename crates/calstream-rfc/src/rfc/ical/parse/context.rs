//! Parse context threaded through every deserialization step.

use crate::rfc::ical::core::{Parameter, names};

/// The property currently being read, with the parameters seen so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyFrame {
    pub name: String,
    pub params: Vec<Parameter>,
}

impl PropertyFrame {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
        }
    }

    /// Returns the first value of the last parameter with the given name.
    #[must_use]
    pub fn param_value(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .rev()
            .find(|p| p.name.eq_ignore_ascii_case(name))?
            .value()
    }
}

/// One entry on the context stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Component(String),
    Property(PropertyFrame),
    Parameter(String),
}

/// Stack of what is currently being parsed.
///
/// Frames are pushed before and popped after each sub-parse. The stack is
/// used to attribute errors and to let value deserializers see the
/// parameters of the property they are decoding.
#[derive(Debug, Clone, Default)]
pub struct ParseContext {
    frames: Vec<Frame>,
}

impl ParseContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    pub fn pop(&mut self) -> Option<Frame> {
        self.frames.pop()
    }

    #[must_use]
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Innermost property frame.
    #[must_use]
    pub fn current_property(&self) -> Option<&PropertyFrame> {
        self.frames.iter().rev().find_map(|frame| match frame {
            Frame::Property(property) => Some(property),
            _ => None,
        })
    }

    /// Name of the innermost open component.
    #[must_use]
    pub fn current_component(&self) -> Option<&str> {
        self.frames.iter().rev().find_map(|frame| match frame {
            Frame::Component(name) => Some(name.as_str()),
            _ => None,
        })
    }

    /// Number of open components.
    #[must_use]
    pub fn component_depth(&self) -> usize {
        self.frames
            .iter()
            .filter(|frame| matches!(frame, Frame::Component(_)))
            .count()
    }

    /// Records a completed parameter on the innermost property frame.
    pub fn attach_parameter(&mut self, param: Parameter) {
        let property = self.frames.iter_mut().rev().find_map(|frame| match frame {
            Frame::Property(property) => Some(property),
            _ => None,
        });
        if let Some(property) = property {
            property.params.push(param);
        }
    }

    /// TZID of the property being parsed.
    #[must_use]
    pub fn tzid(&self) -> Option<&str> {
        self.current_property()?.param_value(names::TZID)
    }

    /// ENCODING of the property being parsed.
    #[must_use]
    pub fn encoding(&self) -> Option<&str> {
        self.current_property()?.param_value(names::ENCODING)
    }

    /// CHARSET of the property being parsed.
    #[must_use]
    pub fn charset(&self) -> Option<&str> {
        self.current_property()?.param_value(names::CHARSET)
    }

    /// Human-readable location, e.g. `VCALENDAR > VEVENT > ATTENDEE;CN`.
    #[must_use]
    pub fn path(&self) -> String {
        let mut path = String::new();
        for frame in &self.frames {
            match frame {
                Frame::Component(name) | Frame::Property(PropertyFrame { name, .. }) => {
                    if !path.is_empty() {
                        path.push_str(" > ");
                    }
                    path.push_str(name);
                }
                Frame::Parameter(name) => {
                    path.push(';');
                    path.push_str(name);
                }
            }
        }
        path
    }
}
