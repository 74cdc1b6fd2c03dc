//! Component instantiation and lifecycle hooks.

use std::collections::HashMap;

use crate::rfc::ical::core::{Component, ComponentKind};

/// Creates an empty component for a `BEGIN:` name.
pub trait ComponentFactory {
    fn build(&self, name: &str) -> Component;
}

/// Name → constructor table for the RFC 5545 components.
///
/// Unregistered names produce a generic component that keeps its name.
#[derive(Debug, Clone)]
pub struct ComponentRegistry {
    constructors: HashMap<String, fn() -> Component>,
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(ComponentKind::Calendar.as_str(), || {
            Component::new(ComponentKind::Calendar)
        });
        registry.register(ComponentKind::Event.as_str(), || {
            Component::new(ComponentKind::Event)
        });
        registry.register(ComponentKind::Todo.as_str(), || {
            Component::new(ComponentKind::Todo)
        });
        registry.register(ComponentKind::Journal.as_str(), || {
            Component::new(ComponentKind::Journal)
        });
        registry.register(ComponentKind::FreeBusy.as_str(), || {
            Component::new(ComponentKind::FreeBusy)
        });
        registry.register(ComponentKind::Timezone.as_str(), || {
            Component::new(ComponentKind::Timezone)
        });
        registry.register(ComponentKind::Alarm.as_str(), || {
            Component::new(ComponentKind::Alarm)
        });
        registry.register(ComponentKind::Standard.as_str(), || {
            Component::new(ComponentKind::Standard)
        });
        registry.register(ComponentKind::Daylight.as_str(), || {
            Component::new(ComponentKind::Daylight)
        });
        registry
    }
}

impl ComponentRegistry {
    /// A registry with no entries; every name falls back to a generic
    /// component.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    /// Registers (or replaces) the constructor for `name`.
    pub fn register(&mut self, name: &str, constructor: fn() -> Component) {
        self.constructors
            .insert(name.to_ascii_uppercase(), constructor);
    }
}

impl ComponentFactory for ComponentRegistry {
    fn build(&self, name: &str) -> Component {
        match self.constructors.get(&name.to_ascii_uppercase()) {
            Some(constructor) => constructor(),
            None => Component::custom(name),
        }
    }
}

/// Lifecycle callbacks around each component.
///
/// `on_deserializing` runs right after the component is created on `BEGIN`;
/// `on_deserialized` runs on the matching `END`, before the component is
/// attached to its parent or yielded.
pub trait ComponentHooks {
    fn on_deserializing(&self, _component: &mut Component) {}
    fn on_deserialized(&self, _component: &mut Component) {}
}

/// Hooks that do nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHooks;

impl ComponentHooks for NoopHooks {}
