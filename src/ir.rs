//! Intermediate representation handed to code emission.
//!
//! A `FileDescriptor` is the ordered list of methods declared in one input.
//! Each method embeds full copies of its request and response messages, so a
//! consumer never needs the registry the parser used to resolve them.
//!
//! Serialized with serde, the IR takes the nested map shape
//! `[{Method: {"request": {Req: {field: type}}, "response": {Resp: {...}}}}]`.

use std::collections::HashMap;

use indexmap::map::{Entry, IndexMap};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

/// A single `name: type` entry of a message body. The type expression is kept
/// as written; interpreting it is left to the consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    pub type_expr: String,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, type_expr: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_expr: type_expr.into(),
        }
    }
}

/// Fields of a message in declaration order, indexed by name.
#[derive(Debug, Clone, Default)]
pub struct MessageDescriptor {
    fields: IndexMap<String, FieldDescriptor>,
}

impl MessageDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field. Re-inserting a name replaces its type but keeps its slot.
    pub fn insert(&mut self, name: impl Into<String>, type_expr: impl Into<String>) {
        let type_expr = type_expr.into();
        match self.fields.entry(name.into()) {
            Entry::Occupied(mut entry) => entry.get_mut().type_expr = type_expr,
            Entry::Vacant(entry) => {
                let name = entry.key().clone();
                entry.insert(FieldDescriptor { name, type_expr });
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(|field| field.type_expr.as_str())
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.values()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .values()
            .map(|field| (field.name.as_str(), field.type_expr.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

// `IndexMap` equality ignores order; two bodies are equal only field by field.
impl PartialEq for MessageDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.fields.len() == other.fields.len() && self.fields.values().eq(other.fields.values())
    }
}

impl Eq for MessageDescriptor {}

impl<N, T> FromIterator<(N, T)> for MessageDescriptor
where
    N: Into<String>,
    T: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (N, T)>>(iter: I) -> Self {
        let mut descriptor = MessageDescriptor::new();
        for (name, type_expr) in iter {
            descriptor.insert(name, type_expr);
        }
        descriptor
    }
}

impl Serialize for MessageDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for field in self.fields.values() {
            map.serialize_entry(&field.name, &field.type_expr)?;
        }
        map.end()
    }
}

/// A message referenced by a method, by name and with its resolved body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRef {
    pub name: String,
    pub descriptor: MessageDescriptor,
}

impl Serialize for MessageRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.name, &self.descriptor)?;
        map.end()
    }
}

/// One `method Name(Req) -> Resp;` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    pub name: String,
    pub request: MessageRef,
    pub response: MessageRef,
}

#[derive(Serialize)]
struct Signature<'a> {
    request: &'a MessageRef,
    response: &'a MessageRef,
}

impl Serialize for MethodDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(
            &self.name,
            &Signature {
                request: &self.request,
                response: &self.response,
            },
        )?;
        map.end()
    }
}

/// The ordered methods of one parsed input.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FileDescriptor {
    methods: Vec<MethodDescriptor>,
}

impl FileDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, method: MethodDescriptor) {
        self.methods.push(method);
    }

    pub fn methods(&self) -> &[MethodDescriptor] {
        &self.methods
    }

    pub fn get(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods.iter().find(|method| method.name == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MethodDescriptor> {
        self.methods.iter()
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

impl<'a> IntoIterator for &'a FileDescriptor {
    type Item = &'a MethodDescriptor;
    type IntoIter = std::slice::Iter<'a, MethodDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.methods.iter()
    }
}

impl Serialize for FileDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.methods.len()))?;
        for method in &self.methods {
            seq.serialize_element(method)?;
        }
        seq.end()
    }
}

/// Messages declared so far in one parse, by name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MessageRegistry {
    messages: HashMap<String, MessageDescriptor>,
}

impl MessageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a message, returning the body it replaced, if any.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        descriptor: MessageDescriptor,
    ) -> Option<MessageDescriptor> {
        self.messages.insert(name.into(), descriptor)
    }

    pub fn get(&self, name: &str) -> Option<&MessageDescriptor> {
        self.messages.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.messages.contains_key(name)
    }

    /// Resolve `name` into a reference carrying a copy of its body.
    pub fn resolve(&self, name: &str) -> Option<MessageRef> {
        self.get(name).map(|descriptor| MessageRef {
            name: name.to_string(),
            descriptor: descriptor.clone(),
        })
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
