use std::collections::{HashMap, VecDeque};

use serde_json::{Map, Value};
use tracing::trace;
use weft_core::{CodecError, Nested, Source, TypeDescriptor};

/// Entries of one object, taken by label in any order.
#[derive(Debug)]
struct Fields {
    entries: Vec<(String, Option<Value>)>,
    cursor: usize,
    /// Position of every entry the cursor has passed.
    seen: HashMap<String, usize>,
}

impl Fields {
    fn new(map: Map<String, Value>) -> Self {
        Self {
            entries: map.into_iter().map(|(key, value)| (key, Some(value))).collect(),
            cursor: 0,
            seen: HashMap::new(),
        }
    }

    fn locate(&mut self, label: &str) -> Option<usize> {
        if let Some(&index) = self.seen.get(label) {
            return Some(index);
        }
        while let Some((key, _)) = self.entries.get(self.cursor) {
            let index = self.cursor;
            self.cursor += 1;
            self.seen.insert(key.clone(), index);
            if key == label {
                return Some(index);
            }
            trace!(label, passed = %key, "caching out-of-order field");
        }
        None
    }

    fn peek(&mut self, label: &str) -> Option<&Value> {
        let index = self.locate(label)?;
        self.entries[index].1.as_ref()
    }

    fn take(&mut self, label: &str) -> Option<Value> {
        let index = self.locate(label)?;
        self.seen.remove(label);
        self.entries[index].1.take()
    }

    fn is_done(&self) -> bool {
        self.entries.iter().all(|(_, value)| value.is_none())
    }
}

#[derive(Debug)]
enum Scope {
    Array(VecDeque<Value>),
    Object(Fields),
}

/// Reads protocol calls back from a JSON document.
///
/// Object fields are addressed by label and may appear in any order; fields
/// skipped while looking for another label are remembered per object. A
/// nullable field must still be present, as `null` when it has no value.
#[derive(Debug)]
pub struct JsonSource {
    stack: Vec<Scope>,
    /// The value of the field entered last, not yet consumed.
    pending: Option<Value>,
}

impl JsonSource {
    /// Reads from an already parsed document.
    pub fn new(document: Value) -> Self {
        Self {
            stack: Vec::new(),
            pending: Some(document),
        }
    }

    /// Parses `text` as one JSON document.
    pub fn parse(text: &str) -> Result<Self, CodecError> {
        let document = serde_json::from_str(text)
            .map_err(|error| CodecError::backend(format!("malformed JSON: {error}")))?;
        Ok(Self::new(document))
    }

    fn take(&mut self, label: &str) -> Result<Value, CodecError> {
        if let Some(value) = self.pending.take() {
            return Ok(value);
        }
        match self.stack.last_mut() {
            Some(Scope::Array(items)) => items
                .pop_front()
                .ok_or_else(|| CodecError::protocol("another element", "end of array")),
            Some(Scope::Object(fields)) => {
                fields.take(label).ok_or_else(|| CodecError::MissingField {
                    label: label.to_owned(),
                })
            }
            None => Err(CodecError::protocol("a value", "end of document")),
        }
    }

    fn integer<T: TryFrom<i64>>(
        &mut self,
        label: &str,
        expected: &'static str,
    ) -> Result<T, CodecError> {
        let value = self.take(label)?;
        let wide = value
            .as_i64()
            .ok_or_else(|| CodecError::protocol(expected, &value))?;
        T::try_from(wide).map_err(|_| {
            CodecError::backend(format!("{label}: {wide} is out of range for {expected}"))
        })
    }

    fn float(&mut self, label: &str, expected: &'static str) -> Result<f64, CodecError> {
        let value = self.take(label)?;
        value
            .as_f64()
            .ok_or_else(|| CodecError::protocol(expected, &value))
    }

    fn text(&mut self, label: &str, expected: &'static str) -> Result<String, CodecError> {
        match self.take(label)? {
            Value::String(text) => Ok(text),
            other => Err(CodecError::protocol(expected, other)),
        }
    }
}

impl Source for JsonSource {
    fn begin(&mut self, ty: &TypeDescriptor) -> Result<(), CodecError> {
        let value = self
            .pending
            .take()
            .ok_or_else(|| CodecError::protocol(format!("a value of {ty}"), "no open field"))?;
        let scope = match value {
            Value::Array(items) if ty.is_collection() => Scope::Array(items.into()),
            Value::Object(map) if !ty.is_collection() => Scope::Object(Fields::new(map)),
            other if ty.is_collection() => return Err(CodecError::protocol("an array", other)),
            other => return Err(CodecError::protocol("an object", other)),
        };
        trace!(%ty, depth = self.stack.len(), "begin");
        self.stack.push(scope);
        Ok(())
    }

    fn is_end(&mut self) -> Result<bool, CodecError> {
        match self.stack.last() {
            Some(Scope::Array(items)) => Ok(items.is_empty()),
            Some(Scope::Object(fields)) => Ok(fields.is_done()),
            None => Err(CodecError::protocol("an open block", "end of document")),
        }
    }

    fn end(&mut self, ty: &TypeDescriptor) -> Result<(), CodecError> {
        self.stack
            .pop()
            .map(drop)
            .ok_or_else(|| CodecError::protocol(format!("an open block of {ty}"), "none"))
    }

    fn begin_nested(&mut self, label: &str, ty: &TypeDescriptor) -> Result<Nested, CodecError> {
        let value = self.take(label)?;
        if ty.is_terminal() {
            self.pending = Some(value);
            return Ok(Nested::Nest);
        }
        let entry = match value {
            Value::Object(wrapper) if wrapper.len() == 1 => wrapper.into_iter().next(),
            other => {
                return Err(CodecError::protocol(
                    format!("a single-key type wrapper for {label}"),
                    other,
                ));
            }
        };
        let Some((tag, inner)) = entry else {
            return Err(CodecError::protocol("a type wrapper", "an empty object"));
        };
        let actual = TypeDescriptor::parse(&tag)?;
        trace!(label, %ty, %actual, "tagged field");
        self.pending = Some(inner);
        Ok(Nested::Substitute(actual))
    }

    fn end_nested(&mut self, _label: &str, _ty: &TypeDescriptor) -> Result<(), CodecError> {
        self.pending = None;
        Ok(())
    }

    fn is_null(&mut self, label: &str) -> Result<bool, CodecError> {
        if let Some(value) = &self.pending {
            let null = value.is_null();
            if null {
                self.pending = None;
            }
            return Ok(null);
        }
        match self.stack.last_mut() {
            Some(Scope::Array(items)) => {
                let null = items.front().is_some_and(Value::is_null);
                if null {
                    items.pop_front();
                }
                Ok(null)
            }
            Some(Scope::Object(fields)) => match fields.peek(label).map(Value::is_null) {
                None => Err(CodecError::MissingField {
                    label: label.to_owned(),
                }),
                Some(true) => {
                    fields.take(label);
                    Ok(true)
                }
                Some(false) => Ok(false),
            },
            None => Err(CodecError::protocol("a value", "end of document")),
        }
    }

    fn get_bool(&mut self, label: &str) -> Result<bool, CodecError> {
        match self.take(label)? {
            Value::Bool(value) => Ok(value),
            other => Err(CodecError::protocol("Boolean", other)),
        }
    }

    fn get_i8(&mut self, label: &str) -> Result<i8, CodecError> {
        self.integer(label, "Byte")
    }

    fn get_i16(&mut self, label: &str) -> Result<i16, CodecError> {
        self.integer(label, "Short")
    }

    fn get_i32(&mut self, label: &str) -> Result<i32, CodecError> {
        self.integer(label, "Int")
    }

    fn get_i64(&mut self, label: &str) -> Result<i64, CodecError> {
        self.integer(label, "Long")
    }

    fn get_f32(&mut self, label: &str) -> Result<f32, CodecError> {
        Ok(self.float(label, "Float")? as f32)
    }

    fn get_f64(&mut self, label: &str) -> Result<f64, CodecError> {
        self.float(label, "Double")
    }

    fn get_char(&mut self, label: &str) -> Result<char, CodecError> {
        let text = self.text(label, "Char")?;
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(value), None) => Ok(value),
            _ => Err(CodecError::protocol("a single character", format!("{text:?}"))),
        }
    }

    fn get_unit(&mut self, label: &str) -> Result<(), CodecError> {
        match self.take(label)? {
            Value::Null => Ok(()),
            other => Err(CodecError::protocol("Unit", other)),
        }
    }

    fn get_string(&mut self, label: &str) -> Result<String, CodecError> {
        self.text(label, "String")
    }
}
