use serde_json::{Map, Number, Value};
use tracing::trace;
use weft_core::{CodecError, Sink, TypeDescriptor};

#[derive(Debug)]
enum Frame {
    Array(Vec<Value>),
    Object {
        entries: Map<String, Value>,
        /// Label of the field currently open in this object.
        field: Option<String>,
    },
    Tagged {
        tag: String,
        value: Option<Value>,
    },
}

/// Builds a JSON document from protocol calls.
///
/// Records become objects keyed by label, containers become arrays, and a
/// field whose static type is open becomes `{ "<runtime type>": <value> }`.
#[derive(Debug, Default)]
pub struct JsonSink {
    stack: Vec<Frame>,
    root: Option<Value>,
}

impl JsonSink {
    /// An empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// The finished document. Fails if a block is still open or nothing was
    /// written.
    pub fn into_value(self) -> Result<Value, CodecError> {
        if !self.stack.is_empty() {
            return Err(CodecError::protocol(
                "a closed document",
                format!("{} open blocks", self.stack.len()),
            ));
        }
        self.root
            .ok_or_else(|| CodecError::protocol("a value", "an empty document"))
    }

    fn place(&mut self, label: &str, value: Value) -> Result<(), CodecError> {
        match self.stack.last_mut() {
            None if self.root.is_none() => self.root = Some(value),
            None => return Err(CodecError::protocol("end of document", value)),
            Some(Frame::Array(items)) => items.push(value),
            Some(Frame::Object { entries, field }) => {
                let key = field.clone().unwrap_or_else(|| label.to_owned());
                entries.insert(key, value);
            }
            Some(Frame::Tagged { tag, value: slot }) => {
                if slot.is_some() {
                    return Err(CodecError::protocol(format!("end of `{tag}`"), value));
                }
                *slot = Some(value);
            }
        }
        Ok(())
    }

    fn number(
        &mut self,
        label: &str,
        number: Option<Number>,
        shown: f64,
    ) -> Result<(), CodecError> {
        let number = number.ok_or_else(|| {
            CodecError::backend(format!("{label}: {shown} has no JSON representation"))
        })?;
        self.place(label, Value::Number(number))
    }
}

impl Sink for JsonSink {
    fn begin(&mut self, ty: &TypeDescriptor) -> Result<(), CodecError> {
        trace!(%ty, depth = self.stack.len(), "begin");
        self.stack.push(if ty.is_collection() {
            Frame::Array(Vec::new())
        } else {
            Frame::Object {
                entries: Map::new(),
                field: None,
            }
        });
        Ok(())
    }

    fn end(&mut self, ty: &TypeDescriptor) -> Result<(), CodecError> {
        let value = match self.stack.pop() {
            Some(Frame::Array(items)) => Value::Array(items),
            Some(Frame::Object { entries, .. }) => Value::Object(entries),
            _ => return Err(CodecError::protocol(format!("an open block of {ty}"), "none")),
        };
        self.place("", value)
    }

    fn begin_nested(
        &mut self,
        label: &str,
        ty: &TypeDescriptor,
        actual: &TypeDescriptor,
    ) -> Result<(), CodecError> {
        if let Some(Frame::Object { field, .. }) = self.stack.last_mut() {
            *field = Some(label.to_owned());
        }
        if !ty.is_terminal() {
            trace!(label, %actual, "tagged field");
            self.stack.push(Frame::Tagged {
                tag: actual.to_string(),
                value: None,
            });
        }
        Ok(())
    }

    fn end_nested(&mut self, label: &str, ty: &TypeDescriptor) -> Result<(), CodecError> {
        if !ty.is_terminal() {
            let (tag, value) = match self.stack.pop() {
                Some(Frame::Tagged {
                    tag,
                    value: Some(value),
                }) => (tag, value),
                _ => {
                    return Err(CodecError::protocol(
                        format!("the tagged value of {label}"),
                        "nothing",
                    ));
                }
            };
            let mut wrapper = Map::new();
            wrapper.insert(tag, value);
            self.place(label, Value::Object(wrapper))?;
        }
        if let Some(Frame::Object { field, .. }) = self.stack.last_mut() {
            *field = None;
        }
        Ok(())
    }

    fn put_null(&mut self, label: &str, is_null: bool) -> Result<(), CodecError> {
        if is_null {
            self.place(label, Value::Null)?;
        }
        Ok(())
    }

    fn put_bool(&mut self, label: &str, value: bool) -> Result<(), CodecError> {
        self.place(label, Value::Bool(value))
    }

    fn put_i8(&mut self, label: &str, value: i8) -> Result<(), CodecError> {
        self.place(label, Value::from(value))
    }

    fn put_i16(&mut self, label: &str, value: i16) -> Result<(), CodecError> {
        self.place(label, Value::from(value))
    }

    fn put_i32(&mut self, label: &str, value: i32) -> Result<(), CodecError> {
        self.place(label, Value::from(value))
    }

    fn put_i64(&mut self, label: &str, value: i64) -> Result<(), CodecError> {
        self.place(label, Value::from(value))
    }

    fn put_f32(&mut self, label: &str, value: f32) -> Result<(), CodecError> {
        let value = f64::from(value);
        self.number(label, Number::from_f64(value), value)
    }

    fn put_f64(&mut self, label: &str, value: f64) -> Result<(), CodecError> {
        self.number(label, Number::from_f64(value), value)
    }

    fn put_char(&mut self, label: &str, value: char) -> Result<(), CodecError> {
        self.place(label, Value::String(value.to_string()))
    }

    fn put_unit(&mut self, label: &str) -> Result<(), CodecError> {
        self.place(label, Value::Null)
    }

    fn put_str(&mut self, label: &str, value: &str) -> Result<(), CodecError> {
        self.place(label, Value::String(value.to_owned()))
    }
}
