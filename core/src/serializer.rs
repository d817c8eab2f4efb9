use crate::{
    compile::CompiledField,
    error::*,
    schema::Schema,
    value::{
        object::{set_entry, Object},
        primitive::Primitive,
    },
};
use once_cell::unsync::OnceCell;
use std::{fmt, sync::Arc};

/// Arguments of [`Serializer::with_options`].
#[derive(Debug, Default, Clone)]
pub struct SerializerOptions {
    pub instance: Object,
    pub many: bool,
    /// Raw input to validate. Serializers are output only, so any value here
    /// is rejected.
    pub data: Option<Object>,
    pub context: Option<Object>,
}

/// Binds a schema to one source value, or to a collection of them in `many`
/// mode.
///
/// Output is computed on first access of [`Serializer::data`] and kept for
/// the lifetime of the serializer.
///
/// # Example
/// ```rust
/// use serde_projection::{Field, Object, SchemaBuilder, Serializer};
///
/// let schema = SchemaBuilder::mapping("Foo")
///     .field("foo", Field::str())
///     .build()
///     .unwrap();
/// let serializer = Serializer::new(schema, Object::map().property("foo", "bar"));
/// let data = serializer.data().unwrap();
/// assert_eq!(data.get("foo").and_then(|v| v.as_str()), Some("bar"));
/// ```
pub struct Serializer {
    schema: Arc<Schema>,
    instance: Object,
    many: bool,
    context: Option<Object>,
    data: OnceCell<Primitive>,
}

impl Serializer {
    pub fn new(schema: Arc<Schema>, instance: impl Into<Object>) -> Self {
        Self {
            schema,
            instance: instance.into(),
            many: false,
            context: None,
            data: OnceCell::new(),
        }
    }

    pub fn with_options(schema: Arc<Schema>, options: SerializerOptions) -> Result<Self> {
        if options.data.is_some() {
            tracing::debug!(schema = %schema.name(), "rejected serializer with input data");
            return Err(Error::InputValidationUnsupported);
        }
        let mut result = Self::new(schema, options.instance).many(options.many);
        result.context = options.context;
        Ok(result)
    }

    pub fn many(mut self, value: bool) -> Self {
        self.many = value;
        self
    }

    pub fn with_context(mut self, context: impl Into<Object>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn instance(&self) -> &Object {
        &self.instance
    }

    pub fn is_many(&self) -> bool {
        self.many
    }

    /// Free-form value passed by the caller, readable by schema methods.
    pub fn context(&self) -> Option<&Object> {
        self.context.as_ref()
    }

    /// Serialized output, computed once and cached.
    pub fn data(&self) -> Result<&Primitive> {
        self.data.get_or_try_init(|| self.to_value(&self.instance))
    }

    /// Consumes the serializer, returning the cached output or computing it.
    pub fn into_data(mut self) -> Result<Primitive> {
        match self.data.take() {
            Some(data) => Ok(data),
            None => self.to_value(&self.instance),
        }
    }

    pub fn to_value(&self, instance: &Object) -> Result<Primitive> {
        let fields = self.schema.compiled_fields();
        if self.many {
            tracing::trace!(schema = %self.schema.name(), "serializing many");
            instance
                .iter_stream()?
                .map(|item| self.serialize_one(&item, fields))
                .collect::<Result<Vec<_>>>()
                .map(Primitive::Array)
        } else {
            tracing::trace!(schema = %self.schema.name(), "serializing one");
            self.serialize_one(instance, fields)
        }
    }

    fn serialize_one(&self, instance: &Object, fields: &[CompiledField]) -> Result<Primitive> {
        let mut result = Vec::with_capacity(fields.len());
        for field in fields {
            let value = if field.getter_takes_serializer {
                field.getter.get(self, instance)?.into_primitive()?
            } else {
                let value = match field.getter.get(self, instance) {
                    Ok(value) => value,
                    Err(error) if error.is_missing() && !field.required => {
                        tracing::trace!(field = %field.name, "skipped missing optional field");
                        continue;
                    }
                    Err(error) => return Err(error),
                };
                if field.required || !value.is_null() {
                    let value = if field.call {
                        invoke(&field.name, value)?
                    } else {
                        value
                    };
                    match &field.transform {
                        Some(transform) => transform.apply(value)?,
                        None => value.into_primitive()?,
                    }
                } else {
                    Primitive::Null
                }
            };
            set_entry(&mut result, field.name.clone(), value);
        }
        Ok(Primitive::Map(result))
    }
}

fn invoke(name: &str, value: Object) -> Result<Object> {
    match value {
        Object::Callable(f) => f(),
        _ => Err(Error::NotCallable(name.to_owned())),
    }
}

impl fmt::Debug for Serializer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Serializer")
            .field("schema", &self.schema.name())
            .field("instance", &self.instance)
            .field("many", &self.many)
            .field("context", &self.context)
            .field("data", &self.data.get())
            .finish()
    }
}
