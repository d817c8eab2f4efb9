use crate::{
    error::*,
    field::Field,
    schema::Schema,
    serializer::Serializer,
    value::{object::Object, primitive::Primitive},
};
use std::{fmt, sync::Arc};

pub type GetterFn = Arc<dyn Fn(&Object) -> Result<Object> + Send + Sync>;
pub type TransformFn = Arc<dyn Fn(Object) -> Result<Primitive> + Send + Sync>;
pub type MethodFn = Arc<dyn Fn(&Serializer, &Object) -> Result<Object> + Send + Sync>;

/// Extracts the raw value of a field from a source.
#[derive(Clone)]
pub enum Getter {
    /// Attribute path, segments separated with dots.
    Attribute(String),
    Item(String),
    Custom(GetterFn),
    /// Schema method called with the serializer and the source.
    Method(MethodFn),
}

impl Getter {
    pub fn get(&self, serializer: &Serializer, instance: &Object) -> Result<Object> {
        match self {
            Self::Attribute(path) => {
                let mut segments = path.split('.');
                let mut value = attribute(instance, segments.next().unwrap_or_default())?;
                for segment in segments {
                    value = attribute(&value, segment)?;
                }
                Ok(value)
            }
            Self::Item(key) => match instance {
                Object::Map(_) => instance
                    .get_key(key)
                    .cloned()
                    .ok_or_else(|| Error::MissingKey(key.to_owned())),
                _ => Err(Error::Coercion {
                    expected: "map",
                    found: instance.type_name(),
                }),
            },
            Self::Custom(getter) => getter(instance),
            Self::Method(method) => method(serializer, instance),
        }
    }
}

fn attribute(instance: &Object, name: &str) -> Result<Object> {
    instance
        .get_attribute(name)
        .ok_or_else(|| Error::MissingAttribute(name.to_owned()))
}

impl fmt::Debug for Getter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attribute(path) => f.debug_tuple("Attribute").field(path).finish(),
            Self::Item(key) => f.debug_tuple("Item").field(key).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
            Self::Method(_) => f.write_str("Method(..)"),
        }
    }
}

/// Non-identity transform of a compiled field.
#[derive(Debug, Clone)]
pub struct Transform(Field);

impl Transform {
    pub fn apply(&self, value: Object) -> Result<Primitive> {
        self.0.to_value(value)
    }
}

/// Flat execution unit derived from a declared field.
#[derive(Debug, Clone)]
pub struct CompiledField {
    /// Output key.
    pub name: String,
    pub getter: Getter,
    /// `None` when the field passes values through unchanged.
    pub transform: Option<Transform>,
    pub call: bool,
    pub required: bool,
    pub getter_takes_serializer: bool,
}

pub fn compile(name: &str, field: &Field, schema: &Schema) -> Result<CompiledField> {
    let getter = match field.as_getter(name, schema)? {
        Some(getter) => getter,
        None => schema.default_getter(field.source_attr().unwrap_or(name)),
    };
    let transform = field
        .is_to_value_overridden()
        .then(|| Transform(field.clone()));
    Ok(CompiledField {
        name: field.output_label().unwrap_or(name).to_owned(),
        getter,
        transform,
        call: field.invokes_result(),
        required: field.is_required(),
        getter_takes_serializer: field.getter_takes_serializer(),
    })
}
