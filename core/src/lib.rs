pub mod compile;
pub mod describe;
pub mod error;
pub mod field;
pub mod schema;
pub mod ser;
pub mod serializer;
pub mod settings;
pub mod value;

#[cfg(test)]
mod tests;

pub use crate::{
    compile::{CompiledField, Getter},
    describe::{describe, Description, DescriptionProperties, ReturnType, SchemaKind},
    error::{Error, Result},
    field::{Field, FieldType},
    schema::{Method, Schema, SchemaBuilder, SourceAccess},
    ser::object::serialize as to_object,
    serializer::{Serializer, SerializerOptions},
    settings::Settings,
    value::{
        object::{AsObject, Attributes, Number, Object, Sequence},
        primitive::Primitive,
    },
};
#[cfg(feature = "derive")]
pub use serde_projection_derive::Attributes;
