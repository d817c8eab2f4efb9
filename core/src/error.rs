use crate::field::FieldType;
use std::fmt::Display;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Message(String),
    #[error("missing attribute `{0}`")]
    MissingAttribute(String),
    #[error("missing key `{0}`")]
    MissingKey(String),
    #[error("value of `{0}` is not callable")]
    NotCallable(String),
    #[error("cannot iterate over {0} value")]
    NotIterable(&'static str),
    #[error("cannot convert {found} value into {expected}")]
    Coercion {
        expected: &'static str,
        found: &'static str,
    },
    #[error("{0} value has no primitive representation")]
    Unrepresentable(&'static str),
    #[error("invalid image url `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("invalid date format `{0}`")]
    InvalidDateFormat(String),
    #[error("method `{method}` not found on schema `{schema}`")]
    MethodNotFound { schema: String, method: String },
    #[error("list element type `{0:?}` doesn't have a declared schema type")]
    ListElementUndocumented(FieldType),
    #[error("field type `{0:?}` doesn't take a date format")]
    DateFormatUnsupported(FieldType),
    #[error("method fields take their schema type from the method return type")]
    MethodSchemaType,
    #[error("method backing field `{field}` of schema `{schema}` has no declared return type")]
    MissingReturnType { schema: String, field: String },
    #[error("serializers do not support input validation")]
    InputValidationUnsupported,
}

impl Error {
    pub fn custom<T: Display>(msg: T) -> Self {
        Error::Message(msg.to_string())
    }

    /// Tells if this error means the looked up attribute or key is absent.
    pub fn is_missing(&self) -> bool {
        matches!(self, Error::MissingAttribute(_) | Error::MissingKey(_))
    }
}

impl serde::ser::Error for Error {
    fn custom<T: Display>(msg: T) -> Self {
        Error::Message(msg.to_string())
    }
}
