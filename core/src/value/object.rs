use crate::{error::*, value::primitive::Primitive};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use serde::{Serialize, Serializer};
use std::{
    collections::{BTreeMap, HashMap},
    fmt,
    sync::Arc,
};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M:%S%.f";
pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub enum Number {
    SignedInteger(i64),
    UnsignedInteger(u64),
    Float(f64),
}

impl Number {
    pub fn as_signed_integer(&self) -> Option<i64> {
        match self {
            Self::SignedInteger(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_unsigned_integer(&self) -> Option<u64> {
        match self {
            Self::UnsignedInteger(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn to_f64(&self) -> f64 {
        match self {
            Self::SignedInteger(v) => *v as f64,
            Self::UnsignedInteger(v) => *v as f64,
            Self::Float(v) => *v,
        }
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Self::SignedInteger(v) => *v == 0,
            Self::UnsignedInteger(v) => *v == 0,
            Self::Float(v) => *v == 0.0,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SignedInteger(v) => fmt::Display::fmt(v, f),
            Self::UnsignedInteger(v) => fmt::Display::fmt(v, f),
            Self::Float(v) => fmt::Display::fmt(v, f),
        }
    }
}

impl Serialize for Number {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::SignedInteger(v) => serializer.serialize_i64(*v),
            Self::UnsignedInteger(v) => serializer.serialize_u64(*v),
            Self::Float(v) => serializer.serialize_f64(*v),
        }
    }
}

macro_rules! impl_number_from {
    ($type:ty => $variant:ident) => {
        impl From<$type> for Number {
            fn from(value: $type) -> Self {
                Self::$variant(value as _)
            }
        }
    };
}

impl_number_from!(i8 => SignedInteger);
impl_number_from!(i16 => SignedInteger);
impl_number_from!(i32 => SignedInteger);
impl_number_from!(i64 => SignedInteger);
impl_number_from!(isize => SignedInteger);
impl_number_from!(u8 => UnsignedInteger);
impl_number_from!(u16 => UnsignedInteger);
impl_number_from!(u32 => UnsignedInteger);
impl_number_from!(u64 => UnsignedInteger);
impl_number_from!(usize => UnsignedInteger);
impl_number_from!(f32 => Float);
impl_number_from!(f64 => Float);

/// Attribute-bearing source value.
///
/// Implement it by hand for values with computed or callable attributes, or
/// derive it for plain structs with `#[derive(Attributes)]`.
pub trait Attributes: Send + Sync {
    fn attribute(&self, name: &str) -> Option<Object>;
}

/// Deferred collection of source values.
///
/// `items` materializes the whole collection. Collections that are expensive
/// to materialize can also expose `stream`, which serializers in `many` mode
/// prefer over `items`.
pub trait Sequence: Send + Sync {
    fn items(&self) -> Vec<Object>;

    fn stream(&self) -> Option<Box<dyn Iterator<Item = Object> + '_>> {
        None
    }
}

pub type CallableFn = Arc<dyn Fn() -> Result<Object> + Send + Sync>;

/// Source value read by serializers.
#[derive(Clone, Default)]
pub enum Object {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
    Array(Vec<Object>),
    /// Key-bearing value.
    Map(Vec<(String, Object)>),
    /// Attribute-bearing plain data.
    Struct {
        name: String,
        fields: Vec<(String, Object)>,
    },
    Record(Arc<dyn Attributes>),
    Sequence(Arc<dyn Sequence>),
    Callable(CallableFn),
}

impl Object {
    pub fn null() -> Self {
        Self::Null
    }

    pub fn bool(value: bool) -> Self {
        Self::Bool(value)
    }

    pub fn number(value: impl Into<Number>) -> Self {
        Self::Number(value.into())
    }

    pub fn string(value: impl ToString) -> Self {
        Self::String(value.to_string())
    }

    pub fn array() -> Self {
        Self::Array(Default::default())
    }

    pub fn array_from<T: Into<Object>>(value: impl IntoIterator<Item = T>) -> Self {
        Self::Array(value.into_iter().map(|item| item.into()).collect())
    }

    pub fn item(self, value: impl Into<Object>) -> Self {
        match self {
            Self::Array(mut result) => {
                result.push(value.into());
                Self::Array(result)
            }
            _ => self,
        }
    }

    pub fn map() -> Self {
        Self::Map(Default::default())
    }

    pub fn map_from<K: ToString, V: Into<Object>>(value: impl IntoIterator<Item = (K, V)>) -> Self {
        Self::Map(
            value
                .into_iter()
                .map(|(key, value)| (key.to_string(), value.into()))
                .collect(),
        )
    }

    /// Sets a map entry or a struct field, replacing the existing one in place.
    pub fn property(self, key: impl ToString, value: impl Into<Object>) -> Self {
        match self {
            Self::Map(mut result) => {
                set_entry(&mut result, key.to_string(), value.into());
                Self::Map(result)
            }
            Self::Struct { name, mut fields } => {
                set_entry(&mut fields, key.to_string(), value.into());
                Self::Struct { name, fields }
            }
            _ => self,
        }
    }

    pub fn structure(name: impl ToString) -> Self {
        Self::Struct {
            name: name.to_string(),
            fields: Default::default(),
        }
    }

    pub fn record<T>(value: T) -> Self
    where
        T: Attributes + 'static,
    {
        Self::Record(Arc::new(value))
    }

    pub fn sequence<T>(value: T) -> Self
    where
        T: Sequence + 'static,
    {
        Self::Sequence(Arc::new(value))
    }

    pub fn callable<F>(f: F) -> Self
    where
        F: Fn() -> Result<Object> + Send + Sync + 'static,
    {
        Self::Callable(Arc::new(f))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Date(_) => "date",
            Self::Time(_) => "time",
            Self::DateTime(_) => "datetime",
            Self::Array(_) => "array",
            Self::Map(_) => "map",
            Self::Struct { .. } => "struct",
            Self::Record(_) => "record",
            Self::Sequence(_) => "sequence",
            Self::Callable(_) => "callable",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<&Number> {
        match self {
            Self::Number(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v.as_str()),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Object]> {
        match self {
            Self::Array(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&[(String, Object)]> {
        match self {
            Self::Map(v) => Some(v),
            _ => None,
        }
    }

    /// Reads an attribute of a struct or record.
    pub fn get_attribute(&self, name: &str) -> Option<Object> {
        match self {
            Self::Struct { fields, .. } => fields
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.clone()),
            Self::Record(record) => record.attribute(name),
            _ => None,
        }
    }

    /// Reads an entry of a map.
    pub fn get_key(&self, key: &str) -> Option<&Object> {
        match self {
            Self::Map(entries) => entries
                .iter()
                .find(|(name, _)| name == key)
                .map(|(_, value)| value),
            _ => None,
        }
    }

    /// Iterates the value the way a plain `for` loop would.
    pub fn iter_items(&self) -> Result<Box<dyn Iterator<Item = Object> + '_>> {
        match self {
            Self::Array(items) => Ok(Box::new(items.iter().cloned())),
            Self::Sequence(sequence) => Ok(Box::new(sequence.items().into_iter())),
            _ => Err(Error::NotIterable(self.type_name())),
        }
    }

    /// Iterates the value, preferring the lazy accessor of deferred sequences.
    pub fn iter_stream(&self) -> Result<Box<dyn Iterator<Item = Object> + '_>> {
        match self {
            Self::Sequence(sequence) => match sequence.stream() {
                Some(stream) => Ok(stream),
                None => Ok(Box::new(sequence.items().into_iter())),
            },
            _ => self.iter_items(),
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(v) => *v,
            Self::Number(v) => !v.is_zero(),
            Self::String(v) => !v.is_empty(),
            Self::Array(v) => !v.is_empty(),
            Self::Map(v) => !v.is_empty(),
            Self::Sequence(v) => !v.items().is_empty(),
            _ => true,
        }
    }

    pub fn to_text(&self) -> Result<String> {
        match self {
            Self::String(v) => Ok(v.to_owned()),
            Self::Bool(v) => Ok(v.to_string()),
            Self::Number(v) => Ok(v.to_string()),
            Self::Date(v) => Ok(v.format(DATE_FORMAT).to_string()),
            Self::Time(v) => Ok(v.format(TIME_FORMAT).to_string()),
            Self::DateTime(v) => Ok(v.format(DATETIME_FORMAT).to_string()),
            _ => Err(self.coercion_error("string")),
        }
    }

    pub fn to_integer(&self) -> Result<Number> {
        match self {
            Self::Number(Number::Float(v)) => {
                let v = v.trunc();
                if v >= i64::MIN as f64 && v < i64::MAX as f64 {
                    Ok(Number::SignedInteger(v as i64))
                } else if v >= 0.0 && v < u64::MAX as f64 {
                    Ok(Number::UnsignedInteger(v as u64))
                } else {
                    Err(self.coercion_error("integer"))
                }
            }
            Self::Number(v) => Ok(*v),
            Self::Bool(v) => Ok(Number::SignedInteger(*v as i64)),
            Self::String(v) => {
                let text = v.trim();
                text.parse::<i64>()
                    .map(Number::SignedInteger)
                    .or_else(|_| text.parse::<u64>().map(Number::UnsignedInteger))
                    .map_err(|_| self.coercion_error("integer"))
            }
            _ => Err(self.coercion_error("integer")),
        }
    }

    pub fn to_float(&self) -> Result<f64> {
        match self {
            Self::Number(v) => Ok(v.to_f64()),
            Self::Bool(v) => Ok(if *v { 1.0 } else { 0.0 }),
            Self::String(v) => v
                .trim()
                .parse::<f64>()
                .map_err(|_| self.coercion_error("float")),
            _ => Err(self.coercion_error("float")),
        }
    }

    /// Converts a raw value into output, formatting dates as ISO 8601 and
    /// materializing sequences.
    pub fn into_primitive(self) -> Result<Primitive> {
        match self {
            Self::Null => Ok(Primitive::Null),
            Self::Bool(v) => Ok(Primitive::Bool(v)),
            Self::Number(v) => Ok(Primitive::Number(v)),
            Self::String(v) => Ok(Primitive::String(v)),
            Self::Date(_) | Self::Time(_) | Self::DateTime(_) => self.to_text().map(Primitive::String),
            Self::Array(items) => items
                .into_iter()
                .map(Self::into_primitive)
                .collect::<Result<Vec<_>>>()
                .map(Primitive::Array),
            Self::Map(entries) | Self::Struct { fields: entries, .. } => entries
                .into_iter()
                .map(|(key, value)| Ok((key, value.into_primitive()?)))
                .collect::<Result<Vec<_>>>()
                .map(Primitive::Map),
            Self::Sequence(sequence) => sequence
                .items()
                .into_iter()
                .map(Self::into_primitive)
                .collect::<Result<Vec<_>>>()
                .map(Primitive::Array),
            Self::Record(_) | Self::Callable(_) => Err(Error::Unrepresentable(self.type_name())),
        }
    }

    fn coercion_error(&self, expected: &'static str) -> Error {
        Error::Coercion {
            expected,
            found: self.type_name(),
        }
    }
}

pub(crate) fn set_entry<T>(entries: &mut Vec<(String, T)>, key: String, value: T) {
    if let Some((_, item)) = entries.iter_mut().find(|(k, _)| k == &key) {
        *item = value;
    } else {
        entries.push((key, value));
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("Null"),
            Self::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
            Self::Number(v) => f.debug_tuple("Number").field(v).finish(),
            Self::String(v) => f.debug_tuple("String").field(v).finish(),
            Self::Date(v) => f.debug_tuple("Date").field(v).finish(),
            Self::Time(v) => f.debug_tuple("Time").field(v).finish(),
            Self::DateTime(v) => f.debug_tuple("DateTime").field(v).finish(),
            Self::Array(v) => f.debug_tuple("Array").field(v).finish(),
            Self::Map(v) => f.debug_tuple("Map").field(v).finish(),
            Self::Struct { name, fields } => f
                .debug_struct("Struct")
                .field("name", name)
                .field("fields", fields)
                .finish(),
            Self::Record(_) => f.write_str("Record(..)"),
            Self::Sequence(_) => f.write_str("Sequence(..)"),
            Self::Callable(_) => f.write_str("Callable(..)"),
        }
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Date(a), Self::Date(b)) => a == b,
            (Self::Time(a), Self::Time(b)) => a == b,
            (Self::DateTime(a), Self::DateTime(b)) => a == b,
            (Self::Array(a), Self::Array(b)) => a == b,
            (Self::Map(a), Self::Map(b)) => a == b,
            (
                Self::Struct {
                    name: a,
                    fields: af,
                },
                Self::Struct {
                    name: b,
                    fields: bf,
                },
            ) => a == b && af == bf,
            (Self::Record(a), Self::Record(b)) => Arc::ptr_eq(a, b),
            (Self::Sequence(a), Self::Sequence(b)) => Arc::ptr_eq(a, b),
            (Self::Callable(a), Self::Callable(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

macro_rules! impl_object_from {
    ($type:ty => $variant:ident) => {
        impl From<$type> for Object {
            fn from(value: $type) -> Self {
                Self::$variant(value.into())
            }
        }
    };
}

impl_object_from!(bool => Bool);
impl_object_from!(i8 => Number);
impl_object_from!(i16 => Number);
impl_object_from!(i32 => Number);
impl_object_from!(i64 => Number);
impl_object_from!(isize => Number);
impl_object_from!(u8 => Number);
impl_object_from!(u16 => Number);
impl_object_from!(u32 => Number);
impl_object_from!(u64 => Number);
impl_object_from!(usize => Number);
impl_object_from!(f32 => Number);
impl_object_from!(f64 => Number);
impl_object_from!(Number => Number);
impl_object_from!(String => String);
impl_object_from!(&str => String);
impl_object_from!(NaiveDate => Date);
impl_object_from!(NaiveTime => Time);
impl_object_from!(NaiveDateTime => DateTime);

impl From<Vec<Object>> for Object {
    fn from(value: Vec<Object>) -> Self {
        Self::Array(value)
    }
}

impl<T> From<Option<T>> for Object
where
    T: Into<Object>,
{
    fn from(value: Option<T>) -> Self {
        value.map(|value| value.into()).unwrap_or_default()
    }
}

/// Conversion of borrowed Rust values into source values.
pub trait AsObject {
    fn as_object(&self) -> Object;
}

macro_rules! impl_as_object {
    ($( $type:ty ),+) => {
        $(
            impl AsObject for $type {
                fn as_object(&self) -> Object {
                    Object::from(self.to_owned())
                }
            }
        )+
    };
}

impl_as_object!(
    bool,
    i8,
    i16,
    i32,
    i64,
    isize,
    u8,
    u16,
    u32,
    u64,
    usize,
    f32,
    f64,
    String,
    NaiveDate,
    NaiveTime,
    NaiveDateTime
);

impl AsObject for str {
    fn as_object(&self) -> Object {
        Object::String(self.to_owned())
    }
}

impl AsObject for char {
    fn as_object(&self) -> Object {
        Object::String(self.to_string())
    }
}

impl AsObject for Object {
    fn as_object(&self) -> Object {
        self.clone()
    }
}

impl<Tz: TimeZone> AsObject for DateTime<Tz> {
    fn as_object(&self) -> Object {
        Object::DateTime(self.naive_utc())
    }
}

impl<T: AsObject + ?Sized> AsObject for &T {
    fn as_object(&self) -> Object {
        (**self).as_object()
    }
}

impl<T: AsObject + ?Sized> AsObject for Box<T> {
    fn as_object(&self) -> Object {
        (**self).as_object()
    }
}

impl<T: AsObject + ?Sized> AsObject for Arc<T> {
    fn as_object(&self) -> Object {
        (**self).as_object()
    }
}

impl<T: AsObject> AsObject for Option<T> {
    fn as_object(&self) -> Object {
        match self {
            Some(value) => value.as_object(),
            None => Object::Null,
        }
    }
}

impl<T: AsObject> AsObject for [T] {
    fn as_object(&self) -> Object {
        Object::Array(self.iter().map(AsObject::as_object).collect())
    }
}

impl<T: AsObject> AsObject for Vec<T> {
    fn as_object(&self) -> Object {
        self.as_slice().as_object()
    }
}

impl<K: ToString, V: AsObject, S> AsObject for HashMap<K, V, S> {
    fn as_object(&self) -> Object {
        Object::Map(
            self.iter()
                .map(|(key, value)| (key.to_string(), value.as_object()))
                .collect(),
        )
    }
}

impl<K: ToString, V: AsObject> AsObject for BTreeMap<K, V> {
    fn as_object(&self) -> Object {
        Object::Map(
            self.iter()
                .map(|(key, value)| (key.to_string(), value.as_object()))
                .collect(),
        )
    }
}
