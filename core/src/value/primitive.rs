use crate::value::object::{set_entry, Number};
use serde::{ser::SerializeMap, ser::SerializeSeq, Serialize, Serializer};

/// Serialized output tree.
#[derive(Debug, Default, Clone, PartialEq)]
pub enum Primitive {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<Primitive>),
    Map(Vec<(String, Primitive)>),
}

impl Primitive {
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

    pub fn array_from<T: Into<Primitive>>(value: impl IntoIterator<Item = T>) -> Self {
        Self::Array(value.into_iter().map(|item| item.into()).collect())
    }

    pub fn item(self, value: impl Into<Primitive>) -> Self {
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

    pub fn map_from<K: ToString, V: Into<Primitive>>(
        value: impl IntoIterator<Item = (K, V)>,
    ) -> Self {
        Self::Map(
            value
                .into_iter()
                .map(|(key, value)| (key.to_string(), value.into()))
                .collect(),
        )
    }

    pub fn property(self, key: impl ToString, value: impl Into<Primitive>) -> Self {
        match self {
            Self::Map(mut result) => {
                set_entry(&mut result, key.to_string(), value.into());
                Self::Map(result)
            }
            _ => self,
        }
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

    pub fn as_array(&self) -> Option<&[Primitive]> {
        match self {
            Self::Array(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&[(String, Primitive)]> {
        match self {
            Self::Map(v) => Some(v),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Primitive> {
        self.as_map()?
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.as_map()
            .unwrap_or_default()
            .iter()
            .map(|(name, _)| name.as_str())
    }
}

impl Serialize for Primitive {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(v) => serializer.serialize_bool(*v),
            Self::Number(v) => v.serialize(serializer),
            Self::String(v) => serializer.serialize_str(v),
            Self::Array(v) => {
                let mut seq = serializer.serialize_seq(Some(v.len()))?;
                for item in v {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Map(v) => {
                let mut map = serializer.serialize_map(Some(v.len()))?;
                for (k, v) in v {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}

macro_rules! impl_primitive_from {
    ($type:ty => $variant:ident) => {
        impl From<$type> for Primitive {
            fn from(value: $type) -> Self {
                Self::$variant(value.into())
            }
        }
    };
}

impl_primitive_from!(bool => Bool);
impl_primitive_from!(i8 => Number);
impl_primitive_from!(i16 => Number);
impl_primitive_from!(i32 => Number);
impl_primitive_from!(i64 => Number);
impl_primitive_from!(u8 => Number);
impl_primitive_from!(u16 => Number);
impl_primitive_from!(u32 => Number);
impl_primitive_from!(u64 => Number);
impl_primitive_from!(f32 => Number);
impl_primitive_from!(f64 => Number);
impl_primitive_from!(Number => Number);
impl_primitive_from!(String => String);
impl_primitive_from!(&str => String);

impl From<Vec<Primitive>> for Primitive {
    fn from(value: Vec<Primitive>) -> Self {
        Self::Array(value)
    }
}
