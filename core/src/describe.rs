use crate::{error::*, field::FieldType, schema::Schema, value::object::set_entry};
use serde::{ser::SerializeMap, Deserialize, Serialize, Serializer};
use std::sync::Arc;

/// Documented type of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaKind {
    Object,
    Array,
    String,
    Integer,
    Number,
    Boolean,
}

/// Declared result type of a schema method.
#[derive(Debug, Clone)]
pub enum ReturnType {
    Primitive(SchemaKind),
    /// Sequence of primitives.
    Sequence(SchemaKind),
    Nested { schema: Arc<Schema>, many: bool },
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct DescriptionProperties(pub Vec<(String, Description)>);

impl DescriptionProperties {
    /// Sets a property, replacing an existing one of the same name in place.
    pub fn property(mut self, name: impl ToString, description: impl Into<Description>) -> Self {
        set_entry(&mut self.0, name.to_string(), description.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Description> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, description)| description)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl Serialize for DescriptionProperties {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, description) in &self.0 {
            map.serialize_entry(name, description)?;
        }
        map.end()
    }
}

impl<N, D> FromIterator<(N, D)> for DescriptionProperties
where
    N: ToString,
    D: Into<Description>,
{
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = (N, D)>,
    {
        Self(
            iter.into_iter()
                .map(|(name, description)| (name.to_string(), description.into()))
                .collect(),
        )
    }
}

/// Structural description of serialized output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Description {
    #[serde(rename = "type")]
    pub kind: SchemaKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "DescriptionProperties::is_empty")]
    pub properties: DescriptionProperties,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Description>>,
}

impl Description {
    pub fn new(kind: SchemaKind) -> Self {
        Self {
            kind,
            title: None,
            description: Default::default(),
            properties: Default::default(),
            items: None,
        }
    }

    pub fn object(properties: impl Into<DescriptionProperties>) -> Self {
        Self::new(SchemaKind::Object).properties(properties)
    }

    pub fn array(items: impl Into<Description>) -> Self {
        Self::new(SchemaKind::Array).items(items)
    }

    pub fn title(mut self, content: impl ToString) -> Self {
        self.title = Some(content.to_string());
        self
    }

    pub fn description(mut self, content: impl ToString) -> Self {
        self.description = content.to_string();
        self
    }

    pub fn properties(mut self, properties: impl Into<DescriptionProperties>) -> Self {
        self.properties = properties.into();
        self
    }

    pub fn items(mut self, items: impl Into<Description>) -> Self {
        self.items = Some(Box::new(items.into()));
        self
    }
}

impl From<SchemaKind> for Description {
    fn from(kind: SchemaKind) -> Self {
        Self::new(kind)
    }
}

/// Describes the output of serializing with `schema`, or of serializing a
/// collection with it when `many` is set.
pub fn describe(schema: &Schema, many: bool) -> Result<Description> {
    let object = Description::object(describe_properties(schema)?);
    let result = if many {
        Description::array(object)
    } else {
        object
    };
    Ok(result
        .title(schema.name())
        .description(schema.description()))
}

fn describe_nested(schema: &Schema, many: bool) -> Result<Description> {
    let object = Description::object(describe_properties(schema)?);
    let result = if many {
        Description::array(object)
    } else {
        object
    };
    Ok(result.title(schema.name()))
}

fn describe_properties(schema: &Schema) -> Result<DescriptionProperties> {
    let mut result = DescriptionProperties::default();
    for (compiled, (name, field)) in schema.compiled_fields().iter().zip(schema.fields()) {
        let description = match field.field_type() {
            FieldType::Nested => match field.nested_schema() {
                Some((nested, many)) => Some(describe_nested(nested, many)?),
                None => None,
            },
            FieldType::Method => Some(describe_method(schema, name, field.method_name(name))?),
            FieldType::List => field
                .list_element()
                .and_then(FieldType::declared_schema_kind)
                .map(Description::array),
            _ => field.schema_type().map(Description::new),
        };
        match description {
            Some(description) => result = result.property(&compiled.name, description),
            None => result.0.retain(|(key, _)| key != &compiled.name),
        }
    }
    Ok(result)
}

fn describe_method(schema: &Schema, field: &str, method: Option<String>) -> Result<Description> {
    let returns = method
        .and_then(|method| schema.method(&method))
        .and_then(|method| method.returns.as_ref());
    match returns {
        Some(ReturnType::Primitive(kind)) => Ok(Description::new(*kind)),
        Some(ReturnType::Sequence(kind)) => Ok(Description::array(*kind)),
        Some(ReturnType::Nested { schema, many }) => describe_nested(schema, *many),
        None => Err(Error::MissingReturnType {
            schema: schema.name().to_owned(),
            field: field.to_owned(),
        }),
    }
}
