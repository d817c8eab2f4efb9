use crate::{
    compile::{Getter, GetterFn, TransformFn},
    describe::SchemaKind,
    error::*,
    schema::Schema,
    serializer::Serializer,
    settings,
    value::{object::Object, primitive::Primitive},
};
use chrono::format::{Item, StrftimeItems};
use std::{fmt, fmt::Write, sync::Arc};
use url::{Position, Url};

pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";
pub const DEFAULT_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S.%6fZ";

const RELATIVE_BASE: &str = "relative://base/";

/// Kind of a declared field. Selects the transform applied to extracted
/// values and the documented type of the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    Raw,
    Str,
    Int,
    Float,
    Bool,
    Method,
    Image,
    List,
    Nested,
    Date,
    DateTime,
}

impl FieldType {
    /// Documented type declared by the field type itself.
    ///
    /// Lists and nested schemas describe themselves structurally, so they
    /// declare none here.
    pub fn declared_schema_kind(self) -> Option<SchemaKind> {
        match self {
            Self::Str | Self::Image | Self::Date | Self::DateTime => Some(SchemaKind::String),
            Self::Int => Some(SchemaKind::Integer),
            Self::Float => Some(SchemaKind::Number),
            Self::Bool => Some(SchemaKind::Boolean),
            Self::Raw | Self::Method | Self::List | Self::Nested => None,
        }
    }
}

#[derive(Clone)]
enum Config {
    Plain,
    Method(Option<String>),
    Image(String),
    List {
        field_attr: String,
        element: FieldType,
        image_base_url: String,
    },
    Nested {
        schema: Arc<Schema>,
        many: bool,
    },
    Date(String),
}

/// Declares how one named value is extracted from a source and transformed.
///
/// The field name itself is supplied by the schema the field is declared on.
///
/// # Example
/// ```rust
/// use serde_projection::{Field, Object, SchemaBuilder, Serializer};
///
/// let schema = SchemaBuilder::mapping("Foo")
///     .field("foo", Field::str())
///     .field("bar", Field::int().attr("baz").label("qux"))
///     .build()
///     .unwrap();
/// let source = Object::map().property("foo", "hello").property("baz", "42");
/// let data = Serializer::new(schema, source).into_data().unwrap();
/// assert_eq!(data.get("foo").and_then(|v| v.as_str()), Some("hello"));
/// assert!(data.get("qux").is_some());
/// ```
#[derive(Clone)]
pub struct Field {
    attr: Option<String>,
    call: bool,
    label: Option<String>,
    required: bool,
    schema_type: Option<SchemaKind>,
    field_type: FieldType,
    config: Config,
    getter: Option<GetterFn>,
    transform: Option<TransformFn>,
}

impl Field {
    fn new(field_type: FieldType, config: Config) -> Self {
        Self {
            attr: None,
            call: false,
            label: None,
            required: true,
            schema_type: None,
            field_type,
            config,
            getter: None,
            transform: None,
        }
    }

    /// Passes the extracted value through unchanged.
    pub fn raw() -> Self {
        Self::new(FieldType::Raw, Config::Plain)
    }

    /// Text coercion. `Null` is not text, so nullable sources want
    /// `required(false)`.
    pub fn str() -> Self {
        Self::new(FieldType::Str, Config::Plain)
    }

    pub fn int() -> Self {
        Self::new(FieldType::Int, Config::Plain)
    }

    pub fn float() -> Self {
        Self::new(FieldType::Float, Config::Plain)
    }

    pub fn bool() -> Self {
        Self::new(FieldType::Bool, Config::Plain)
    }

    /// Computes the value with the schema method `get_<field name>`.
    pub fn method() -> Self {
        Self::new(FieldType::Method, Config::Method(None))
    }

    /// Computes the value with the named schema method.
    pub fn method_named(name: impl ToString) -> Self {
        Self::new(FieldType::Method, Config::Method(Some(name.to_string())))
    }

    /// Image url joined onto the configured image base url.
    pub fn image() -> Self {
        Self::image_with_base(settings::image_base_url())
    }

    pub fn image_with_base(base_url: impl ToString) -> Self {
        Self::new(FieldType::Image, Config::Image(base_url.to_string()))
    }

    /// Collects `field_attr` of every element of an iterable value.
    ///
    /// Elements without that attribute are taken as they are.
    pub fn list(field_attr: impl ToString, element: FieldType) -> Result<Self> {
        if element.declared_schema_kind().is_none() {
            return Err(Error::ListElementUndocumented(element));
        }
        let image_base_url = match element {
            FieldType::Image => settings::image_base_url(),
            _ => Default::default(),
        };
        Ok(Self::new(
            FieldType::List,
            Config::List {
                field_attr: field_attr.to_string(),
                element,
                image_base_url,
            },
        ))
    }

    /// Serializes the value with another schema.
    pub fn nested(schema: &Arc<Schema>) -> Self {
        Self::new(
            FieldType::Nested,
            Config::Nested {
                schema: schema.clone(),
                many: false,
            },
        )
    }

    pub fn date() -> Self {
        Self::new(FieldType::Date, Config::Date(DEFAULT_DATE_FORMAT.to_owned()))
    }

    pub fn datetime() -> Self {
        Self::new(
            FieldType::DateTime,
            Config::Date(DEFAULT_DATETIME_FORMAT.to_owned()),
        )
    }

    /// Passes the extracted value through a user transform.
    pub fn custom<F>(transform: F) -> Self
    where
        F: Fn(Object) -> Result<Primitive> + Send + Sync + 'static,
    {
        Self::raw().transform(transform)
    }

    pub fn attr(mut self, name: impl ToString) -> Self {
        self.attr = Some(name.to_string());
        self
    }

    pub fn call(mut self, value: bool) -> Self {
        self.call = value;
        self
    }

    pub fn label(mut self, name: impl ToString) -> Self {
        self.label = Some(name.to_string());
        self
    }

    pub fn required(mut self, value: bool) -> Self {
        self.required = value;
        self
    }

    /// Serializes a collection of values. Does nothing on fields other than
    /// nested ones.
    pub fn many(mut self, value: bool) -> Self {
        if let Config::Nested { many, .. } = &mut self.config {
            *many = value;
        }
        self
    }

    /// Replaces the strftime format of date and datetime fields.
    pub fn date_format(mut self, format: impl ToString) -> Result<Self> {
        let format = format.to_string();
        if StrftimeItems::new(&format).any(|item| matches!(item, Item::Error)) {
            return Err(Error::InvalidDateFormat(format));
        }
        match &mut self.config {
            Config::Date(current) => *current = format,
            _ => return Err(Error::DateFormatUnsupported(self.field_type)),
        }
        Ok(self)
    }

    pub fn with_schema_type(mut self, kind: SchemaKind) -> Result<Self> {
        if self.field_type == FieldType::Method {
            return Err(Error::MethodSchemaType);
        }
        self.schema_type = Some(kind);
        Ok(self)
    }

    /// Replaces the default getter of the schema for this field.
    pub fn getter<F>(mut self, getter: F) -> Self
    where
        F: Fn(&Object) -> Result<Object> + Send + Sync + 'static,
    {
        self.getter = Some(Arc::new(getter));
        self
    }

    pub fn transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(Object) -> Result<Primitive> + Send + Sync + 'static,
    {
        self.transform = Some(Arc::new(transform));
        self
    }

    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    pub fn source_attr(&self) -> Option<&str> {
        self.attr.as_deref()
    }

    pub fn output_label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn invokes_result(&self) -> bool {
        self.call
    }

    /// Documented type of the output, if any.
    pub fn schema_type(&self) -> Option<SchemaKind> {
        self.schema_type
            .or_else(|| self.field_type.declared_schema_kind())
    }

    pub fn nested_schema(&self) -> Option<(&Arc<Schema>, bool)> {
        match &self.config {
            Config::Nested { schema, many } => Some((schema, *many)),
            _ => None,
        }
    }

    pub fn list_element(&self) -> Option<FieldType> {
        match &self.config {
            Config::List { element, .. } => Some(*element),
            _ => None,
        }
    }

    /// Name of the schema method backing a method field declared as `field_name`.
    pub fn method_name(&self, field_name: &str) -> Option<String> {
        match &self.config {
            Config::Method(Some(name)) => Some(name.to_owned()),
            Config::Method(None) => Some(format!("get_{}", field_name)),
            _ => None,
        }
    }

    /// Tells if a getter produced by [`Field::as_getter`] takes the serializer
    /// along with the source.
    pub fn getter_takes_serializer(&self) -> bool {
        self.field_type == FieldType::Method
    }

    /// Tells if [`Field::to_value`] does anything beyond converting the raw
    /// value into output.
    pub fn is_to_value_overridden(&self) -> bool {
        self.transform.is_some() || !matches!(self.field_type, FieldType::Raw | FieldType::Method)
    }

    /// Getter replacing the schema default one, if the field has its own.
    pub fn as_getter(&self, field_name: &str, schema: &Schema) -> Result<Option<Getter>> {
        if let Some(method_name) = self.method_name(field_name) {
            return match schema.method(&method_name) {
                Some(method) => Ok(Some(Getter::Method(method.func.clone()))),
                None => Err(Error::MethodNotFound {
                    schema: schema.name().to_owned(),
                    method: method_name,
                }),
            };
        }
        Ok(self.getter.clone().map(Getter::Custom))
    }

    pub fn to_value(&self, value: Object) -> Result<Primitive> {
        if let Some(transform) = &self.transform {
            return transform(value);
        }
        match &self.config {
            Config::Plain => match self.field_type {
                FieldType::Str => value.to_text().map(Primitive::String),
                FieldType::Int => value.to_integer().map(Primitive::Number),
                FieldType::Float => value.to_float().map(Primitive::from),
                FieldType::Bool => Ok(Primitive::Bool(value.is_truthy())),
                _ => value.into_primitive(),
            },
            Config::Method(_) => value.into_primitive(),
            Config::Image(base_url) => image_url(base_url, value).map(Primitive::String),
            Config::List {
                field_attr,
                element,
                image_base_url,
            } => value
                .iter_items()?
                .map(|item| {
                    let item = item.get_attribute(field_attr).unwrap_or(item);
                    match element {
                        FieldType::Image => image_url(image_base_url, item).map(Primitive::String),
                        _ => item.into_primitive(),
                    }
                })
                .collect::<Result<Vec<_>>>()
                .map(Primitive::Array),
            Config::Nested { schema, many } => {
                Serializer::new(schema.clone(), value).many(*many).into_data()
            }
            Config::Date(format) => format_date(format, &value),
        }
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("field_type", &self.field_type)
            .field("attr", &self.attr)
            .field("call", &self.call)
            .field("label", &self.label)
            .field("required", &self.required)
            .field("schema_type", &self.schema_type)
            .finish_non_exhaustive()
    }
}

fn image_url(base_url: &str, value: Object) -> Result<String> {
    match value.get_attribute("url").unwrap_or(value) {
        Object::String(path) => join_url(base_url, &path),
        other => Err(Error::Coercion {
            expected: "image url",
            found: other.type_name(),
        }),
    }
}

/// Resolves `path` against `base` as a url reference. Relative bases resolve
/// to relative results.
fn join_url(base: &str, path: &str) -> Result<String> {
    if base.is_empty() {
        return Ok(path.to_owned());
    }
    let invalid = |target: &str, error: url::ParseError| Error::InvalidUrl {
        url: target.to_owned(),
        reason: error.to_string(),
    };
    match Url::parse(base) {
        Ok(base) => base
            .join(path)
            .map(String::from)
            .map_err(|error| invalid(path, error)),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let root = Url::parse(RELATIVE_BASE).map_err(|error| invalid(RELATIVE_BASE, error))?;
            let base_url = root.join(base).map_err(|error| invalid(base, error))?;
            let joined = base_url.join(path).map_err(|error| invalid(path, error))?;
            if joined.scheme() != root.scheme() || joined.host_str() != root.host_str() {
                return Ok(joined.into());
            }
            let relative = &joined[Position::BeforePath..];
            if base.starts_with('/') {
                Ok(relative.to_owned())
            } else {
                Ok(relative.trim_start_matches('/').to_owned())
            }
        }
        Err(error) => Err(invalid(base, error)),
    }
}

fn format_date(format: &str, value: &Object) -> Result<Primitive> {
    let items = StrftimeItems::new(format);
    let formatted = match value {
        Object::Null => return Ok(Primitive::Null),
        Object::String(v) if v.is_empty() => return Ok(Primitive::Null),
        Object::Date(v) => v.format_with_items(items),
        Object::Time(v) => v.format_with_items(items),
        Object::DateTime(v) => v.format_with_items(items),
        other => {
            return Err(Error::Coercion {
                expected: "date",
                found: other.type_name(),
            })
        }
    };
    let mut result = String::new();
    write!(result, "{}", formatted).map_err(|_| Error::InvalidDateFormat(format.to_owned()))?;
    Ok(Primitive::String(result))
}
