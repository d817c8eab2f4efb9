use crate::{
    compile::{compile, CompiledField, Getter, MethodFn},
    describe::{describe, Description, ReturnType},
    error::*,
    field::Field,
    serializer::Serializer,
    value::{
        object::{set_entry, Object},
        primitive::Primitive,
    },
};
use std::{fmt, sync::Arc};

/// How default getters read values out of sources.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceAccess {
    /// Attributes of structs and records.
    #[default]
    Attribute,
    /// Entries of maps.
    Item,
}

/// Schema method backing computed fields.
#[derive(Clone)]
pub struct Method {
    pub returns: Option<ReturnType>,
    pub func: MethodFn,
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Method")
            .field("returns", &self.returns)
            .finish_non_exhaustive()
    }
}

/// Finalized schema type: merged fields and methods plus the compiled plan.
///
/// Produced once by [`SchemaBuilder::build`] and never changed afterwards.
pub struct Schema {
    name: String,
    description: String,
    access: SourceAccess,
    fields: Vec<(String, Field)>,
    methods: Vec<(String, Method)>,
    compiled: Vec<CompiledField>,
}

impl Schema {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn access(&self) -> SourceAccess {
        self.access
    }

    /// Merged fields, in serialization order.
    pub fn fields(&self) -> &[(String, Field)] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, field)| field)
    }

    pub fn methods(&self) -> &[(String, Method)] {
        &self.methods
    }

    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, method)| method)
    }

    pub fn compiled_fields(&self) -> &[CompiledField] {
        &self.compiled
    }

    pub fn default_getter(&self, attr: &str) -> Getter {
        match self.access {
            SourceAccess::Attribute => Getter::Attribute(attr.to_owned()),
            SourceAccess::Item => Getter::Item(attr.to_owned()),
        }
    }

    pub fn serialize(self: &Arc<Self>, instance: impl Into<Object>, many: bool) -> Result<Primitive> {
        Serializer::new(self.clone(), instance)
            .many(many)
            .into_data()
    }

    pub fn describe(&self, many: bool) -> Result<Description> {
        describe(self, many)
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("name", &self.name)
            .field("access", &self.access)
            .field("fields", &self.fields)
            .field("compiled", &self.compiled)
            .finish_non_exhaustive()
    }
}

/// Declares a schema type.
///
/// # Example
/// ```rust
/// use serde_projection::{Field, Object, SchemaBuilder};
///
/// let base = SchemaBuilder::new("Base")
///     .field("id", Field::int())
///     .build()
///     .unwrap();
/// let schema = SchemaBuilder::new("Child")
///     .extends(&base)
///     .field("total", Field::method())
///     .method("get_total", |_, source| {
///         let id = source.get_attribute("id").and_then(|v| v.as_number().copied());
///         Ok(Object::from(id.map(|v| v.to_f64() * 2.0)))
///     })
///     .build()
///     .unwrap();
/// let names = schema.fields().iter().map(|(name, _)| name.as_str()).collect::<Vec<_>>();
/// assert_eq!(names, vec!["id", "total"]);
/// ```
pub struct SchemaBuilder {
    name: String,
    description: String,
    access: Option<SourceAccess>,
    bases: Vec<Arc<Schema>>,
    fields: Vec<(String, Field)>,
    methods: Vec<(String, Method)>,
}

impl SchemaBuilder {
    /// Schema reading attributes, unless a base says otherwise.
    pub fn new(name: impl ToString) -> Self {
        Self {
            name: name.to_string(),
            description: Default::default(),
            access: None,
            bases: Default::default(),
            fields: Default::default(),
            methods: Default::default(),
        }
    }

    /// Schema reading map entries.
    pub fn mapping(name: impl ToString) -> Self {
        Self::new(name).access(SourceAccess::Item)
    }

    pub fn access(mut self, access: SourceAccess) -> Self {
        self.access = Some(access);
        self
    }

    pub fn description(mut self, content: impl ToString) -> Self {
        self.description = content.to_string();
        self
    }

    /// Inherits fields and methods. Earlier bases take precedence over later ones.
    pub fn extends(mut self, base: &Arc<Schema>) -> Self {
        self.bases.push(base.clone());
        self
    }

    pub fn field(mut self, name: impl ToString, field: Field) -> Self {
        set_entry(&mut self.fields, name.to_string(), field);
        self
    }

    pub fn method<F>(self, name: impl ToString, f: F) -> Self
    where
        F: Fn(&Serializer, &Object) -> Result<Object> + Send + Sync + 'static,
    {
        self.with_method(name, None, Arc::new(f))
    }

    /// Registers a method along with the documented type of its result.
    pub fn method_returning<F>(self, name: impl ToString, returns: ReturnType, f: F) -> Self
    where
        F: Fn(&Serializer, &Object) -> Result<Object> + Send + Sync + 'static,
    {
        self.with_method(name, Some(returns), Arc::new(f))
    }

    fn with_method(mut self, name: impl ToString, returns: Option<ReturnType>, func: MethodFn) -> Self {
        set_entry(&mut self.methods, name.to_string(), Method { returns, func });
        self
    }

    pub fn build(self) -> Result<Arc<Schema>> {
        let mut fields = vec![];
        let mut methods = vec![];
        for base in self.bases.iter().rev() {
            for (name, field) in base.fields() {
                set_entry(&mut fields, name.to_owned(), field.clone());
            }
            for (name, method) in base.methods() {
                set_entry(&mut methods, name.to_owned(), method.clone());
            }
        }
        for (name, field) in self.fields {
            set_entry(&mut fields, name, field);
        }
        for (name, method) in self.methods {
            set_entry(&mut methods, name, method);
        }
        let access = self
            .access
            .or_else(|| self.bases.first().map(|base| base.access()))
            .unwrap_or_default();
        let mut schema = Schema {
            name: self.name,
            description: self.description,
            access,
            fields,
            methods,
            compiled: vec![],
        };
        let compiled = schema
            .fields
            .iter()
            .map(|(name, field)| compile(name, field, &schema))
            .collect::<Result<Vec<_>>>()?;
        schema.compiled = compiled;
        tracing::debug!(
            schema = %schema.name,
            fields = schema.compiled.len(),
            methods = schema.methods.len(),
            "compiled schema"
        );
        Ok(Arc::new(schema))
    }
}
