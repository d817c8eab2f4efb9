#![cfg(test)]

use crate::{
    error::Error,
    settings::{self, Settings},
    AsObject, Attributes, Field, FieldType, Number, Object, Primitive, ReturnType, SchemaBuilder,
    SchemaKind, Sequence, Serializer, SerializerOptions,
};
use chrono::NaiveDate;
use rstest::rstest;
use serde::Serialize;
use serde_json::{json, Value};
use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc,
    },
};

use crate as serde_projection;

fn to_json(value: &Primitive) -> Value {
    serde_json::to_value(value).unwrap()
}

fn integer(source: &Object, name: &str) -> serde_projection::Result<i64> {
    let value = source
        .get_attribute(name)
        .ok_or_else(|| Error::MissingAttribute(name.to_owned()))?;
    match value.to_integer()? {
        Number::SignedInteger(v) => Ok(v),
        Number::UnsignedInteger(v) => Ok(v as i64),
        Number::Float(v) => Ok(v as i64),
    }
}

#[derive(Debug, Clone, Attributes)]
struct Author {
    name: String,
    #[attributes(rename = "years")]
    age: u32,
    #[attributes(ignore)]
    #[allow(dead_code)]
    password: String,
}

#[derive(Debug, Clone, Attributes)]
struct Post {
    title: String,
    author: Author,
    tags: Vec<String>,
    published: Option<NaiveDate>,
}

#[derive(Debug, Clone, Attributes)]
struct Pair(i32, #[attributes(rename = "second")] String);

#[derive(Serialize)]
struct Article {
    title: String,
    rating: f32,
    author: Writer,
    tags: Vec<String>,
}

#[derive(Serialize)]
struct Writer {
    name: String,
}

struct Lazy {
    items: Vec<Object>,
    streamed: Arc<AtomicBool>,
}

impl Sequence for Lazy {
    fn items(&self) -> Vec<Object> {
        self.items.clone()
    }

    fn stream(&self) -> Option<Box<dyn Iterator<Item = Object> + '_>> {
        self.streamed.store(true, Ordering::SeqCst);
        Some(Box::new(self.items.iter().cloned()))
    }
}

#[test]
fn test_mapping() {
    let schema = SchemaBuilder::mapping("Foo")
        .field("foo", Field::str())
        .build()
        .unwrap();
    let data = Serializer::new(schema, Object::map().property("foo", "bar"))
        .into_data()
        .unwrap();
    assert_eq!(to_json(&data), json!({ "foo": "bar" }));
}

#[test]
fn test_method() {
    let schema = SchemaBuilder::new("Obj")
        .field("w", Field::int())
        .field("x", Field::method())
        .field("y", Field::str())
        .field("z", Field::int())
        .method("get_x", |_, source| Ok(Object::from(integer(source, "x")? + 10)))
        .build()
        .unwrap();
    let source = Object::structure("Obj")
        .property("w", 1000)
        .property("x", 20)
        .property("y", "hello")
        .property("z", 10);
    let data = schema.serialize(source, false).unwrap();
    assert_eq!(
        to_json(&data),
        json!({ "w": 1000, "x": 30, "y": "hello", "z": 10 })
    );
}

#[test]
fn test_method_named() {
    let schema = SchemaBuilder::new("Obj")
        .field("total", Field::method_named("compute").label("sum"))
        .method("compute", |_, source| {
            Ok(Object::from(integer(source, "a")? + integer(source, "b")?))
        })
        .build()
        .unwrap();
    let source = Object::structure("Obj").property("a", 2).property("b", 3);
    let data = schema.serialize(source, false).unwrap();
    assert_eq!(to_json(&data), json!({ "sum": 5 }));

    let error = SchemaBuilder::new("Obj")
        .field("total", Field::method())
        .build()
        .unwrap_err();
    assert_eq!(
        error,
        Error::MethodNotFound {
            schema: "Obj".to_owned(),
            method: "get_total".to_owned(),
        }
    );
}

#[test]
fn test_method_context() {
    let schema = SchemaBuilder::mapping("Greeting")
        .field("greeting", Field::method())
        .method("get_greeting", |serializer, source| {
            let prefix = serializer
                .context()
                .and_then(|context| context.get_key("prefix"))
                .and_then(|prefix| prefix.as_str())
                .unwrap_or_default()
                .to_owned();
            let name = source
                .get_key("name")
                .ok_or_else(|| Error::MissingKey("name".to_owned()))?
                .to_text()?;
            Ok(Object::from(format!("{}{}", prefix, name)))
        })
        .build()
        .unwrap();
    let serializer = Serializer::new(schema.clone(), Object::map().property("name", "Ada"))
        .with_context(Object::map().property("prefix", "Dr. "));
    assert_eq!(
        to_json(serializer.data().unwrap()),
        json!({ "greeting": "Dr. Ada" })
    );
    let serializer = Serializer::new(schema, Object::map().property("name", "Ada"));
    assert_eq!(
        to_json(serializer.data().unwrap()),
        json!({ "greeting": "Ada" })
    );
}

#[test]
fn test_nested() {
    let child = SchemaBuilder::mapping("Child")
        .field("name", Field::str())
        .build()
        .unwrap();
    let parent = SchemaBuilder::mapping("Parent")
        .field("first", Field::nested(&child))
        .field("children", Field::nested(&child).many(true))
        .build()
        .unwrap();
    let source = Object::map()
        .property("first", Object::map().property("name", "A"))
        .property(
            "children",
            Object::array()
                .item(Object::map().property("name", "A"))
                .item(Object::map().property("name", "B"))
                .item(Object::map().property("name", "C")),
        );
    let data = parent.serialize(source, false).unwrap();
    assert_eq!(
        to_json(&data),
        json!({
            "first": { "name": "A" },
            "children": [
                { "name": "A" },
                { "name": "B" },
                { "name": "C" },
            ],
        })
    );
}

#[test]
fn test_image() {
    let schema = SchemaBuilder::new("Photo")
        .field("image", Field::image_with_base("https://cdn.x/"))
        .field("thumbnail", Field::image_with_base("https://cdn.x/thumbs/"))
        .field("raw", Field::image_with_base(""))
        .build()
        .unwrap();
    let source = Object::structure("Photo")
        .property("image", Object::structure("Image").property("url", "img/1.png"))
        .property("thumbnail", "img/1.png")
        .property("raw", "img/1.png");
    let data = schema.serialize(source, false).unwrap();
    assert_eq!(
        to_json(&data),
        json!({
            "image": "https://cdn.x/img/1.png",
            "thumbnail": "https://cdn.x/thumbs/img/1.png",
            "raw": "img/1.png",
        })
    );
}

#[test]
fn test_image_relative_base() {
    let field = Field::image_with_base("/media/");
    assert_eq!(
        field.to_value(Object::from("img/1.png")).unwrap(),
        Primitive::string("/media/img/1.png")
    );
    let field = Field::image_with_base("media/");
    assert_eq!(
        field.to_value(Object::from("img/1.png")).unwrap(),
        Primitive::string("media/img/1.png")
    );
    assert!(matches!(
        field.to_value(Object::from(42)),
        Err(Error::Coercion { expected: "image url", .. })
    ));
}

#[test]
fn test_optional() {
    let optional = SchemaBuilder::mapping("Foo")
        .field("foo", Field::str())
        .field("bar", Field::str().required(false))
        .build()
        .unwrap();
    let required = SchemaBuilder::mapping("Foo")
        .field("foo", Field::str())
        .field("bar", Field::str())
        .build()
        .unwrap();
    let source = Object::map().property("foo", "x");
    let data = optional.serialize(source.clone(), false).unwrap();
    assert_eq!(to_json(&data), json!({ "foo": "x" }));
    assert!(!data.contains_key("bar"));
    assert_eq!(
        required.serialize(source, false).unwrap_err(),
        Error::MissingKey("bar".to_owned())
    );
}

#[test]
fn test_required_null() {
    let schema = SchemaBuilder::mapping("Foo")
        .field("foo", Field::str())
        .field("bar", Field::str().required(false))
        .build()
        .unwrap();
    let data = schema
        .serialize(Object::map().property("foo", "x").property("bar", Object::Null), false)
        .unwrap();
    assert_eq!(to_json(&data), json!({ "foo": "x", "bar": null }));
    assert_eq!(
        schema
            .serialize(Object::map().property("foo", Object::Null), false)
            .unwrap_err(),
        Error::Coercion {
            expected: "string",
            found: "null",
        }
    );
}

#[test]
fn test_override_order() {
    let base = SchemaBuilder::new("Base")
        .field("a", Field::int())
        .field("b", Field::int())
        .field("c", Field::int())
        .build()
        .unwrap();
    let child = SchemaBuilder::new("Child")
        .extends(&base)
        .field("b", Field::str())
        .field("d", Field::bool())
        .build()
        .unwrap();
    let names = child
        .compiled_fields()
        .iter()
        .map(|field| field.name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["a", "b", "c", "d"]);
    assert_eq!(child.field("b").unwrap().field_type(), FieldType::Str);
    assert_eq!(base.field("b").unwrap().field_type(), FieldType::Int);

    let source = Object::structure("Child")
        .property("a", 1)
        .property("b", 2)
        .property("c", 3)
        .property("d", 4);
    let data = child.serialize(source, false).unwrap();
    assert_eq!(data.keys().collect::<Vec<_>>(), vec!["a", "b", "c", "d"]);
    assert_eq!(
        to_json(&data),
        json!({ "a": 1, "b": "2", "c": 3, "d": true })
    );
}

#[test]
fn test_multiple_bases() {
    let first = SchemaBuilder::mapping("First")
        .field("x", Field::raw().label("from_first"))
        .build()
        .unwrap();
    let second = SchemaBuilder::new("Second")
        .field("x", Field::raw().label("from_second"))
        .field("y", Field::raw())
        .build()
        .unwrap();
    let child = SchemaBuilder::new("Child")
        .extends(&first)
        .extends(&second)
        .build()
        .unwrap();
    let names = child
        .compiled_fields()
        .iter()
        .map(|field| field.name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["from_first", "y"]);
    assert_eq!(child.access(), crate::SourceAccess::Item);
}

#[test]
fn test_duplicate_labels() {
    let schema = SchemaBuilder::mapping("Foo")
        .field("a", Field::raw().label("value"))
        .field("b", Field::raw().label("value"))
        .field("c", Field::raw())
        .build()
        .unwrap();
    let source = Object::map()
        .property("a", 1)
        .property("b", 2)
        .property("c", 3);
    let data = schema.serialize(source, false).unwrap();
    assert_eq!(data.keys().collect::<Vec<_>>(), vec!["value", "c"]);
    assert_eq!(to_json(&data), json!({ "value": 2, "c": 3 }));

    let schema = SchemaBuilder::mapping("Foo")
        .field("a", Field::int().label("value"))
        .field("b", Field::str().label("value"))
        .field("c", Field::bool())
        .build()
        .unwrap();
    let data = schema
        .serialize(Object::map().property("a", 1).property("b", 2).property("c", 3), false)
        .unwrap();
    assert_eq!(to_json(&data), json!({ "value": "2", "c": true }));
    let description = schema.describe(false).unwrap();
    let names = description
        .properties
        .0
        .iter()
        .map(|(name, _)| name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(names, data.keys().collect::<Vec<_>>());
    assert_eq!(
        serde_json::to_value(&description).unwrap()["properties"],
        json!({
            "value": { "type": "string" },
            "c": { "type": "boolean" },
        })
    );

    let schema = SchemaBuilder::mapping("Foo")
        .field("a", Field::int().label("value"))
        .field("b", Field::raw().label("value"))
        .build()
        .unwrap();
    let description = schema.describe(false).unwrap();
    assert!(description.properties.get("value").is_none());
}

#[test]
fn test_memoization() {
    let counter = Arc::new(AtomicUsize::new(0));
    let calls = counter.clone();
    let schema = SchemaBuilder::mapping("Counter")
        .field("count", Field::method())
        .method("get_count", move |_, _| {
            Ok(Object::from(calls.fetch_add(1, Ordering::SeqCst) + 1))
        })
        .build()
        .unwrap();
    let serializer = Serializer::new(schema, Object::map());
    let first = serializer.data().unwrap();
    let second = serializer.data().unwrap();
    assert!(std::ptr::eq(first, second));
    assert_eq!(counter.load(Ordering::SeqCst), 1);
    assert_eq!(to_json(first), json!({ "count": 1 }));
    let data = serializer.into_data().unwrap();
    assert_eq!(to_json(&data), json!({ "count": 1 }));
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[rstest]
#[case(Object::Null)]
#[case(Object::map())]
#[case(Object::map().property("foo", "bar"))]
#[case(Object::array().item(1))]
fn test_input_data_rejected(#[case] data: Object) {
    let schema = SchemaBuilder::mapping("Foo")
        .field("foo", Field::str())
        .build()
        .unwrap();
    let result = Serializer::with_options(
        schema,
        SerializerOptions {
            data: Some(data),
            ..Default::default()
        },
    );
    assert_eq!(result.unwrap_err(), Error::InputValidationUnsupported);
}

#[test]
fn test_options() {
    let schema = SchemaBuilder::mapping("Foo")
        .field("foo", Field::int())
        .build()
        .unwrap();
    let serializer = Serializer::with_options(
        schema,
        SerializerOptions {
            instance: Object::array()
                .item(Object::map().property("foo", 1))
                .item(Object::map().property("foo", "2")),
            many: true,
            context: Some(Object::from("request")),
            ..Default::default()
        },
    )
    .unwrap();
    assert!(serializer.is_many());
    assert_eq!(serializer.context(), Some(&Object::from("request")));
    assert_eq!(
        to_json(serializer.data().unwrap()),
        json!([{ "foo": 1 }, { "foo": 2 }])
    );
}

#[test]
fn test_many_stream() {
    let schema = SchemaBuilder::mapping("Foo")
        .field("foo", Field::str())
        .build()
        .unwrap();
    let streamed = Arc::new(AtomicBool::new(false));
    let source = Object::sequence(Lazy {
        items: vec![
            Object::map().property("foo", "a"),
            Object::map().property("foo", "b"),
        ],
        streamed: streamed.clone(),
    });
    let data = schema.serialize(source, true).unwrap();
    assert!(streamed.load(Ordering::SeqCst));
    assert_eq!(to_json(&data), json!([{ "foo": "a" }, { "foo": "b" }]));

    assert_eq!(
        schema.serialize(Object::map(), true).unwrap_err(),
        Error::NotIterable("map")
    );
}

#[test]
fn test_call() {
    let schema = SchemaBuilder::new("Foo")
        .field("name", Field::str().call(true))
        .build()
        .unwrap();
    let source = Object::structure("Foo").property(
        "name",
        Object::callable(|| Ok(Object::from("computed"))),
    );
    let data = schema.serialize(source, false).unwrap();
    assert_eq!(to_json(&data), json!({ "name": "computed" }));

    let source = Object::structure("Foo").property("name", "plain");
    assert_eq!(
        schema.serialize(source, false).unwrap_err(),
        Error::NotCallable("name".to_owned())
    );
}

#[test]
fn test_list() {
    let schema = SchemaBuilder::new("Foo")
        .field("names", Field::list("name", FieldType::Str).unwrap())
        .build()
        .unwrap();
    let source = Object::structure("Foo").property(
        "names",
        Object::array()
            .item(Object::structure("Item").property("name", "a"))
            .item("b")
            .item(Object::structure("Item").property("name", "c")),
    );
    let data = schema.serialize(source, false).unwrap();
    assert_eq!(to_json(&data), json!({ "names": ["a", "b", "c"] }));

    assert_eq!(
        Field::list("name", FieldType::Nested).unwrap_err(),
        Error::ListElementUndocumented(FieldType::Nested)
    );
    assert_eq!(
        Field::list("name", FieldType::Raw).unwrap_err(),
        Error::ListElementUndocumented(FieldType::Raw)
    );
}

#[test]
fn test_settings() {
    Settings::configure(Settings::default().image_field_domain("https://img.example/"));
    let image = Field::image();
    let list = Field::list("photo", FieldType::Image).unwrap();
    let explicit = Field::image_with_base("https://cdn.x/");
    assert_eq!(settings::image_base_url(), "https://img.example/");
    Settings::configure(Settings::default());
    assert_eq!(settings::image_base_url(), "");

    assert_eq!(
        image.to_value(Object::from("a.png")).unwrap(),
        Primitive::string("https://img.example/a.png")
    );
    assert_eq!(
        explicit.to_value(Object::from("a.png")).unwrap(),
        Primitive::string("https://cdn.x/a.png")
    );
    let photos = Object::array()
        .item(
            Object::structure("Entry")
                .property("photo", Object::structure("Photo").property("url", "a.png")),
        )
        .item(Object::structure("Entry").property("photo", "b.png"));
    assert_eq!(
        to_json(&list.to_value(photos).unwrap()),
        json!(["https://img.example/a.png", "https://img.example/b.png"])
    );
    assert_eq!(
        Field::image().to_value(Object::from("a.png")).unwrap(),
        Primitive::string("a.png")
    );
}

#[test]
fn test_dates() {
    let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
    let datetime = date.and_hms_micro_opt(13, 4, 5, 123456).unwrap();
    let schema = SchemaBuilder::mapping("Event")
        .field("day", Field::date())
        .field("at", Field::datetime())
        .field(
            "local",
            Field::date().attr("day").date_format("%d/%m/%Y").unwrap(),
        )
        .field("missing", Field::date())
        .field("empty", Field::datetime())
        .build()
        .unwrap();
    let source = Object::map()
        .property("day", date)
        .property("at", datetime)
        .property("missing", Object::Null)
        .property("empty", "");
    let data = schema.serialize(source, false).unwrap();
    assert_eq!(
        to_json(&data),
        json!({
            "day": "2024-03-05",
            "at": "2024-03-05T13:04:05.123456Z",
            "local": "05/03/2024",
            "missing": null,
            "empty": null,
        })
    );

    assert_eq!(
        Field::date().date_format("%!").unwrap_err(),
        Error::InvalidDateFormat("%!".to_owned())
    );
    assert_eq!(
        Field::str().date_format("%Y").unwrap_err(),
        Error::DateFormatUnsupported(FieldType::Str)
    );
    assert!(matches!(
        Field::date().to_value(Object::from(42)),
        Err(Error::Coercion { expected: "date", .. })
    ));
}

#[test]
fn test_dotted_attribute() {
    let schema = SchemaBuilder::new("Post")
        .field("author", Field::str().attr("author.name"))
        .field("editor", Field::str().attr("editor.name").required(false))
        .build()
        .unwrap();
    let source = Object::structure("Post")
        .property("author", Object::structure("Author").property("name", "Ada"));
    let data = schema.serialize(source, false).unwrap();
    assert_eq!(to_json(&data), json!({ "author": "Ada" }));
}

#[test]
fn test_item_access_on_struct() {
    let schema = SchemaBuilder::mapping("Foo")
        .field("foo", Field::str().required(false))
        .build()
        .unwrap();
    assert_eq!(
        schema
            .serialize(Object::structure("Foo").property("foo", "bar"), false)
            .unwrap_err(),
        Error::Coercion {
            expected: "map",
            found: "struct",
        }
    );
}

#[test]
fn test_custom() {
    let schema = SchemaBuilder::new("Foo")
        .field(
            "shout",
            Field::custom(|value| Ok(Primitive::string(value.to_text()?.to_uppercase())))
                .attr("name"),
        )
        .field(
            "initial",
            Field::str().getter(|source| {
                let name = source
                    .get_attribute("name")
                    .ok_or_else(|| Error::MissingAttribute("name".to_owned()))?
                    .to_text()?;
                Ok(Object::from(name.chars().next().map(String::from)))
            }),
        )
        .field("name", Field::raw())
        .build()
        .unwrap();
    let compiled = schema.compiled_fields();
    assert!(compiled[0].transform.is_some());
    assert!(compiled[1].transform.is_some());
    assert!(compiled[2].transform.is_none());
    let source = Object::structure("Foo").property("name", "ada");
    let data = schema.serialize(source, false).unwrap();
    assert_eq!(
        to_json(&data),
        json!({ "shout": "ADA", "initial": "a", "name": "ada" })
    );
}

#[rstest]
#[case(Field::int(), Object::from("42"), json!(42))]
#[case(Field::int(), Object::from(" -7 "), json!(-7))]
#[case(Field::int(), Object::from(3.9), json!(3))]
#[case(Field::int(), Object::from(true), json!(1))]
#[case(Field::int(), Object::from(-2.5), json!(-2))]
#[case(Field::int(), Object::from(1e19), json!(10_000_000_000_000_000_000u64))]
#[case(Field::float(), Object::from("2.5"), json!(2.5))]
#[case(Field::float(), Object::from(2), json!(2.0))]
#[case(Field::str(), Object::from(12), json!("12"))]
#[case(Field::str(), Object::from(false), json!("false"))]
#[case(Field::bool(), Object::from(""), json!(false))]
#[case(Field::bool(), Object::from("x"), json!(true))]
#[case(Field::bool(), Object::from(0), json!(false))]
#[case(Field::bool(), Object::Null, json!(false))]
#[case(Field::raw(), Object::array().item(1).item("a"), json!([1, "a"]))]
fn test_coercion(#[case] field: Field, #[case] value: Object, #[case] expected: Value) {
    assert_eq!(to_json(&field.to_value(value).unwrap()), expected);
}

#[rstest]
#[case(Field::int(), Object::from("abc"))]
#[case(Field::int(), Object::from(f64::NAN))]
#[case(Field::int(), Object::from(1e30))]
#[case(Field::int(), Object::from(-1e30))]
#[case(Field::float(), Object::array())]
#[case(Field::str(), Object::Null)]
#[case(Field::str(), Object::map())]
fn test_coercion_failure(#[case] field: Field, #[case] value: Object) {
    assert!(matches!(
        field.to_value(value),
        Err(Error::Coercion { .. })
    ));
}

#[test]
fn test_unrepresentable() {
    let schema = SchemaBuilder::mapping("Foo")
        .field("foo", Field::raw())
        .build()
        .unwrap();
    let source = Object::map().property("foo", Object::callable(|| Ok(Object::Null)));
    assert_eq!(
        schema.serialize(source, false).unwrap_err(),
        Error::Unrepresentable("callable")
    );
}

#[test]
fn test_describe() {
    let child = SchemaBuilder::mapping("Child")
        .field("name", Field::str())
        .build()
        .unwrap();
    let schema = SchemaBuilder::mapping("Parent")
        .description("A parent with children.")
        .field("title", Field::str().label("heading"))
        .field("count", Field::int())
        .field("ratio", Field::float())
        .field("active", Field::bool())
        .field("payload", Field::raw())
        .field(
            "typed",
            Field::raw().with_schema_type(SchemaKind::Number).unwrap(),
        )
        .field("tags", Field::list("name", FieldType::Str).unwrap())
        .field("born", Field::date())
        .field("children", Field::nested(&child).many(true))
        .field("total", Field::method())
        .field("scores", Field::method())
        .field("best", Field::method())
        .method_returning(
            "get_total",
            ReturnType::Primitive(SchemaKind::Integer),
            |_, _| Ok(Object::from(0)),
        )
        .method_returning(
            "get_scores",
            ReturnType::Sequence(SchemaKind::Number),
            |_, _| Ok(Object::array()),
        )
        .method_returning(
            "get_best",
            ReturnType::Nested {
                schema: child.clone(),
                many: false,
            },
            |_, _| Ok(Object::Null),
        )
        .build()
        .unwrap();
    let description = serde_json::to_value(schema.describe(false).unwrap()).unwrap();
    let child_description = json!({
        "type": "object",
        "title": "Child",
        "properties": { "name": { "type": "string" } },
    });
    assert_eq!(
        description,
        json!({
            "type": "object",
            "title": "Parent",
            "description": "A parent with children.",
            "properties": {
                "heading": { "type": "string" },
                "count": { "type": "integer" },
                "ratio": { "type": "number" },
                "active": { "type": "boolean" },
                "typed": { "type": "number" },
                "tags": { "type": "array", "items": { "type": "string" } },
                "born": { "type": "string" },
                "children": {
                    "type": "array",
                    "title": "Child",
                    "items": {
                        "type": "object",
                        "properties": { "name": { "type": "string" } },
                    },
                },
                "total": { "type": "integer" },
                "scores": { "type": "array", "items": { "type": "number" } },
                "best": child_description,
            },
        })
    );

    let description = child.describe(true).unwrap();
    assert_eq!(
        serde_json::to_value(&description).unwrap(),
        json!({
            "type": "array",
            "title": "Child",
            "items": {
                "type": "object",
                "properties": { "name": { "type": "string" } },
            },
        })
    );
    assert!(description.properties.is_empty());
    let items = description.items.unwrap();
    assert_eq!(items.kind, SchemaKind::Object);
    assert_eq!(items.properties.len(), 1);
    assert_eq!(
        items.properties.get("name").map(|item| item.kind),
        Some(SchemaKind::String)
    );
}

#[test]
fn test_describe_errors() {
    let schema = SchemaBuilder::new("Foo")
        .field("total", Field::method())
        .method("get_total", |_, _| Ok(Object::from(0)))
        .build()
        .unwrap();
    assert_eq!(
        schema.describe(false).unwrap_err(),
        Error::MissingReturnType {
            schema: "Foo".to_owned(),
            field: "total".to_owned(),
        }
    );
    assert_eq!(
        schema.serialize(Object::structure("Foo"), false).unwrap(),
        Primitive::map().property("total", 0)
    );
    assert_eq!(
        Field::method()
            .with_schema_type(SchemaKind::String)
            .unwrap_err(),
        Error::MethodSchemaType
    );
}

#[test]
fn test_serde_bridge() {
    let article = Article {
        title: "Hello".to_owned(),
        rating: 4.5,
        author: Writer {
            name: "Ada".to_owned(),
        },
        tags: vec!["rust".to_owned(), "serde".to_owned()],
    };
    let schema = SchemaBuilder::new("Article")
        .field("title", Field::str())
        .field("rating", Field::float())
        .field("author", Field::str().attr("author.name"))
        .field("tags", Field::list("name", FieldType::Str).unwrap())
        .build()
        .unwrap();
    let source = crate::to_object(&article).unwrap();
    assert_eq!(
        source.get_attribute("title"),
        Some(Object::String("Hello".to_owned()))
    );
    let data = schema.serialize(source, false).unwrap();
    assert_eq!(
        to_json(&data),
        json!({
            "title": "Hello",
            "rating": 4.5,
            "author": "Ada",
            "tags": ["rust", "serde"],
        })
    );

    let mut map = BTreeMap::new();
    map.insert("foo", 1);
    map.insert("bar", 2);
    let schema = SchemaBuilder::mapping("Map")
        .field("foo", Field::int())
        .field("bar", Field::str())
        .build()
        .unwrap();
    let data = schema
        .serialize(crate::to_object(&map).unwrap(), false)
        .unwrap();
    assert_eq!(to_json(&data), json!({ "foo": 1, "bar": "2" }));
    assert_eq!(
        schema.serialize(map.as_object(), false).unwrap(),
        data
    );
}

#[test]
fn test_derive() {
    let post = Post {
        title: "Hello".to_owned(),
        author: Author {
            name: "Ada".to_owned(),
            age: 36,
            password: "secret".to_owned(),
        },
        tags: vec!["a".to_owned(), "b".to_owned()],
        published: None,
    };
    assert_eq!(post.attribute("password"), None);
    assert_eq!(post.author.attribute("age"), None);
    assert_eq!(post.author.attribute("years"), Some(Object::from(36u32)));

    let author = SchemaBuilder::new("Author")
        .field("name", Field::str())
        .field("years", Field::int())
        .field("password", Field::str().required(false))
        .build()
        .unwrap();
    let schema = SchemaBuilder::new("Post")
        .field("title", Field::str())
        .field("author", Field::nested(&author))
        .field("author_name", Field::str().attr("author.name"))
        .field("tags", Field::raw())
        .field("published", Field::date().required(false))
        .build()
        .unwrap();
    let data = schema.serialize(post.as_object(), false).unwrap();
    assert_eq!(
        to_json(&data),
        json!({
            "title": "Hello",
            "author": { "name": "Ada", "years": 36 },
            "author_name": "Ada",
            "tags": ["a", "b"],
            "published": null,
        })
    );

    let pair = Pair(7, "x".to_owned());
    assert_eq!(pair.attribute("0"), Some(Object::from(7)));
    assert_eq!(pair.attribute("second"), Some(Object::from("x")));
    assert_eq!(pair.attribute("1"), None);
}

#[test]
fn test_debug() {
    let schema = SchemaBuilder::mapping("Foo")
        .field("foo", Field::str())
        .build()
        .unwrap();
    let serializer = Serializer::new(schema.clone(), Object::map().property("foo", "bar"));
    let text = format!("{:?}", serializer);
    assert!(text.contains("Serializer"));
    assert!(text.contains("Foo"));
    let text = format!("{:?}", schema);
    assert!(text.contains("Item(\"foo\")"));
}
