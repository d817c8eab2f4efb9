use proc_macro::TokenStream;
use quote::{quote, ToTokens};
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Fields, Index, Lit, Meta, NestedMeta};

#[derive(Debug, Default)]
struct TypeAttribs {
    manual_as_object: bool,
}

#[derive(Debug, Default)]
struct FieldAttribs {
    ignore: bool,
    rename: Option<String>,
}

pub fn derive_attributes(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);
    let attribs = parse_type_attribs(&ast.attrs);
    let name = &ast.ident;
    let (impl_generics, ty_generics, where_clause) = ast.generics.split_for_impl();
    let arms = match &ast.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => fields
                .named
                .iter()
                .filter_map(|field| {
                    let attribs = parse_field_attribs(&field.attrs);
                    if attribs.ignore {
                        return None;
                    }
                    let ident = field.ident.as_ref()?;
                    let key = attribs.rename.unwrap_or_else(|| ident.to_string());
                    Some(quote! {
                        #key => Some(serde_projection::AsObject::as_object(&self.#ident)),
                    })
                })
                .collect::<Vec<_>>(),
            Fields::Unnamed(fields) => fields
                .unnamed
                .iter()
                .enumerate()
                .filter_map(|(index, field)| {
                    let attribs = parse_field_attribs(&field.attrs);
                    if attribs.ignore {
                        return None;
                    }
                    let tuple_index = Index::from(index);
                    let key = attribs.rename.unwrap_or_else(|| index.to_string());
                    Some(quote! {
                        #key => Some(serde_projection::AsObject::as_object(&self.#tuple_index)),
                    })
                })
                .collect::<Vec<_>>(),
            Fields::Unit => vec![],
        },
        _ => panic!("Attributes can be derived only for structs"),
    };
    let as_object = if attribs.manual_as_object {
        quote! {}
    } else {
        quote! {
            impl #impl_generics serde_projection::AsObject for #name #ty_generics #where_clause {
                fn as_object(&self) -> serde_projection::Object {
                    serde_projection::Object::record(Clone::clone(self))
                }
            }
        }
    };
    quote! {
        impl #impl_generics serde_projection::Attributes for #name #ty_generics #where_clause {
            #[allow(unused_variables)]
            fn attribute(&self, name: &str) -> Option<serde_projection::Object> {
                match name {
                    #( #arms )*
                    _ => None,
                }
            }
        }

        #as_object
    }
    .into()
}

fn parse_type_attribs(attrs: &[Attribute]) -> TypeAttribs {
    let mut result = TypeAttribs::default();
    for attrib in attrs {
        match attrib.parse_meta() {
            Err(error) => panic!(
                "Could not parse attribute `{}`: {:?}",
                attrib.to_token_stream(),
                error
            ),
            Ok(Meta::List(meta)) => {
                if meta.path.is_ident("attributes") {
                    for meta in meta.nested {
                        if let NestedMeta::Meta(Meta::Path(path)) = &meta {
                            if path.is_ident("manual_as_object") {
                                result.manual_as_object = true;
                            }
                        }
                    }
                }
            }
            _ => {}
        }
    }
    result
}

fn parse_field_attribs(attrs: &[Attribute]) -> FieldAttribs {
    let mut result = FieldAttribs::default();
    for attrib in attrs {
        match attrib.parse_meta() {
            Err(error) => panic!(
                "Could not parse attribute `{}`: {:?}",
                attrib.to_token_stream(),
                error
            ),
            Ok(Meta::List(meta)) => {
                if meta.path.is_ident("attributes") {
                    for meta in meta.nested {
                        match &meta {
                            NestedMeta::Meta(Meta::Path(path)) => {
                                if path.is_ident("ignore") {
                                    result.ignore = true;
                                }
                            }
                            NestedMeta::Meta(Meta::NameValue(meta)) => {
                                if meta.path.is_ident("rename") {
                                    if let Lit::Str(value) = &meta.lit {
                                        result.rename = Some(value.value());
                                    }
                                }
                            }
                            _ => {}
                        }
                    }
                }
            }
            _ => {}
        }
    }
    result
}
