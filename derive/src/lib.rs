extern crate proc_macro;

mod attributes;

use proc_macro::TokenStream;

/// Exposes struct fields as attributes of a `serde_projection::Object`.
///
/// Fields support `#[attributes(ignore)]` and `#[attributes(rename = "name")]`.
/// Unless the type is marked with `#[attributes(manual_as_object)]`, an
/// `AsObject` implementation wrapping a clone of the value is derived too.
#[proc_macro_derive(Attributes, attributes(attributes))]
pub fn derive_attributes(input: TokenStream) -> TokenStream {
    crate::attributes::derive_attributes(input)
}
