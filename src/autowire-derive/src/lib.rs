mod attrs;
mod impls;

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use syn::Result as SynResult;

/// Turns the annotated `impl` block's type into a component.
///
/// The associated function annotated with `#[inject]` becomes the
/// constructor, and each of its parameters is autowired from its type. A
/// parameter can be made optional with `#[default(value)]`. Without an
/// `#[inject]` function, the component is built through [`Default`].
///
/// `#[component(implements(dyn A, dyn B))]` declares the capabilities the
/// type implements, which become aliases once the component is constructed.
#[proc_macro_attribute]
pub fn component(attr: TokenStream, item: TokenStream) -> TokenStream {
    match component_impl(attr, item) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.into_compile_error().into(),
    }
}

fn component_impl(attr: TokenStream, item: TokenStream) -> SynResult<TokenStream2> {
    let attr_data = attrs::parse_attributes(attr)?;
    let expanded = impls::expand_implementation(item, attr_data)?;
    Ok(expanded)
}
