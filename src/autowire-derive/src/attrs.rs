use proc_macro::TokenStream;
use syn::parse::{Parse, ParseStream};
use syn::punctuated::Punctuated;
use syn::token::Comma;
use syn::{parenthesized, Error as SynError, Ident, Result as SynResult, Type};

#[derive(Debug, Default)]
pub struct AttributeData {
    pub implements: Vec<Type>,
}

impl Parse for AttributeData {
    fn parse(input: ParseStream) -> SynResult<Self> {
        if input.is_empty() {
            return Ok(Self::default());
        }

        let keyword: Ident = input.parse()?;
        if keyword != "implements" {
            return Err(SynError::new(
                keyword.span(),
                "expects `implements(...)` listing the implemented capabilities",
            ));
        }

        let content;
        parenthesized!(content in input);
        let implements = Punctuated::<Type, Comma>::parse_terminated(&content)?;

        if !input.is_empty() {
            return Err(input.error("unexpected tokens after `implements(...)`"));
        }

        Ok(Self {
            implements: implements.into_iter().collect(),
        })
    }
}

pub fn parse_attributes(attr: TokenStream) -> SynResult<AttributeData> {
    syn::parse::<AttributeData>(attr)
}
