use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::{quote, ToTokens};
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::token::Comma;
use syn::visit_mut::{self, VisitMut};
use syn::{
    AngleBracketedGenericArguments, Attribute, Error as SynError, Expr, FnArg, GenericArgument,
    Ident, ImplItem, ImplItemFn, ItemImpl, Meta, Pat, PathArguments, Result as SynResult,
    ReturnType, Signature, Type, TypePath,
};

use crate::attrs::AttributeData;

const RETURN_TYPE_MESSAGE: &str = "a constructor's return type should be `Self` or `Result<Self, E>`";

#[derive(Debug)]
enum ConstructorData {
    /// No associated function is annotated with `#[inject]`.
    Implicit,
    Declared {
        identifier: Ident,
        parameters: Vec<ParameterData>,
        return_type: ReturnTypeData,
    },
}

#[derive(Debug)]
struct ParameterData {
    span: Span,
    name: String,
    ty: Type,
    default: Option<Expr>,
}

#[derive(Debug)]
enum ReturnTypeData {
    Infallible,
    Result { error_type: TypePath },
}

struct AttributeRemovalVisitor;

impl AttributeRemovalVisitor {
    fn is_custom_attribute(attr: &Attribute) -> bool {
        match &attr.meta {
            Meta::Path(path) => path.is_ident("inject"),
            Meta::List(list) => list.path.is_ident("default"),
            Meta::NameValue(_) => false,
        }
    }
}

impl VisitMut for AttributeRemovalVisitor {
    fn visit_attributes_mut(&mut self, attrs: &mut Vec<Attribute>) {
        attrs.retain(|attr| !Self::is_custom_attribute(attr));
        attrs
            .iter_mut()
            .for_each(|attr| visit_mut::visit_attribute_mut(self, attr));
    }
}

pub fn expand_implementation(
    impls: TokenStream,
    attr_data: AttributeData,
) -> SynResult<TokenStream2> {
    let mut impls = match syn::parse::<ItemImpl>(impls) {
        Ok(impls) => impls,
        Err(err) => {
            return Err(SynError::new(
                err.span(),
                "`#[component]` should be annotated on the `impl` block",
            ))
        }
    };

    if let Some((_, path, _)) = &impls.trait_ {
        return Err(SynError::new(
            path.span(),
            "`#[component]` should be annotated on an inherent `impl` block",
        ));
    }

    let self_type = get_self_type(&impls)?;
    let ctor_data = match get_constructor_signature(&impls.items, impls.span())? {
        Some(signature) => parse_constructor(&self_type, signature)?,
        None => ConstructorData::Implicit,
    };

    let service = expand_service_implementation(&impls, &attr_data);
    let component = expand_component_implementation(&impls, &ctor_data);

    let mut visitor = AttributeRemovalVisitor;
    visitor.visit_item_impl_mut(&mut impls);

    Ok(quote! {
        #impls
        #service
        #component
    })
}

fn get_self_type(impls: &ItemImpl) -> SynResult<TypePath> {
    if let Type::Path(ty) = impls.self_ty.as_ref() {
        Ok(ty.clone())
    } else {
        Err(SynError::new(impls.self_ty.span(), "invalid self type"))
    }
}

fn get_constructor_signature(
    items: &[ImplItem],
    impl_span: Span,
) -> SynResult<Option<Signature>> {
    let ctors: Vec<_> = items
        .iter()
        .filter_map(filter_and_map_item_fn)
        .filter(is_annotated_with_inject)
        .collect();

    if ctors.len() > 1 {
        return Err(SynError::new(
            impl_span,
            "only one associated function can be annotated with `#[inject]`",
        ));
    }
    let Some(&ctor) = ctors.first() else {
        return Ok(None);
    };

    if let Some(FnArg::Receiver(rec)) = ctor.sig.inputs.first() {
        return Err(SynError::new(
            rec.span(),
            "method is not allowed to be annotated with `#[inject]`",
        ));
    }

    Ok(Some(ctor.sig.clone()))
}

fn filter_and_map_item_fn(item: &ImplItem) -> Option<&ImplItemFn> {
    if let ImplItem::Fn(impl_fn) = item {
        Some(impl_fn)
    } else {
        None
    }
}

fn is_annotated_with_inject(item_fn: &&ImplItemFn) -> bool {
    item_fn.attrs.iter().any(|attr| {
        let content = attr.meta.to_token_stream().to_string();
        &content == "inject"
    })
}

fn parse_constructor(self_type: &TypePath, signature: Signature) -> SynResult<ConstructorData> {
    let identifier = signature.ident;
    let parameters = parse_constructor_parameters(signature.inputs)?;
    let return_type = parse_constructor_return_type(signature.output, self_type)?;

    Ok(ConstructorData::Declared {
        identifier,
        parameters,
        return_type,
    })
}

fn parse_constructor_parameters(
    inputs: Punctuated<FnArg, Comma>,
) -> SynResult<Vec<ParameterData>> {
    inputs
        .into_iter()
        .enumerate()
        .map(|(i, arg)| {
            let FnArg::Typed(arg) = arg else {
                unreachable!("a constructor should not have a receiver argument");
            };
            let name = match arg.pat.as_ref() {
                Pat::Ident(pat) => pat.ident.to_string(),
                _ => format!("arg{i}"),
            };
            Ok(ParameterData {
                span: arg.span(),
                name,
                default: parse_default_attribute(&arg.attrs)?,
                ty: *arg.ty,
            })
        })
        .collect()
}

fn parse_default_attribute(attrs: &[Attribute]) -> SynResult<Option<Expr>> {
    let mut res = None;

    for attr in attrs {
        match &attr.meta {
            Meta::List(list) if list.path.is_ident("default") => {
                if res.is_some() {
                    return Err(SynError::new(
                        list.path.span(),
                        "only one `#[default(...)]` is allowed on a parameter",
                    ));
                }
                res = Some(list.parse_args::<Expr>()?);
            }
            Meta::Path(path) if path.is_ident("default") => {
                return Err(SynError::new(
                    path.span(),
                    "expects `#[default(...)]` to receive the default value",
                ));
            }
            Meta::NameValue(nv) if nv.path.is_ident("default") => {
                return Err(SynError::new(
                    nv.path.span(),
                    "expects `#[default(...)]` to receive the default value",
                ));
            }
            _ => {}
        }
    }

    Ok(res)
}

fn parse_constructor_return_type(
    output: ReturnType,
    self_type: &TypePath,
) -> SynResult<ReturnTypeData> {
    let ReturnType::Type(_, return_type) = output else {
        return Err(SynError::new(output.span(), RETURN_TYPE_MESSAGE));
    };
    let Type::Path(return_type) = *return_type else {
        return Err(SynError::new(return_type.span(), RETURN_TYPE_MESSAGE));
    };

    let segments = &return_type.path.segments;
    let last = segments.last();

    if &return_type == self_type || return_type.path.is_ident("Self") {
        Ok(ReturnTypeData::Infallible)
    } else if let Some(last) = last.filter(|last| last.ident == "Result") {
        let is_result_path = segments.len() == 1
            || (segments.len() == 3
                && segments[0].ident == "std"
                && segments[1].ident == "result");
        if is_result_path {
            parse_result_return_type(&last.arguments, self_type)
        } else {
            Err(SynError::new(return_type.span(), RETURN_TYPE_MESSAGE))
        }
    } else {
        Err(SynError::new(return_type.span(), RETURN_TYPE_MESSAGE))
    }
}

fn parse_result_return_type(
    type_args: &PathArguments,
    self_type: &TypePath,
) -> SynResult<ReturnTypeData> {
    let PathArguments::AngleBracketed(AngleBracketedGenericArguments {
        args: type_args, ..
    }) = type_args
    else {
        return Err(SynError::new(type_args.span(), RETURN_TYPE_MESSAGE));
    };

    if type_args.len() != 2 {
        return Err(SynError::new(type_args.span(), RETURN_TYPE_MESSAGE));
    }
    let (
        Some(GenericArgument::Type(Type::Path(first_type))),
        Some(GenericArgument::Type(Type::Path(error_type))),
    ) = (type_args.first(), type_args.last())
    else {
        return Err(SynError::new(type_args.span(), RETURN_TYPE_MESSAGE));
    };

    if first_type == self_type || first_type.path.is_ident("Self") {
        Ok(ReturnTypeData::Result {
            error_type: error_type.clone(),
        })
    } else {
        Err(SynError::new(type_args.span(), RETURN_TYPE_MESSAGE))
    }
}

fn expand_service_implementation(impls: &ItemImpl, attr_data: &AttributeData) -> TokenStream2 {
    let self_type = &impls.self_ty;
    let (impl_generics, _, where_clause) = impls.generics.split_for_impl();
    let implements = &attr_data.implements;

    quote! {
        impl #impl_generics ::autowire::instance::Service for #self_type #where_clause {
            fn ancestors() -> ::std::vec::Vec<::autowire::identifier::Identifier> {
                ::std::vec![
                    #(::autowire::identifier::Identifier::of::<#implements>(),)*
                ]
            }

            fn views() -> ::std::vec::Vec<::autowire::instance::View> {
                ::std::vec![
                    #(
                        ::autowire::instance::View::new::<
                            ::std::sync::Arc<Self>,
                            ::std::sync::Arc<#implements>,
                        >(|this| {
                            ::std::option::Option::Some(
                                ::std::sync::Arc::clone(this) as ::std::sync::Arc<#implements>
                            )
                        }),
                    )*
                ]
            }
        }
    }
}

fn expand_component_implementation(impls: &ItemImpl, ctor_data: &ConstructorData) -> TokenStream2 {
    let self_type = &impls.self_ty;
    let (impl_generics, _, where_clause) = impls.generics.split_for_impl();

    let (associated_type_error, parameters_body, construct_body) = match ctor_data {
        ConstructorData::Implicit => (
            quote! { type Error = ::std::convert::Infallible; },
            quote! { ::std::option::Option::None },
            quote! {
                let _ = arguments;
                ::std::result::Result::Ok(::std::result::Result::Ok(
                    <Self as ::std::default::Default>::default()
                ))
            },
        ),
        ConstructorData::Declared {
            identifier,
            parameters,
            return_type,
        } => {
            let associated_type_error = match return_type {
                ReturnTypeData::Result { error_type } => quote! { type Error = #error_type; },
                ReturnTypeData::Infallible => quote! { type Error = ::std::convert::Infallible; },
            };

            let descriptions = parameters.iter().enumerate().map(|(i, param)| {
                let ty = &param.ty;
                let name = &param.name;
                let default = param
                    .default
                    .as_ref()
                    .map(|default| quote! { .with_default(#default) });
                quote! {
                    ::autowire::descriptor::Parameter::of::<#ty>(#name, #i) #default
                }
            });

            let take_statements = parameters
                .iter()
                .enumerate()
                .map(|(i, param)| {
                    let arg = Ident::new(&format!("arg{i}"), param.span);
                    let ty = &param.ty;
                    quote! { let #arg = arguments.take::<#ty>(#i)?; }
                })
                .collect::<TokenStream2>();

            let args = parameters
                .iter()
                .enumerate()
                .map(|(i, param)| {
                    let arg = Ident::new(&format!("arg{i}"), param.span);
                    quote! { #arg, }
                })
                .collect::<TokenStream2>();

            let wire_args = match return_type {
                ReturnTypeData::Infallible => quote! {
                    ::std::result::Result::Ok(::std::result::Result::Ok(Self::#identifier(#args)))
                },
                ReturnTypeData::Result { .. } => quote! {
                    ::std::result::Result::Ok(Self::#identifier(#args))
                },
            };

            (
                associated_type_error,
                quote! { ::std::option::Option::Some(::std::vec![#(#descriptions),*]) },
                quote! {
                    #take_statements
                    #wire_args
                },
            )
        }
    };

    quote! {
        impl #impl_generics ::autowire::component::Component for #self_type #where_clause {
            #associated_type_error

            fn parameters() -> ::std::option::Option<
                ::std::vec::Vec<::autowire::descriptor::Parameter>
            > {
                #parameters_body
            }

            #[allow(unused_mut)]
            fn construct(mut arguments: ::autowire::value::Arguments) -> ::std::result::Result<
                ::std::result::Result<Self, Self::Error>,
                ::autowire::value::ArgumentError
            > {
                #construct_body
            }
        }
    }
}
