//! Accessor contract macro for `propconf`.
use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::{format_ident, quote};
use syn::spanned::Spanned;
use syn::*;

const META_METHODS: &[&str] = &["get_keys", "getKeys"];

#[derive(Default)]
struct MethodAttr {
    key: Option<String>,
    converter: Option<Type>,
}

enum ReturnKind {
    Meta,
    Value(Type),
    Optional(Type),
}

struct Method {
    sig: Signature,
    attr: MethodAttr,
    kind: ReturnKind,
}

fn parse_method_attr(attrs: &mut Vec<Attribute>) -> Result<MethodAttr> {
    let mut ma = MethodAttr::default();
    let mut kept = vec![];
    for attr in attrs.drain(..) {
        if !attr.path.is_ident("config") {
            kept.push(attr);
            continue;
        }
        let list = match attr.parse_meta()? {
            Meta::List(list) => list,
            m => return Err(Error::new(m.span(), "Expect #[config(key = \"..\")]")),
        };
        for nested in list.nested {
            let nv = match nested {
                NestedMeta::Meta(Meta::NameValue(nv)) => nv,
                n => return Err(Error::new(n.span(), "Only support key/converter")),
            };
            let value = match &nv.lit {
                Lit::Str(s) => s,
                l => return Err(Error::new(l.span(), "Please use string value")),
            };
            if nv.path.is_ident("key") {
                ma.key = Some(value.value());
            } else if nv.path.is_ident("converter") {
                ma.converter = Some(value.parse::<Type>()?);
            } else {
                return Err(Error::new(nv.path.span(), "Only support key/converter"));
            }
        }
    }
    *attrs = kept;
    Ok(ma)
}

/// Type arguments of the last path segment, if the segment is `name`.
fn generic_args<'a>(ty: &'a Type, name: &str) -> Option<Vec<&'a Type>> {
    let path = match ty {
        Type::Path(TypePath { qself: None, path }) => path,
        _ => return None,
    };
    let seg = path.segments.last()?;
    if seg.ident != name {
        return None;
    }
    match &seg.arguments {
        PathArguments::AngleBracketed(args) => Some(
            args.args
                .iter()
                .filter_map(|a| match a {
                    GenericArgument::Type(t) => Some(t),
                    _ => None,
                })
                .collect(),
        ),
        _ => None,
    }
}

fn is_key_set(ty: &Type) -> bool {
    match generic_args(ty, "HashSet") {
        Some(args) if args.len() == 1 => match args[0] {
            Type::Path(TypePath { qself: None, path }) => path.is_ident("String"),
            _ => false,
        },
        _ => false,
    }
}

fn return_kind(sig: &Signature) -> Result<ReturnKind> {
    let name = sig.ident.to_string();
    let ty = match &sig.output {
        ReturnType::Type(_, ty) => ty,
        ReturnType::Default => {
            return Err(Error::new(
                sig.span(),
                "Accessor must return Result<T, E> or Result<Option<T>, E>",
            ))
        }
    };
    let inner = match generic_args(ty, "Result") {
        Some(args) if !args.is_empty() => args[0],
        _ if META_METHODS.contains(&&name[..]) => {
            return if is_key_set(ty) {
                Ok(ReturnKind::Meta)
            } else {
                Err(Error::new(
                    ty.span(),
                    "Meta accessor get_keys must return HashSet<String>",
                ))
            }
        }
        _ => {
            return Err(Error::new(
                ty.span(),
                "Accessor must return Result<T, E> or Result<Option<T>, E>",
            ))
        }
    };
    Ok(match generic_args(inner, "Option") {
        Some(args) if args.len() == 1 => ReturnKind::Optional(args[0].clone()),
        _ => ReturnKind::Value(inner.clone()),
    })
}

fn check_signature(sig: &Signature) -> Result<()> {
    if !sig.generics.params.is_empty() {
        return Err(Error::new(
            sig.generics.span(),
            "Accessor can not be generic",
        ));
    }
    if sig.asyncness.is_some() {
        return Err(Error::new(sig.span(), "Accessor can not be async"));
    }
    let mut inputs = sig.inputs.iter();
    match (inputs.next(), inputs.next()) {
        (
            Some(FnArg::Receiver(Receiver {
                reference: Some(_),
                mutability: None,
                ..
            })),
            None,
        ) => Ok(()),
        _ => Err(Error::new(
            sig.inputs.span(),
            "Accessor takes only &self",
        )),
    }
}

fn parse_methods(item: &mut ItemTrait) -> Result<Vec<Method>> {
    let mut methods = vec![];
    for ti in item.items.iter_mut() {
        let m = match ti {
            TraitItem::Method(m) => m,
            other => {
                return Err(Error::new(
                    other.span(),
                    "Only accessor methods are supported",
                ))
            }
        };
        if let Some(body) = &m.default {
            return Err(Error::new(body.span(), "Accessor can not have a body"));
        }
        let attr = parse_method_attr(&mut m.attrs)?;
        check_signature(&m.sig)?;
        let kind = return_kind(&m.sig)?;
        if let ReturnKind::Meta = kind {
            if attr.key.is_some() || attr.converter.is_some() {
                return Err(Error::new(
                    m.sig.ident.span(),
                    "Meta accessor does not accept #[config]",
                ));
            }
        }
        methods.push(Method {
            sig: m.sig.clone(),
            attr,
            kind,
        });
    }
    Ok(methods)
}

fn declaration(m: &Method) -> TokenStream2 {
    let name = m.sig.ident.to_string();
    let (ctor, ty) = match &m.kind {
        ReturnKind::Meta => return quote! { ::propconf::AccessorDecl::meta(#name) },
        ReturnKind::Value(ty) => (quote!(value), ty),
        ReturnKind::Optional(ty) => (quote!(optional), ty),
    };
    let key = m.attr.key.as_ref().map(|k| quote!(.key(#k)));
    let converter = m.attr.converter.as_ref().map(|c| quote!(.converter::<#c>()));
    quote! {
        ::propconf::Accessor::<#ty>::#ctor(#name) #key #converter
    }
}

fn implementation(m: &Method) -> TokenStream2 {
    let name = m.sig.ident.to_string();
    let sig = &m.sig;
    let body = match &m.kind {
        ReturnKind::Meta => quote! { self.0.configuration().get_keys() },
        ReturnKind::Value(ty) => quote! {
            self.0.invoke::<#ty>(#name).map_err(::std::convert::Into::into)
        },
        ReturnKind::Optional(ty) => quote! {
            self.0.invoke_optional::<#ty>(#name).map_err(::std::convert::Into::into)
        },
    };
    quote! {
        #sig {
            #body
        }
    }
}

fn expand(args: TokenStream2, mut item: ItemTrait) -> Result<TokenStream2> {
    if !args.is_empty() {
        return Err(Error::new(args.span(), "configuration takes no arguments"));
    }
    if !item.generics.params.is_empty() {
        return Err(Error::new(
            item.generics.span(),
            "Configuration trait can not be generic",
        ));
    }
    let methods = parse_methods(&mut item)?;
    let vis = &item.vis;
    let trait_name = &item.ident;
    let contract_name = trait_name.to_string();
    let impl_name = format_ident!("{}Impl", trait_name, span = Span::call_site());
    let doc = format!("Implementation of [`{}`] backed by a bound configuration.", contract_name);
    let decls = methods.iter().map(declaration);
    let impls = methods.iter().map(implementation);

    Ok(quote! {
        #item

        #[doc = #doc]
        #[derive(Debug)]
        #vis struct #impl_name(::propconf::BoundConfiguration);

        impl ::propconf::Contract for #impl_name {
            fn contract() -> ::propconf::AccessorContract {
                ::propconf::AccessorContract::new(#contract_name)
                #(.with(#decls))*
            }

            fn from_bound(bound: ::propconf::BoundConfiguration) -> Self {
                #impl_name(bound)
            }

            fn bound(&self) -> &::propconf::BoundConfiguration {
                &self.0
            }
        }

        impl #trait_name for #impl_name {
            #(#impls)*
        }
    })
}

/// Generate `<Trait>Impl`, an implementation of the trait and of `propconf::Contract`.
#[proc_macro_attribute]
pub fn configuration(args: TokenStream, input: TokenStream) -> TokenStream {
    let item = parse_macro_input!(input as ItemTrait);
    match expand(args.into(), item) {
        Ok(ts) => ts.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind(sig: Signature) -> Result<ReturnKind> {
        return_kind(&sig)
    }

    #[test]
    fn meta_return_test() {
        assert!(matches!(
            kind(parse_quote!(fn get_keys(&self) -> HashSet<String>)),
            Ok(ReturnKind::Meta)
        ));
        assert!(matches!(
            kind(parse_quote!(fn get_keys(&self) -> std::collections::HashSet<String>)),
            Ok(ReturnKind::Meta)
        ));
        assert!(kind(parse_quote!(fn get_keys(&self) -> Vec<String>)).is_err());
        assert!(kind(parse_quote!(fn get_keys(&self) -> HashSet<u32>)).is_err());
        assert!(matches!(
            kind(parse_quote!(fn get_keys(&self) -> Result<String, ConfigError>)),
            Ok(ReturnKind::Value(_))
        ));
    }

    #[test]
    fn data_return_test() {
        assert!(matches!(
            kind(parse_quote!(fn port(&self) -> Result<Option<u16>, ConfigError>)),
            Ok(ReturnKind::Optional(_))
        ));
        assert!(matches!(
            kind(parse_quote!(fn port(&self) -> Result<u16, ConfigError>)),
            Ok(ReturnKind::Value(_))
        ));
        assert!(kind(parse_quote!(fn port(&self) -> u16)).is_err());
        assert!(kind(parse_quote!(fn port(&self))).is_err());
    }

    #[test]
    fn signature_test() {
        assert!(check_signature(&parse_quote!(fn port(&self) -> u16)).is_ok());
        assert!(check_signature(&parse_quote!(fn port(&mut self) -> u16)).is_err());
        assert!(check_signature(&parse_quote!(fn port(self) -> u16)).is_err());
        assert!(check_signature(&parse_quote!(fn port(&self, x: u8) -> u16)).is_err());
        assert!(check_signature(&parse_quote!(fn port<T>(&self) -> T)).is_err());
    }
}
