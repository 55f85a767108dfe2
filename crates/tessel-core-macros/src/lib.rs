use proc_macro::TokenStream;
use quote::{ToTokens, TokenStreamExt};

/// Where the declared base of a typed item comes from.
enum BaseDecl {
    /// No base: the item starts a type chain.
    Root,
    /// `#[typed(base = Path)]`: declared, but not embedded.
    Declared(syn::Type),
    /// `#[base]` on a field: the base is embedded by composition.
    Embedded { member: syn::Member, ty: syn::Type },
}

struct TypedItem {
    name: syn::Ident,
    type_name: String,
    base: BaseDecl,
}

impl TypedItem {
    fn parse_container_attrs(
        attrs: &[syn::Attribute],
        type_name: &mut String,
        base: &mut Option<syn::Type>,
    ) -> syn::Result<()> {
        for attr in attrs.iter().filter(|attr| attr.path().is_ident("typed")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    let lit: syn::LitStr = meta.value()?.parse()?;
                    *type_name = lit.value();
                    Ok(())
                } else if meta.path.is_ident("base") {
                    *base = Some(meta.value()?.parse()?);
                    Ok(())
                } else {
                    Err(meta.error("expected `name = \"...\"` or `base = Type`"))
                }
            })?;
        }
        Ok(())
    }

    fn embedded_field(data: &syn::Data) -> syn::Result<Option<(syn::Member, syn::Type)>> {
        let fields = match data {
            syn::Data::Struct(data) => &data.fields,
            _ => return Ok(None),
        };

        let mut found = None;
        for (index, field) in fields.iter().enumerate() {
            let Some(attr) = field.attrs.iter().find(|attr| attr.path().is_ident("base")) else {
                continue;
            };
            if found.is_some() {
                return Err(syn::Error::new_spanned(
                    attr,
                    "only one field can be marked #[base]",
                ));
            }
            let member = match &field.ident {
                Some(ident) => syn::Member::Named(ident.clone()),
                None => syn::Member::Unnamed(syn::Index::from(index)),
            };
            found = Some((member, field.ty.clone()));
        }
        Ok(found)
    }
}

impl syn::parse::Parse for TypedItem {
    fn parse(input: syn::parse::ParseStream) -> syn::Result<Self> {
        let input: syn::DeriveInput = input.parse()?;

        if !input.generics.params.is_empty() {
            return Err(syn::Error::new_spanned(
                input.generics,
                "typed items cannot be generic: each one owns a single type descriptor",
            ));
        }

        let mut type_name = input.ident.to_string();
        let mut declared = None;
        Self::parse_container_attrs(&input.attrs, &mut type_name, &mut declared)?;

        let base = match (Self::embedded_field(&input.data)?, declared) {
            (Some(_), Some(declared)) => {
                return Err(syn::Error::new_spanned(
                    declared,
                    "the base is already given by a #[base] field",
                ));
            }
            (Some((member, ty)), None) => BaseDecl::Embedded { member, ty },
            (None, Some(ty)) => BaseDecl::Declared(ty),
            (None, None) => BaseDecl::Root,
        };

        Ok(TypedItem {
            name: input.ident,
            type_name,
            base,
        })
    }
}

fn core_path() -> proc_macro2::TokenStream {
    use proc_macro_crate::{FoundCrate, crate_name};

    match crate_name("tessel-core") {
        Ok(FoundCrate::Itself) => quote::quote! { crate },
        Ok(FoundCrate::Name(name)) => {
            let ident = syn::Ident::new(&name, proc_macro2::Span::call_site());
            quote::quote! { ::#ident }
        }
        Err(_) => match crate_name("tessel") {
            Ok(FoundCrate::Name(name)) => {
                let ident = syn::Ident::new(&name, proc_macro2::Span::call_site());
                quote::quote! { ::#ident::core }
            }
            _ => quote::quote! { ::tessel_core },
        },
    }
}

impl quote::ToTokens for TypedItem {
    fn to_tokens(&self, tokens: &mut proc_macro2::TokenStream) {
        let cr = core_path();
        let name = &self.name;
        let type_name = &self.type_name;

        let base_cls = match &self.base {
            BaseDecl::Root => quote::quote! { None },
            BaseDecl::Declared(ty) | BaseDecl::Embedded { ty, .. } => {
                quote::quote! { Some(<#ty as #cr::object::Typed>::cls()) }
            }
        };

        let embedded = match &self.base {
            BaseDecl::Embedded { member, .. } => quote::quote! {
                fn embedded(&self) -> Option<&dyn #cr::object::TypeObject> {
                    Some(&self.#member)
                }

                fn embedded_mut(&mut self) -> Option<&mut dyn #cr::object::TypeObject> {
                    Some(&mut self.#member)
                }
            },
            _ => quote::quote! {},
        };

        tokens.append_all(quote::quote! {
            impl #cr::object::Typed for #name {
                fn cls() -> &'static #cr::object::Type {
                    static TYPE: ::std::sync::OnceLock<#cr::object::Type> =
                        ::std::sync::OnceLock::new();
                    TYPE.get_or_init(|| #cr::object::Type::new(#type_name, #base_cls))
                }
            }

            impl #cr::object::TypeObject for #name {
                fn object_type(&self) -> &'static #cr::object::Type {
                    <Self as #cr::object::Typed>::cls()
                }

                fn as_any(&self) -> &dyn ::std::any::Any {
                    self
                }

                fn as_any_mut(&mut self) -> &mut dyn ::std::any::Any {
                    self
                }

                #embedded
            }
        });
    }
}

/// Derives `Typed` and `TypeObject` for a struct or enum.
///
/// The base type is taken from a field marked `#[base]` (the base is embedded,
/// so upcasts reach the concrete value) or from `#[typed(base = Path)]`.
/// `#[typed(name = "...")]` overrides the registered type name.
#[proc_macro_derive(Typed, attributes(typed, base))]
pub fn derive_typed(item: TokenStream) -> TokenStream {
    match syn::parse::<TypedItem>(item) {
        Ok(item) => item.to_token_stream().into(),
        Err(err) => err.to_compile_error().into(),
    }
}
