//! Derive macros untuk tagless
//!
//! `#[derive(Encode)]` menghasilkan `Shaped` + `Encode`, `#[derive(Decode)]`
//! menghasilkan `Decode<'de>`. Field di-encode sesuai urutan deklarasi tanpa
//! prefix, jadi menukar urutan field mengubah format wire.

use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::quote;
use syn::{
    parse_macro_input, parse_quote, Data, DeriveInput, Field, Fields, GenericParam, Generics,
    Index, Lifetime, LifetimeParam, Member, Type,
};

/// Field-level attributes parsed from `#[tagless(...)]`
#[derive(Debug, Default)]
struct FieldAttributes {
    /// Field tidak ditulis ke wire; saat decode nilainya tidak disentuh
    skip: bool,
}

fn parse_field_attributes(field: &Field) -> syn::Result<FieldAttributes> {
    let mut field_attrs = FieldAttributes::default();

    for attr in &field.attrs {
        if attr.path().is_ident("tagless") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("skip") {
                    field_attrs.skip = true;
                    Ok(())
                } else {
                    Err(meta.error("unknown tagless attribute, expected `skip`"))
                }
            })?;
        }
    }

    Ok(field_attrs)
}

/// A wire field: how to reach it from `self`, its diagnostic name and type.
struct WireField<'a> {
    member: Member,
    name: String,
    ty: &'a Type,
}

fn wire_fields<'a>(input: &'a DeriveInput, derive: &str) -> syn::Result<Vec<WireField<'a>>> {
    let fields = match &input.data {
        Data::Struct(data) => &data.fields,
        Data::Enum(data) => {
            return Err(syn::Error::new_spanned(
                data.enum_token,
                format!("{derive} can only be derived for structs: enums have no wire shape"),
            ))
        }
        Data::Union(data) => {
            return Err(syn::Error::new_spanned(
                data.union_token,
                format!("{derive} can only be derived for structs: unions have no wire shape"),
            ))
        }
    };

    let mut out = Vec::new();
    match fields {
        Fields::Named(named) => {
            for field in &named.named {
                if parse_field_attributes(field)?.skip {
                    continue;
                }
                // Named fields always carry an ident
                if let Some(ident) = &field.ident {
                    out.push(WireField {
                        member: Member::Named(ident.clone()),
                        name: ident.to_string(),
                        ty: &field.ty,
                    });
                }
            }
        }
        Fields::Unnamed(unnamed) => {
            for (i, field) in unnamed.unnamed.iter().enumerate() {
                if parse_field_attributes(field)?.skip {
                    continue;
                }
                out.push(WireField {
                    member: Member::Unnamed(Index::from(i)),
                    name: i.to_string(),
                    ty: &field.ty,
                });
            }
        }
        Fields::Unit => {}
    }
    Ok(out)
}

/// Add `ty: bound` for every wire field type to the generics' where clause.
///
/// Only generic structs get the predicates; concrete field types are checked
/// directly by the generated body.
fn bounded(generics: &Generics, fields: &[WireField<'_>], bound: TokenStream2) -> Generics {
    let mut generics = generics.clone();
    if generics.type_params().next().is_none() {
        return generics;
    }
    let where_clause = generics.make_where_clause();
    for field in fields {
        let ty = field.ty;
        where_clause.predicates.push(parse_quote!(#ty: #bound));
    }
    generics
}

/// Derive `Shaped` and `Encode` for a struct.
///
/// ```ignore
/// use tagless::{Decode, Encode};
///
/// #[derive(Encode, Decode, Default)]
/// struct Order {
///     id: u64,
///     note: Option<String>,
///     lines: Vec<(u32, i64)>,
/// }
/// ```
///
/// The encoding is the concatenation of the fields in declaration order.
/// Fields marked `#[tagless(skip)]` are left out of the shape and the bytes.
#[proc_macro_derive(Encode, attributes(tagless))]
pub fn derive_encode(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand_encode(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand_encode(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let fields = wire_fields(input, "Encode")?;

    let shaped_generics = bounded(&input.generics, &fields, quote!(::tagless::Shaped));
    let (shaped_impl, ty_generics, shaped_where) = shaped_generics.split_for_impl();

    let encode_generics = bounded(&input.generics, &fields, quote!(::tagless::Encode));
    let (encode_impl, _, encode_where) = encode_generics.split_for_impl();

    let field_shapes = fields.iter().map(|f| {
        let (field_name, ty) = (&f.name, f.ty);
        quote! {
            ::tagless::Field::new(#field_name, <#ty as ::tagless::Shaped>::shape())
        }
    });
    let members = fields.iter().map(|f| &f.member);

    Ok(quote! {
        impl #shaped_impl ::tagless::Shaped for #name #ty_generics #shaped_where {
            fn shape() -> ::tagless::Shape {
                ::tagless::Shape::Struct(::std::vec![#(#field_shapes),*])
            }
        }

        impl #encode_impl ::tagless::Encode for #name #ty_generics #encode_where {
            fn encode(&self, sink: &mut ::tagless::ByteSink) -> ::tagless::Result<()> {
                #(::tagless::Encode::encode(&self.#members, sink)?;)*
                ::core::result::Result::Ok(())
            }
        }
    })
}

/// Derive `Decode<'de>` for a struct.
///
/// Fields are decoded in place, in declaration order; each nested decode
/// reports the bytes it consumed and the struct's cursor skips ahead by that
/// much. Borrowed fields (`&'a str`, `&'a [u8]`) alias the input, which must
/// outlive them. Pair with `#[derive(Encode)]`, which provides `Shaped`.
#[proc_macro_derive(Decode, attributes(tagless))]
pub fn derive_decode(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand_decode(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand_decode(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let fields = wire_fields(input, "Decode")?;
    let (_, ty_generics, _) = input.generics.split_for_impl();

    // '__de harus hidup lebih lama dari semua lifetime milik struct
    let de = Lifetime::new("'__de", Span::call_site());
    let mut de_param = LifetimeParam::new(de.clone());
    for lifetime in input.generics.lifetimes() {
        de_param.bounds.push(lifetime.lifetime.clone());
    }

    let mut generics = bounded(&input.generics, &fields, quote!(::tagless::Decode<#de>));
    generics.params.insert(0, GenericParam::Lifetime(de_param));
    let (impl_generics, _, where_clause) = generics.split_for_impl();

    let members = fields.iter().map(|f| &f.member);

    Ok(quote! {
        impl #impl_generics ::tagless::Decode<#de> for #name #ty_generics #where_clause {
            fn decode_into(&mut self, input: &#de [u8]) -> ::tagless::Result<usize> {
                #[allow(unused_mut)]
                let mut src = ::tagless::ByteSource::new(input);
                #(::tagless::decode_echo(&mut src, &mut self.#members)?;)*
                ::core::result::Result::Ok(src.consumed())
            }
        }
    })
}
