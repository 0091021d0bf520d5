use proc_macro::TokenStream;
use proc_macro2::Ident;
use quote::quote;
use syn::{Data, DeriveInput, Fields};

struct FieldlessEnum {
    name: Ident,
    variants: Vec<Ident>,
}

fn parse_fieldless_enum(input: TokenStream, derive: &str) -> FieldlessEnum {
    let ast: DeriveInput = syn::parse(input)
        .unwrap_or_else(|err| panic!("Unable to parse input for {derive}: {err}"));

    let Data::Enum(data) = &ast.data else {
        panic!("{derive} only supports enums; {} is not an enum", ast.ident);
    };

    let variants = data
        .variants
        .iter()
        .map(|variant| {
            assert!(
                matches!(variant.fields, Fields::Unit),
                "{derive} only supports fieldless enums; {}::{} has fields",
                ast.ident,
                variant.ident
            );
            variant.ident.clone()
        })
        .collect();

    FieldlessEnum { name: ast.ident, variants }
}

pub fn enum_display(input: TokenStream) -> TokenStream {
    let FieldlessEnum { name, variants } = parse_fieldless_enum(input, "EnumDisplay");

    let arms = variants.iter().map(|variant| {
        let variant_str = variant.to_string();
        quote! { Self::#variant => #variant_str }
    });

    let expanded = quote! {
        impl #name {
            #[must_use]
            pub fn to_str(&self) -> &'static str {
                match self {
                    #(#arms,)*
                }
            }
        }

        impl ::std::fmt::Display for #name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.to_str())
            }
        }
    };

    expanded.into()
}

pub fn enum_from_str(input: TokenStream) -> TokenStream {
    let FieldlessEnum { name, variants } = parse_fieldless_enum(input, "EnumFromStr");

    let arms = variants.iter().map(|variant| {
        let lowercase = variant.to_string().to_ascii_lowercase();
        quote! { #lowercase => ::std::result::Result::Ok(Self::#variant) }
    });

    let error_prefix = format!("invalid {name} string");

    let expanded = quote! {
        impl ::std::str::FromStr for #name {
            type Err = ::std::string::String;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                match s.to_ascii_lowercase().as_str() {
                    #(#arms,)*
                    _ => ::std::result::Result::Err(::std::format!("{}: '{}'", #error_prefix, s)),
                }
            }
        }
    };

    expanded.into()
}

pub fn enum_all(input: TokenStream) -> TokenStream {
    let FieldlessEnum { name, variants } = parse_fieldless_enum(input, "EnumAll");

    let len = variants.len();

    let expanded = quote! {
        impl #name {
            pub const ALL: [Self; #len] = [#(Self::#variants,)*];
        }
    };

    expanded.into()
}

pub fn custom_value_enum(input: TokenStream) -> TokenStream {
    let FieldlessEnum { name, .. } = parse_fieldless_enum(input, "CustomValueEnum");

    let expanded = quote! {
        impl ::clap::ValueEnum for #name {
            fn value_variants<'a>() -> &'a [Self] {
                &Self::ALL
            }

            fn to_possible_value(&self) -> ::std::option::Option<::clap::builder::PossibleValue> {
                ::std::option::Option::Some(::clap::builder::PossibleValue::new(self.to_str()))
            }
        }
    };

    expanded.into()
}
