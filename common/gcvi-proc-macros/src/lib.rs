//! Derive macros for fieldless config enums

mod enums;

use proc_macro::TokenStream;

/// Implement `to_str()` returning the variant name, and `Display` in terms of it.
#[proc_macro_derive(EnumDisplay)]
pub fn enum_display(input: TokenStream) -> TokenStream {
    enums::enum_display(input)
}

/// Implement case-insensitive `FromStr` over the variant names.
#[proc_macro_derive(EnumFromStr)]
pub fn enum_from_str(input: TokenStream) -> TokenStream {
    enums::enum_from_str(input)
}

/// Define an `ALL` constant array listing every variant in declaration order.
#[proc_macro_derive(EnumAll)]
pub fn enum_all(input: TokenStream) -> TokenStream {
    enums::enum_all(input)
}

/// Implement `clap::ValueEnum` using the `ALL` and `to_str()` generated by [`EnumAll`] and
/// [`EnumDisplay`], so command-line values match the variant names.
#[proc_macro_derive(CustomValueEnum)]
pub fn custom_value_enum(input: TokenStream) -> TokenStream {
    enums::custom_value_enum(input)
}
