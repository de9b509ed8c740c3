//! Derive macros for TodoMVC store actions
//!
//! A store action is either an *intent* (something the view asks for) or an
//! *outcome* (something an effect reports back). Keeping the distinction on
//! the type lets the runtime and logs tell the two apart without a hand-written
//! match per action enum.
//!
//! # Available Macros
//!
//! - `#[derive(Action)]` - Generates helpers for action enums (intents/outcomes)
//!
//! # Example
//!
//! ```ignore
//! use todomvc_macros::Action;
//!
//! #[derive(Action, Clone, Debug)]
//! enum TodoAction {
//!     #[intent]
//!     RemoveTodo { id: u64 },
//!
//!     #[outcome]
//!     TodoRemoved { id: u64 },
//! }
//!
//! // Generated methods:
//! assert!(TodoAction::RemoveTodo { id: 1 }.is_intent());
//! assert!(TodoAction::TodoRemoved { id: 1 }.is_outcome());
//! assert_eq!(TodoAction::TodoRemoved { id: 1 }.name(), "TodoRemoved");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use proc_macro::TokenStream;
use quote::quote;
use syn::{Attribute, Data, DeriveInput, Fields, Variant, parse_macro_input};

/// Derive macro for Action enums
///
/// Generates helper methods for action enums:
/// - `is_intent()` - Returns true if this variant is marked `#[intent]`
/// - `is_outcome()` - Returns true if this variant is marked `#[outcome]`
/// - `name()` - Returns the variant name, for logs and spans
///
/// # Attributes
///
/// - `#[intent]` - Mark a variant as a user/view intent
/// - `#[outcome]` - Mark a variant as an effect outcome
///
/// # Errors
///
/// This macro produces a compile error if:
/// - Applied to a non-enum type
/// - A variant has both `#[intent]` and `#[outcome]` attributes
#[proc_macro_derive(Action, attributes(intent, outcome))]
pub fn derive_action(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    let Data::Enum(data_enum) = &input.data else {
        return syn::Error::new_spanned(input, "#[derive(Action)] can only be used on enums")
            .to_compile_error()
            .into();
    };

    let mut intent_variants = Vec::new();
    let mut outcome_variants = Vec::new();

    for variant in &data_enum.variants {
        let is_intent = has_attribute(&variant.attrs, "intent");
        let is_outcome = has_attribute(&variant.attrs, "outcome");

        if is_intent && is_outcome {
            return syn::Error::new_spanned(
                variant,
                "Variant cannot be both #[intent] and #[outcome]",
            )
            .to_compile_error()
            .into();
        }

        if is_intent {
            intent_variants.push(variant);
        }

        if is_outcome {
            outcome_variants.push(variant);
        }
    }

    let is_intent_arms = intent_variants.iter().map(|variant| {
        let pattern = variant_pattern(variant);
        quote! { #pattern => true, }
    });

    let is_outcome_arms = outcome_variants.iter().map(|variant| {
        let pattern = variant_pattern(variant);
        quote! { #pattern => true, }
    });

    let name_arms = data_enum.variants.iter().map(|variant| {
        let pattern = variant_pattern(variant);
        let variant_name = variant.ident.to_string();
        quote! { #pattern => #variant_name, }
    });

    // Empty enums have no arms; `match *self {}` keeps them well-formed.
    let name_body = if data_enum.variants.is_empty() {
        quote! { match *self {} }
    } else {
        quote! { match self { #(#name_arms)* } }
    };

    let expanded = quote! {
        impl #name {
            /// Returns true if this action is an intent
            #[must_use]
            #[allow(unreachable_patterns)]
            pub const fn is_intent(&self) -> bool {
                match self {
                    #(#is_intent_arms)*
                    _ => false,
                }
            }

            /// Returns true if this action is an outcome
            #[must_use]
            #[allow(unreachable_patterns)]
            pub const fn is_outcome(&self) -> bool {
                match self {
                    #(#is_outcome_arms)*
                    _ => false,
                }
            }

            /// Returns the variant name
            #[must_use]
            pub const fn name(&self) -> &'static str {
                #name_body
            }
        }
    };

    TokenStream::from(expanded)
}

/// Pattern matching any value of `variant`, whatever its field shape
fn variant_pattern(variant: &Variant) -> proc_macro2::TokenStream {
    let ident = &variant.ident;
    match &variant.fields {
        Fields::Named(_) => quote! { Self::#ident { .. } },
        Fields::Unnamed(_) => quote! { Self::#ident(..) },
        Fields::Unit => quote! { Self::#ident },
    }
}

/// Helper function to check if an attribute list contains a specific attribute
fn has_attribute(attrs: &[Attribute], name: &str) -> bool {
    attrs.iter().any(|attr| attr.path().is_ident(name))
}
