/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Fields, ItemEnum, ItemFn, ItemStruct};

/// Logs the wall-clock time spent inside the annotated function at `debug` level.
///
/// Works for both sync and async functions, free or associated. The call site
/// must have `debug` (from `tracing`) in scope.
#[proc_macro_attribute]
pub fn measure_duration(_: TokenStream, input: TokenStream) -> TokenStream {
    let ItemFn {
        attrs,
        vis,
        sig,
        block,
    } = parse_macro_input!(input as ItemFn);
    let fn_name = &sig.ident;

    let expanded = quote! {
        #(#attrs)*
        #vis #sig {
            let start_time = std::time::Instant::now();
            let result = #block;
            let elapsed_ms = start_time.elapsed().as_secs_f64() * 1000.0;
            debug!("Function: {} | Duration (ms): {:.3}", stringify!(#fn_name), elapsed_ms);
            result
        }
    };

    TokenStream::from(expanded)
}

/// Adds an `inner()` accessor to a single-field tuple struct, unwrapping the newtype.
#[proc_macro_attribute]
pub fn impl_getter(_: TokenStream, input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as ItemStruct);
    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let inner_type = match &input.fields {
        Fields::Unnamed(fields) if fields.unnamed.len() == 1 => fields.unnamed.first().map(|f| &f.ty),
        _ => None,
    };

    let Some(inner_type) = inner_type else {
        return syn::Error::new_spanned(
            struct_name,
            "impl_getter expects a tuple struct with exactly one field",
        )
        .to_compile_error()
        .into();
    };

    let expanded = quote! {
        #input

        impl #impl_generics #struct_name #ty_generics #where_clause {
            pub fn inner(self) -> #inner_type {
                self.0
            }
        }
    };

    TokenStream::from(expanded)
}

#[proc_macro_attribute]
pub fn add_error(_: TokenStream, input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as ItemEnum);
    let enum_name = &input.ident;
    let attrs = &input.attrs;
    let vis = &input.vis;

    let variants = input.variants.iter().map(|variant| {
        let variant_name = &variant.ident;
        let variant_screaming_snake_case = convert_to_screaming_snake_case(variant_name.to_string());
        quote! {
            #[error(#variant_screaming_snake_case)]
            #variant,
        }
    });

    let expanded = quote! {
        #(#attrs)*
        #[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
        #vis enum #enum_name {
            #(#variants)*
        }
    };

    TokenStream::from(expanded)
}

fn convert_to_screaming_snake_case(input: String) -> String {
    let mut result = String::new();
    let mut last_char_was_upper = false;

    for c in input.chars() {
        if c.is_uppercase() {
            if !last_char_was_upper && !result.is_empty() {
                result.push('_');
            }
            last_char_was_upper = true;
        } else {
            last_char_was_upper = false;
        }
        result.push(c.to_ascii_uppercase());
    }

    result
}
