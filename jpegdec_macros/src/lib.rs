// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

extern crate proc_macro;

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Ident, ItemFn, LitInt, Token};

/// Attribute that leaves the annotated item untouched.
///
/// Stands in for `tracing::instrument` when the `tracing` feature is off, so
/// that `#[instrument(...)]` annotations compile to nothing.
#[proc_macro_attribute]
pub fn noop(_attr: TokenStream, item: TokenStream) -> TokenStream {
    item
}

struct RepeatArgs {
    name: Ident,
    count: usize,
}

impl syn::parse::Parse for RepeatArgs {
    fn parse(input: syn::parse::ParseStream) -> syn::Result<Self> {
        let name: Ident = input.parse()?;
        input.parse::<Token![,]>()?;
        let count: LitInt = input.parse()?;
        Ok(RepeatArgs {
            name,
            count: count.base10_parse()?,
        })
    }
}

/// Turns a `fn(usize)` test body into `count` separate `#[test]` functions,
/// one per index, named `<name>_<index>`.
///
/// ```ignore
/// #[for_each_index(restart_interval, 4)]
/// fn decode_with_restarts(interval: usize) { ... }
/// ```
#[proc_macro_attribute]
pub fn for_each_index(attr: TokenStream, item: TokenStream) -> TokenStream {
    let RepeatArgs { name, count } = parse_macro_input!(attr as RepeatArgs);
    let func = parse_macro_input!(item as ItemFn);
    let func_name = &func.sig.ident;
    let tests = (0..count).map(|i| {
        let test_name = Ident::new(&format!("{name}_{i}"), name.span());
        quote! {
            #[test]
            fn #test_name() {
                #func_name(#i);
            }
        }
    });
    quote! {
        #[allow(dead_code)]
        #func
        #(#tests)*
    }
    .into()
}
