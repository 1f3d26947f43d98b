//! The `#[weft_testhelpers::test]` attribute.

use unsynn::*;

keyword! {
    KFn = "fn";
}

unsynn! {
    struct BeforeFn {
        items: Any<Cons<Except<KFn>, TokenTree>>,
    }

    struct Signature {
        items: Any<Cons<Except<BraceGroup>, TokenTree>>,
    }

    struct TestFn {
        before: BeforeFn, _fn: KFn, name: Ident,
        signature: Signature, body: BraceGroup
    }
}

impl quote::ToTokens for BeforeFn {
    fn to_tokens(&self, tokens: &mut unsynn::TokenStream) {
        self.items.to_tokens(tokens)
    }
}

impl quote::ToTokens for Signature {
    fn to_tokens(&self, tokens: &mut unsynn::TokenStream) {
        self.items.to_tokens(tokens)
    }
}

/// Marks a test and calls `weft_testhelpers::setup()` before its body.
///
/// An argument replaces the default `#[test]`:
///
/// ```ignore
/// #[weft_testhelpers::test(tokio::test)]
/// async fn streams() {}
/// ```
#[proc_macro_attribute]
pub fn test(
    attr: proc_macro::TokenStream,
    item: proc_macro::TokenStream,
) -> proc_macro::TokenStream {
    let item = TokenStream::from(item);
    let mut tokens = item.to_token_iter();
    let TestFn {
        before,
        _fn,
        name,
        signature,
        body,
    } = match tokens.parse::<TestFn>() {
        Ok(parsed) => parsed,
        Err(_) => {
            return quote::quote! {
                ::core::compile_error!("#[weft_testhelpers::test] expects a function");
            }
            .into();
        }
    };

    let test_attr = if attr.is_empty() {
        quote::quote! { #[::core::prelude::rust_2024::test] }
    } else {
        let attr = TokenStream::from(attr);
        quote::quote! { #[#attr] }
    };
    let body = body.0.stream();

    quote::quote! {
        #test_attr
        #before fn #name #signature {
            ::weft_testhelpers::setup();

            #body
        }
    }
    .into()
}
