use proc_macro::TokenStream;
use quote::quote;
use syn::parse_macro_input;

// Verb attributes are inert markers. They only validate that they sit on a
// method; the route metadata is read off the impl block by #[routes], which
// also strips the markers again.
pub fn http_method_attribute(_method: &str, _attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as syn::ImplItemFn);

    TokenStream::from(quote! {
        #input
    })
}
