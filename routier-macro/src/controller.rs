use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{
    parse::Parse, parse::ParseStream, parse_macro_input, Attribute, FnArg, ImplItem, ItemImpl,
    ItemStruct, LitStr, Token,
};

const HTTP_METHODS: &[&str] = &["get", "post", "put", "patch", "delete"];

struct ControllerArgs {
    path: String,
    middlewares: Vec<syn::Expr>,
}

impl Parse for ControllerArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut path = None;
        let mut middlewares = Vec::new();
        while !input.is_empty() {
            let name: syn::Ident = input.parse()?;
            input.parse::<Token![=]>()?;
            if name == "path" {
                let lit: LitStr = input.parse()?;
                path = Some(lit.value());
            } else if name == "middlewares" {
                let content;
                syn::bracketed!(content in input);
                let items = content.parse_terminated(syn::Expr::parse, Token![,])?;
                middlewares = items.into_iter().collect();
            } else {
                return Err(syn::Error::new(
                    name.span(),
                    "expected `path` or `middlewares`",
                ));
            }
            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }
        Ok(ControllerArgs {
            path: path.unwrap_or_else(|| "/".to_string()),
            middlewares,
        })
    }
}

pub fn controller_attribute(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as ControllerArgs);
    let input = parse_macro_input!(item as ItemStruct);
    let expanded = generate_controller_impl(&args, &input);
    TokenStream::from(expanded)
}

fn generate_controller_impl(args: &ControllerArgs, input: &ItemStruct) -> TokenStream2 {
    let struct_name = &input.ident;
    let base_path = &args.path;
    let middlewares = &args.middlewares;
    quote! {
        #input

        impl #struct_name {
            /// Controller-level routing options declared by `#[controller]`.
            pub fn controller_options() -> ::routier::ControllerOptions {
                ::routier::ControllerOptions::new(#base_path)
                    #(.with_middleware(#middlewares))*
            }
        }
    }
}

struct RouteArgs {
    path: String,
    middlewares: Vec<syn::Expr>,
}

impl Parse for RouteArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let lit: LitStr = input.parse()?;
        let mut middlewares = Vec::new();
        if input.peek(Token![,]) {
            input.parse::<Token![,]>()?;
            let name: syn::Ident = input.parse()?;
            if name != "middlewares" {
                return Err(syn::Error::new(name.span(), "expected `middlewares`"));
            }
            input.parse::<Token![=]>()?;
            let content;
            syn::bracketed!(content in input);
            let items = content.parse_terminated(syn::Expr::parse, Token![,])?;
            middlewares = items.into_iter().collect();
        }
        Ok(RouteArgs {
            path: lit.value(),
            middlewares,
        })
    }
}

struct RouteInfo {
    method: String,
    path: String,
    middlewares: Vec<syn::Expr>,
    fn_name: syn::Ident,
    takes_request: bool,
}

pub fn routes_attribute(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemImpl);
    match generate_routes_impl(input) {
        Ok(expanded) => TokenStream::from(expanded),
        Err(error) => TokenStream::from(error.to_compile_error()),
    }
}

fn generate_routes_impl(input: ItemImpl) -> syn::Result<TokenStream2> {
    let mut routes: Vec<RouteInfo> = Vec::new();
    let mut clean_items: Vec<ImplItem> = Vec::new();

    for item in input.items.iter() {
        if let ImplItem::Fn(method) = item {
            if let Some(route_info) = extract_route_info(method)? {
                routes.push(route_info);
                let mut clean_method = method.clone();
                clean_method.attrs.retain(|attr| !is_http_method_attr(attr));
                clean_items.push(ImplItem::Fn(clean_method));
            } else {
                clean_items.push(item.clone());
            }
        } else {
            clean_items.push(item.clone());
        }
    }

    let bind_arms = routes.iter().map(|route| {
        let fn_name = &route.fn_name;
        let fn_name_str = fn_name.to_string();
        let request_pattern = if route.takes_request {
            quote! { __request }
        } else {
            quote! { _request }
        };
        let call = if route.takes_request {
            quote! { controller.#fn_name(__request).await }
        } else {
            quote! { controller.#fn_name().await }
        };
        quote! {
            #fn_name_str => {
                let controller = self;
                ::std::option::Option::Some(::routier::RequestHandler::from_fn(
                    move |#request_pattern: ::routier::Request, _next: ::routier::Next| {
                        let controller = controller.clone();
                        async move {
                            use ::routier::axum::response::IntoResponse;
                            #call.into_response()
                        }
                    },
                ))
            }
        }
    });

    // Declaration order within the impl block is registration order.
    let route_registrations = routes.iter().map(|route| {
        let variant = format_ident!("{}", capitalize(&route.method));
        let path = &route.path;
        let fn_name_str = route.fn_name.to_string();
        let middlewares = &route.middlewares;
        quote! {
            registry.add_route::<Self>(
                ::routier::RouteDescriptor::new(
                    ::routier::HttpMethod::#variant,
                    #path,
                    #fn_name_str,
                )
                #(.with_middleware(#middlewares))*,
            );
        }
    });

    let self_ty = &input.self_ty;
    let impl_generics = &input.generics;

    Ok(quote! {
        impl #impl_generics #self_ty {
            #(#clean_items)*
        }

        impl #impl_generics ::routier::Controller for #self_ty {
            fn bind(
                self: ::std::sync::Arc<Self>,
                method_name: &str,
            ) -> ::std::option::Option<::routier::RequestHandler> {
                match method_name {
                    #(#bind_arms)*
                    _ => ::std::option::Option::None,
                }
            }
        }

        impl #impl_generics ::routier::ControllerClass for #self_ty {
            fn annotate(registry: &::routier::MetadataRegistry) {
                registry.set_controller_options::<Self>(Self::controller_options());
                #(#route_registrations)*
            }
        }
    })
}

fn extract_route_info(method: &syn::ImplItemFn) -> syn::Result<Option<RouteInfo>> {
    let Some(attr) = method.attrs.iter().find(|attr| is_http_method_attr(attr)) else {
        return Ok(None);
    };

    let verb = attr.path().get_ident().unwrap().to_string();
    let args: RouteArgs = attr.parse_args()?;

    if method.sig.receiver().is_none() {
        return Err(syn::Error::new_spanned(
            &method.sig,
            "route handlers must take `&self`",
        ));
    }

    let typed_inputs = method
        .sig
        .inputs
        .iter()
        .filter(|input| matches!(input, FnArg::Typed(_)))
        .count();
    if typed_inputs > 1 {
        return Err(syn::Error::new_spanned(
            &method.sig,
            "route handlers take at most `&self` and the request",
        ));
    }

    Ok(Some(RouteInfo {
        method: verb,
        path: args.path,
        middlewares: args.middlewares,
        fn_name: method.sig.ident.clone(),
        takes_request: typed_inputs == 1,
    }))
}

fn is_http_method_attr(attr: &Attribute) -> bool {
    attr.path()
        .get_ident()
        .is_some_and(|ident| HTTP_METHODS.contains(&ident.to_string().as_str()))
}

fn capitalize(verb: &str) -> String {
    let mut chars = verb.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
