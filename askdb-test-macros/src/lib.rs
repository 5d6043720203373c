use darling::ast::NestedMeta;
use darling::FromMeta;
use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{parse_macro_input, ItemFn};

#[derive(Debug, FromMeta)]
struct TestArgs {
    postgres: i32,
}

impl TestArgs {
    fn get_port(&self) -> Result<u16, darling::Error> {
        match self.postgres {
            12 => Ok(5412),
            13 => Ok(5413),
            14 => Ok(5414),
            15 => Ok(5415),
            16 => Ok(5416),
            v => Err(darling::Error::custom(format!("No test instance for postgres {}", v))),
        }
    }
}

/// Runs the annotated function as a tokio test against a throwaway database on
/// the given Postgres version. The function takes a single `&TestHelper`.
///
/// ```ignore
/// #[pg_test(postgres = 15)]
/// async fn reads_tables(helper: &TestHelper) { ... }
/// ```
///
/// Stack the attribute to run the same body against several versions.
#[proc_macro_attribute]
pub fn pg_test(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);

    let function_name = &input.sig.ident;

    let attr_args = match NestedMeta::parse_meta_list(args.into()) {
        Ok(v) => v,
        Err(e) => {
            return TokenStream::from(darling::Error::from(e).write_errors());
        }
    };

    let args = match TestArgs::from_list(&attr_args) {
        Ok(v) => v,
        Err(e) => {
            return TokenStream::from(e.write_errors());
        }
    };

    let port = match args.get_port() {
        Ok(p) => p,
        Err(e) => {
            return TokenStream::from(e.write_errors());
        }
    };

    if input.sig.inputs.len() != 1 {
        return TokenStream::from(
            darling::Error::custom(format!(
                "Function must take exactly one `&TestHelper` argument, found {}",
                input.sig.inputs.len()
            ))
            .write_errors(),
        );
    }

    let helper_name = function_name.to_string();
    let actual_test_function_name = format_ident!("postgres_{}_{}", args.postgres.to_string(), function_name);

    let invoke_actual_function = if input.sig.asyncness.is_some() {
        quote! { #function_name(&helper).await; }
    } else {
        quote! { #function_name(&helper); }
    };

    let test_function = quote! {
        #input

        #[tokio::test]
        async fn #actual_test_function_name() {
            let helper = crate::test_helpers::get_test_helper_on_port(#helper_name, #port).await;

            #invoke_actual_function

            helper.stop().await;
        }
    };

    TokenStream::from(test_function)
}
