use attr::ToolAttributes;
use proc_macro::TokenStream;
use quote::quote;
use syn::{DeriveInput, parse_macro_input};

pub(crate) mod attr;
pub(crate) mod input;

#[derive(Default)]
pub(crate) struct ToolParser;

impl ToolParser {
    /// Expand `#[tool(name = ..., description = ..., input = ...)]` into the
    /// metadata impl. The annotated struct is re-emitted unchanged; the
    /// runtime impl stays with the author.
    pub(crate) fn parse(&self, attr: TokenStream, item: TokenStream) -> TokenStream {
        let attrs = parse_macro_input!(attr as ToolAttributes);
        let item_ast = parse_macro_input!(item as DeriveInput);

        let struct_ident = &item_ast.ident;
        let (impl_generics, ty_generics, where_clause) = item_ast.generics.split_for_impl();

        let tool_name = &attrs.name;
        let tool_description = &attrs.description;
        let input_ty = &attrs.input;

        let expanded = quote! {
            #item_ast

            impl #impl_generics ::openassist::core::tool::ToolMetaT for #struct_ident #ty_generics #where_clause {
                fn name(&self) -> &str {
                    #tool_name
                }

                fn description(&self) -> &str {
                    #tool_description
                }

                fn args_schema(&self) -> ::serde_json::Value {
                    ::serde_json::from_str(
                        <#input_ty as ::openassist::core::tool::ToolInputT>::io_schema(),
                    )
                    .unwrap_or(::serde_json::Value::Null)
                }
            }
        };

        TokenStream::from(expanded)
    }
}
