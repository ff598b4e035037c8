extern crate proc_macro;
use proc_macro::TokenStream;
use tool::{ToolParser, input::InputParser};

mod tool;

/// Derives `ToolInputT` for an argument struct, emitting a JSON schema built
/// from the field types and `#[input(description = "...")]` attributes.
#[proc_macro_derive(ToolInput, attributes(input))]
pub fn input(input: TokenStream) -> TokenStream {
    InputParser::default().parse(input)
}

/// Attribute macro declaring a tool's metadata:
///
/// ```ignore
/// #[tool(name = "Lookup", description = "Look up a record", input = LookupArgs)]
/// struct LookupTool;
/// ```
///
/// Generates the `ToolMetaT` impl; the author supplies `ToolRuntime`.
#[proc_macro_attribute]
pub fn tool(attr: TokenStream, item: TokenStream) -> TokenStream {
    ToolParser::default().parse(attr, item)
}
