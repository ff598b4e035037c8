use proc_macro::TokenStream;
use quote::quote;
use serde_json::{Map, Value, json};
use syn::{Data, DeriveInput, Fields, GenericArgument, LitStr, PathArguments, Type, parse_macro_input};

#[derive(Default)]
pub(crate) struct InputParser;

impl InputParser {
    /// Expand `#[derive(ToolInput)]` into a `ToolInputT` impl whose schema
    /// string is computed here, at macro time.
    pub(crate) fn parse(&self, input: TokenStream) -> TokenStream {
        let ast = parse_macro_input!(input as DeriveInput);

        let schema = match build_schema(&ast) {
            Ok(schema) => schema,
            Err(err) => return err.to_compile_error().into(),
        };

        let struct_ident = &ast.ident;
        let (impl_generics, ty_generics, where_clause) = ast.generics.split_for_impl();

        let expanded = quote! {
            impl #impl_generics ::openassist::core::tool::ToolInputT for #struct_ident #ty_generics #where_clause {
                fn io_schema() -> &'static str {
                    #schema
                }
            }
        };

        TokenStream::from(expanded)
    }
}

/// Build the JSON schema string for a named-field struct.
fn build_schema(ast: &DeriveInput) -> syn::Result<String> {
    let fields = match &ast.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &ast.ident,
                    "ToolInput requires named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &ast.ident,
                "ToolInput can only be derived for structs",
            ));
        }
    };

    let mut properties = Map::new();
    let mut required = Vec::new();

    for field in fields {
        let ident = field
            .ident
            .as_ref()
            .ok_or_else(|| syn::Error::new_spanned(field, "Expected a named field"))?;
        let field_name = ident.to_string();

        let (ty, optional) = unwrap_option(&field.ty);
        let mut schema = type_schema(ty);

        if let Some(description) = field_description(field)?
            && let Value::Object(map) = &mut schema
        {
            map.insert("description".to_string(), Value::String(description));
        }

        if !optional {
            required.push(Value::String(field_name.clone()));
        }
        properties.insert(field_name, schema);
    }

    let schema = json!({
        "type": "object",
        "properties": Value::Object(properties),
        "required": Value::Array(required),
    });
    Ok(schema.to_string())
}

/// `#[input(description = "...")]` on a field.
fn field_description(field: &syn::Field) -> syn::Result<Option<String>> {
    for attr in &field.attrs {
        if attr.path().is_ident("input") {
            let mut description = None;
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("description") {
                    let lit: LitStr = meta.value()?.parse()?;
                    description = Some(lit.value());
                    Ok(())
                } else {
                    Err(meta.error("Unexpected input attribute key"))
                }
            })?;
            return Ok(description);
        }
    }
    Ok(None)
}

/// Strip one `Option<...>` layer, reporting whether the field is optional.
fn unwrap_option(ty: &Type) -> (&Type, bool) {
    if let Some(inner) = generic_inner(ty, "Option") {
        (inner, true)
    } else {
        (ty, false)
    }
}

fn generic_inner<'a>(ty: &'a Type, wrapper: &str) -> Option<&'a Type> {
    if let Type::Path(path) = ty
        && let Some(segment) = path.path.segments.last()
        && segment.ident == wrapper
        && let PathArguments::AngleBracketed(args) = &segment.arguments
        && let Some(GenericArgument::Type(inner)) = args.args.first()
    {
        return Some(inner);
    }
    None
}

/// JSON-schema fragment for a Rust type.
fn type_schema(ty: &Type) -> Value {
    if let Some(inner) = generic_inner(ty, "Vec") {
        return json!({"type": "array", "items": type_schema(inner)});
    }

    let name = match ty {
        Type::Path(path) => path
            .path
            .segments
            .last()
            .map(|s| s.ident.to_string())
            .unwrap_or_default(),
        Type::Reference(reference) => return type_schema(&reference.elem),
        _ => String::new(),
    };

    match name.as_str() {
        "String" | "str" | "char" => json!({"type": "string"}),
        "f32" | "f64" => json!({"type": "number"}),
        "i8" | "i16" | "i32" | "i64" | "i128" | "isize" | "u8" | "u16" | "u32" | "u64"
        | "u128" | "usize" => json!({"type": "integer"}),
        "bool" => json!({"type": "boolean"}),
        // Nested structs and maps are presented as opaque objects.
        _ => json!({"type": "object"}),
    }
}
