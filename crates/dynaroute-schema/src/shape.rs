//! Shape checks run on a schema before any route of it is compiled.

use crate::definition::{MiddlewareRef, RouteDefinition, RouteEntry, SchemaDefinition};
use crate::error::{CompileError, CompileResult};
use regex::Regex;
use std::sync::OnceLock;

/// Operation kinds a route may declare.
///
/// `option` and `head` are accepted here but have no HTTP mapping, so
/// compiling such a route still fails.
pub const ROUTE_METHODS: [&str; 7] = ["get", "list", "delete", "put", "post", "option", "head"];

/// Maximum length of schema and route ids.
pub const MAX_IDENTIFIER_LEN: usize = 64;

fn identifier_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid regex"))
}

fn handler_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$-]*(\.[A-Za-z_$][A-Za-z0-9_$-]*)*$")
            .expect("valid regex")
    })
}

fn method_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[_$a-zA-Z\x{A0}-\x{FFFF}][_$a-zA-Z0-9\x{A0}-\x{FFFF}]*$")
            .expect("valid regex")
    })
}

fn scheme_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*:").expect("valid regex"))
}

/// Returns true if `value` is a valid schema or route id.
#[must_use]
pub fn is_identifier(value: &str) -> bool {
    value.len() <= MAX_IDENTIFIER_LEN && identifier_pattern().is_match(value)
}

/// Returns true if `value` is a dotted handler or factory name.
#[must_use]
pub fn is_handler_name(value: &str) -> bool {
    handler_name_pattern().is_match(value)
}

/// Returns true if `value` is a relative path: no scheme, no authority, no
/// query or fragment, no whitespace.
#[must_use]
pub fn is_relative_path(value: &str) -> bool {
    !value.starts_with("//")
        && !scheme_pattern().is_match(value)
        && !value
            .chars()
            .any(|c| c.is_whitespace() || c == '?' || c == '#')
}

/// Checks the shape of a whole schema.
///
/// Field paths in errors use dotted notation, e.g. `routes.get.useFactoryMethod`.
pub fn validate_schema(schema: &SchemaDefinition) -> CompileResult<()> {
    if let Some(id) = &schema.id {
        check_identifier("id", id)?;
    }
    if let Some(path) = &schema.path {
        check_path("path", path)?;
    }
    if let Some(name) = &schema.use_factory {
        check_handler_name("useFactory", name)?;
    }
    if let Some(name) = &schema.load_factory {
        check_handler_name("loadFactory", name)?;
    }
    check_middlewares("middlewares", &schema.middlewares)?;

    for (route_id, entry) in &schema.routes {
        let field = format!("routes.{route_id}");
        check_identifier(&field, route_id)?;
        match entry {
            RouteEntry::Route(route) => validate_route(&field, route)?,
            RouteEntry::Path(path) => check_path(&field, path)?,
            RouteEntry::Empty => {}
        }
    }
    Ok(())
}

fn validate_route(field: &str, route: &RouteDefinition) -> CompileResult<()> {
    if let Some(id) = &route.id {
        check_identifier(&format!("{field}.id"), id)?;
    }
    if let Some(method) = &route.method {
        if !ROUTE_METHODS.contains(&method.as_str()) {
            return Err(CompileError::invalid(
                format!("{field}.method"),
                format!("must be one of {}", ROUTE_METHODS.join(", ")),
            ));
        }
    }
    if let Some(path) = &route.path {
        check_path(&format!("{field}.path"), path)?;
    }

    let named = [
        ("postValidation", &route.post_validation),
        ("loadFactory", &route.load_factory),
        ("handler", &route.handler),
        ("postHandler", &route.post_handler),
        ("useFactory", &route.use_factory),
    ];
    for (key, value) in named {
        if let Some(name) = value {
            check_handler_name(&format!("{field}.{key}"), name)?;
        }
    }

    if let Some(method) = &route.use_factory_method {
        if !method_name_pattern().is_match(method) {
            return Err(CompileError::invalid(
                format!("{field}.useFactoryMethod"),
                "must be a method name",
            ));
        }
    }

    check_middlewares(&format!("{field}.middlewares"), &route.middlewares)
}

fn check_identifier(field: &str, value: &str) -> CompileResult<()> {
    if is_identifier(value) {
        Ok(())
    } else {
        Err(CompileError::invalid(
            field,
            format!("'{value}' is not a valid identifier"),
        ))
    }
}

fn check_path(field: &str, value: &str) -> CompileResult<()> {
    if is_relative_path(value) {
        Ok(())
    } else {
        Err(CompileError::invalid(
            field,
            format!("'{value}' is not a relative path"),
        ))
    }
}

fn check_handler_name(field: &str, value: &str) -> CompileResult<()> {
    if is_handler_name(value.trim()) {
        Ok(())
    } else {
        Err(CompileError::invalid(
            field,
            format!("'{value}' is not a handler name"),
        ))
    }
}

fn check_middlewares(field: &str, middlewares: &[MiddlewareRef]) -> CompileResult<()> {
    for (index, middleware) in middlewares.iter().enumerate() {
        if let MiddlewareRef::Named(name) = middleware {
            check_handler_name(&format!("{field}[{index}]"), name)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_of(err: CompileError) -> String {
        match err {
            CompileError::SchemaValidation { field, .. } => field,
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_identifiers() {
        assert!(is_identifier("devices"));
        assert!(is_identifier("_private2"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("2fa"));
        assert!(!is_identifier("user-groups"));
        assert!(!is_identifier(&"a".repeat(MAX_IDENTIFIER_LEN + 1)));
        assert!(is_identifier(&"a".repeat(MAX_IDENTIFIER_LEN)));
    }

    #[test]
    fn test_relative_paths() {
        assert!(is_relative_path(""));
        assert!(is_relative_path("/v1/devices"));
        assert!(is_relative_path(":id"));
        assert!(is_relative_path("v1/devices/:id/ports"));
        assert!(!is_relative_path("https://example.com/devices"));
        assert!(!is_relative_path("//example.com"));
        assert!(!is_relative_path("/devices?limit=1"));
        assert!(!is_relative_path("/my devices"));
    }

    #[test]
    fn test_handler_names() {
        assert!(is_handler_name("devices.loadFactory"));
        assert!(is_handler_name("audit"));
        assert!(is_handler_name("$hooks.post-write"));
        assert!(!is_handler_name("devices..load"));
        assert!(!is_handler_name(".load"));
        assert!(!is_handler_name("devices/load"));
    }

    #[test]
    fn test_valid_schema_passes() {
        let schema = SchemaDefinition::builder()
            .id("devices")
            .path("/v1/devices")
            .use_factory("devices")
            .route("list", RouteDefinition::new())
            .route("get", ":id")
            .route(
                "archive",
                RouteDefinition::for_method("put")
                    .with_path(":id/archive")
                    .with_handler("devices.archive")
                    .with_factory_method("archiveOne"),
            )
            .empty_route("delete")
            .build();

        assert!(validate_schema(&schema).is_ok());
    }

    #[test]
    fn test_unknown_method_rejected() {
        let schema = SchemaDefinition::builder()
            .route("touch", RouteDefinition::for_method("touch"))
            .build();
        assert_eq!(field_of(validate_schema(&schema).unwrap_err()), "routes.touch.method");
    }

    #[test]
    fn test_head_and_option_pass_shape_check() {
        let schema = SchemaDefinition::builder()
            .route("probe", RouteDefinition::for_method("head"))
            .route("preflight", RouteDefinition::for_method("option"))
            .build();
        assert!(validate_schema(&schema).is_ok());
    }

    #[test]
    fn test_bad_route_key_rejected() {
        let schema = SchemaDefinition::builder()
            .route("by-id", RouteDefinition::new())
            .build();
        assert_eq!(field_of(validate_schema(&schema).unwrap_err()), "routes.by-id");
    }

    #[test]
    fn test_bad_factory_method_rejected() {
        let schema = SchemaDefinition::builder()
            .route("list", RouteDefinition::new().with_factory_method("list all"))
            .build();
        assert_eq!(
            field_of(validate_schema(&schema).unwrap_err()),
            "routes.list.useFactoryMethod"
        );
    }

    #[test]
    fn test_absolute_url_rejected() {
        let schema = SchemaDefinition::builder()
            .path("http://example.com/devices")
            .build();
        assert_eq!(field_of(validate_schema(&schema).unwrap_err()), "path");

        let schema = SchemaDefinition::builder()
            .route("get", "https://example.com")
            .build();
        assert_eq!(field_of(validate_schema(&schema).unwrap_err()), "routes.get");
    }

    #[test]
    fn test_named_middleware_checked() {
        let schema = SchemaDefinition::builder()
            .named_middleware("auth.session")
            .named_middleware("auth..broken")
            .build();
        assert_eq!(field_of(validate_schema(&schema).unwrap_err()), "middlewares[1]");
    }
}
