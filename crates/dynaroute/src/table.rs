//! Mounting many schemas and routing requests to their compiled routes.

use bytes::Bytes;
use dynaroute_config::{DynarouteConfig, ServerSection};
use dynaroute_core::{Request, Response, RouteError};
use dynaroute_schema::{CatalogDocument, CompileResult, SchemaCatalog, SchemaCompiler, SchemaSource};
use http::Method;
use http_body_util::Full;
use tracing::{debug, info, warn};

use crate::error::{ServeError, ServeResult};
use crate::serve::{error_response, ServedRoute};

/// Routes requests by method and path to mounted routes.
///
/// When several routes match, the one with the fewest placeholder segments
/// wins, then the one mounted first. `OPTIONS` requests match on path alone.
///
/// # Example
///
/// ```
/// use dynaroute::{RouteTable, SchemaCatalog, SchemaCompiler, SchemaDefinition, ServerSection};
/// use http::Method;
///
/// let catalog = SchemaCatalog::new().with(
///     "devices",
///     SchemaDefinition::builder()
///         .path("/v1/devices")
///         .route("list", "")
///         .route("get", ":id")
///         .build(),
/// );
///
/// let table = RouteTable::from_catalog(
///     &SchemaCompiler::default(),
///     &catalog,
///     &ServerSection::default(),
/// )
/// .unwrap();
///
/// assert_eq!(table.len(), 2);
/// let route = table.find(&Method::GET, "/v1/devices/42").unwrap();
/// assert_eq!(route.route().route_id(), "get");
/// assert!(table.find(&Method::DELETE, "/v1/devices/42").is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<ServedRoute>,
}

impl RouteTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mounts every schema of `catalog` that `server` serves.
    ///
    /// With an empty schema list every schema is mounted in catalog order.
    /// Otherwise the configured ids are mounted in configured order; ids the
    /// catalog does not know are skipped.
    pub fn from_catalog(
        compiler: &SchemaCompiler,
        catalog: &SchemaCatalog,
        server: &ServerSection,
    ) -> CompileResult<Self> {
        let mut table = Self::new();

        let schema_ids: Vec<&str> = if server.schemas.is_empty() {
            catalog.ids().collect()
        } else {
            server.schemas.iter().map(String::as_str).collect()
        };

        for schema_id in schema_ids {
            if !catalog.contains(schema_id) {
                warn!(schema = %schema_id, "Configured schema not found in catalog, skipping");
                continue;
            }
            table.mount_schema(compiler, catalog, schema_id)?;
        }

        Ok(table)
    }

    /// Loads the catalog named by `server.schema_file` and mounts it.
    ///
    /// # Errors
    ///
    /// Returns [`ServeError::MissingCatalog`] when no schema file is
    /// configured, and a compile error when the file cannot be loaded or a
    /// route fails to compile.
    pub fn from_config(config: &DynarouteConfig, compiler: &SchemaCompiler) -> ServeResult<Self> {
        config.validate()?;

        let path = config
            .server
            .schema_file
            .as_deref()
            .ok_or(ServeError::MissingCatalog)?;
        let catalog = CatalogDocument::from_file(path)?.into_catalog();

        info!(
            service = %config.server.service_name,
            schema_file = %path,
            schemas = catalog.len(),
            "Loaded schema catalog"
        );

        Ok(Self::from_catalog(compiler, &catalog, &config.server)?)
    }

    /// Compiles and mounts every route of one schema, in declaration order.
    ///
    /// Returns the number of routes mounted.
    pub fn mount_schema<'a>(
        &mut self,
        compiler: &SchemaCompiler,
        source: impl Into<SchemaSource<'a>>,
        schema_id: &str,
    ) -> CompileResult<usize> {
        let routes = compiler.compile_all(source, schema_id)?;
        let count = routes.len();
        self.routes.extend(routes.into_iter().map(ServedRoute::new));

        info!(schema = %schema_id, routes = count, "Mounted schema");
        Ok(count)
    }

    /// Mounts a single served route.
    pub fn mount(&mut self, route: ServedRoute) {
        self.routes.push(route);
    }

    /// Returns the route that answers `method` on `path`.
    #[must_use]
    pub fn find(&self, method: &Method, path: &str) -> Option<&ServedRoute> {
        self.routes
            .iter()
            .filter(|served| {
                let route = served.route();
                (*method == Method::OPTIONS || route.http_method() == method)
                    && route.pattern().matches(path)
            })
            .min_by_key(|served| served.route().pattern().placeholder_count())
    }

    /// Answers one request. Unmatched requests get a `404` error body.
    pub async fn handle(&self, request: Request) -> Response {
        match self.find(request.method(), request.path()) {
            Some(route) => route.handle(request).await,
            None => {
                debug!(method = %request.method(), path = %request.path(), "No route matched");
                error_response(&RouteError::not_found(format!(
                    "no route for {} {}",
                    request.method(),
                    request.path()
                )))
            }
        }
    }

    /// Answers an `http` request.
    pub async fn handle_http(
        &self,
        request: http::Request<Full<Bytes>>,
    ) -> http::Response<Full<Bytes>> {
        match Request::from_http(request).await {
            Ok(request) => self.handle(request).await.into_http(),
            Err(error) => error_response(&error).into_http(),
        }
    }

    /// Returns the mounted routes in mount order.
    #[must_use]
    pub fn routes(&self) -> &[ServedRoute] {
        &self.routes
    }

    /// Returns the number of mounted routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns true if no route is mounted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dynaroute_schema::{RouteDefinition, SchemaDefinition};
    use http::StatusCode;

    fn catalog() -> SchemaCatalog {
        SchemaCatalog::new()
            .with(
                "devices",
                SchemaDefinition::builder()
                    .path("/v1/devices")
                    .route("get", ":id")
                    .route("active", RouteDefinition::for_method("get").with_path("active"))
                    .route("post", "")
                    .build(),
            )
            .with(
                "users",
                SchemaDefinition::builder()
                    .path("/v1/users")
                    .route("list", "")
                    .build(),
            )
    }

    fn table(server: &ServerSection) -> RouteTable {
        RouteTable::from_catalog(&SchemaCompiler::default(), &catalog(), server).unwrap()
    }

    #[test]
    fn test_mounts_whole_catalog_by_default() {
        let table = table(&ServerSection::default());
        let ids: Vec<_> = table
            .routes()
            .iter()
            .map(|r| (r.route().schema_id().to_string(), r.route().route_id().to_string()))
            .collect();

        assert_eq!(
            ids,
            vec![
                ("devices".to_string(), "get".to_string()),
                ("devices".to_string(), "active".to_string()),
                ("devices".to_string(), "post".to_string()),
                ("users".to_string(), "list".to_string()),
            ]
        );
    }

    #[test]
    fn test_configured_schemas_filter_and_skip_unknown() {
        let server = ServerSection {
            schemas: vec!["users".to_string(), "billing".to_string()],
            ..Default::default()
        };
        let table = table(&server);

        assert_eq!(table.len(), 1);
        assert_eq!(table.routes()[0].route().schema_id(), "users");
    }

    #[test]
    fn test_literal_segments_win_over_placeholders() {
        let table = table(&ServerSection::default());

        let active = table.find(&Method::GET, "/v1/devices/active").unwrap();
        assert_eq!(active.route().route_id(), "active");

        let get = table.find(&Method::GET, "/v1/devices/7").unwrap();
        assert_eq!(get.route().route_id(), "get");
    }

    #[test]
    fn test_find_by_method() {
        let table = table(&ServerSection::default());

        assert_eq!(
            table.find(&Method::POST, "/v1/devices").unwrap().route().route_id(),
            "post"
        );
        assert!(table.find(&Method::PUT, "/v1/devices").is_none());
        assert!(table.find(&Method::OPTIONS, "/v1/users").is_some());
    }

    #[tokio::test]
    async fn test_unmatched_request_is_not_found() {
        let table = table(&ServerSection::default());
        let res = table.handle(Request::new(Method::GET, "/v2/nothing")).await;

        assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(res.body().unwrap()["message"], "NotFound");
    }

    #[test]
    fn test_from_config_needs_schema_file() {
        let result = RouteTable::from_config(&DynarouteConfig::default(), &SchemaCompiler::default());
        assert!(matches!(result, Err(ServeError::MissingCatalog)));
    }

    #[test]
    fn test_mount_schema_rejects_unknown_schema() {
        let mut table = RouteTable::new();
        let result = table.mount_schema(&SchemaCompiler::default(), &catalog(), "billing");
        assert!(result.is_err());
        assert!(table.is_empty());
    }
}
