//! Operation kinds and their fixed HTTP mapping.

use dynaroute_core::FactoryOperation;
use http::Method;
use std::fmt;

/// What a route does with its model.
///
/// `List` is a virtual verb: it is served over `GET` like `Get` but answers
/// with a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// Read a collection.
    List,
    /// Read one item.
    Get,
    /// Replace an item.
    Put,
    /// Create an item.
    Post,
    /// Delete an item.
    Delete,
    /// Modify an item.
    Patch,
}

impl OperationKind {
    /// Every kind, in mapping order.
    pub const ALL: [Self; 6] = [
        Self::List,
        Self::Get,
        Self::Put,
        Self::Post,
        Self::Delete,
        Self::Patch,
    ];

    /// Parses an operation kind. Matching is exact and case-sensitive.
    #[must_use]
    pub fn parse(kind: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == kind)
    }

    /// Returns the lower-case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Get => "get",
            Self::Put => "put",
            Self::Post => "post",
            Self::Delete => "delete",
            Self::Patch => "patch",
        }
    }

    /// Returns the HTTP method routes of this kind are served on.
    #[must_use]
    pub fn http_method(self) -> Method {
        match self {
            Self::List | Self::Get => Method::GET,
            Self::Put => Method::PUT,
            Self::Post => Method::POST,
            Self::Delete => Method::DELETE,
            Self::Patch => Method::PATCH,
        }
    }

    /// Returns the canonical factory operation of the default handler.
    #[must_use]
    pub const fn factory_operation(self) -> FactoryOperation {
        match self {
            Self::List => FactoryOperation::List,
            Self::Get => FactoryOperation::Get,
            Self::Post => FactoryOperation::Create,
            Self::Put | Self::Patch => FactoryOperation::Update,
            Self::Delete => FactoryOperation::Remove,
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
