//! Built-in steps every compiled route can contain.
//!
//! | Step | Present when |
//! |------|--------------|
//! | [`ValidateHeaders`] | the route has a header schema |
//! | [`ValidateBody`] | the route has a body schema |
//! | [`LoadPrincipal`] | always |
//! | [`LoadFactory`] | the route has no custom factory loader |
//! | [`DefaultHandler`] | the route has no custom handler |

pub mod factory;
pub mod handlers;
pub mod principal;
pub mod validation;

pub use factory::LoadFactory;
pub use handlers::{echo_handler, DefaultHandler};
pub use principal::LoadPrincipal;
pub use validation::{ValidateBody, ValidateHeaders};
