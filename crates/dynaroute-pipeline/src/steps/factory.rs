//! The default factory loader.

use crate::resolver::FactoryResolver;
use crate::step::{BindContext, Flow, Step, StepResult};
use dynaroute_core::{BoxFuture, Request, Response};
use std::sync::Arc;

/// Resolves the route's factory and stores it in the request context, where
/// later steps pick it up.
pub struct LoadFactory {
    bind: Arc<BindContext>,
}

impl LoadFactory {
    /// Step name.
    pub const NAME: &'static str = "load_factory";

    /// Creates the step.
    pub fn new(bind: Arc<BindContext>) -> Self {
        Self { bind }
    }
}

impl Step for LoadFactory {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn call<'a>(
        &'a self,
        request: &'a mut Request,
        _response: &'a mut Response,
    ) -> BoxFuture<'a, StepResult> {
        let factory = FactoryResolver::resolve(&self.bind, request);
        request.context_mut().set_factory(factory);
        Box::pin(async { Ok(Flow::Proceed) })
    }
}
