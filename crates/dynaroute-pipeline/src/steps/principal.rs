//! Resolving the principal of a request.

use crate::step::{Flow, Step, StepResult};
use dynaroute_core::{BoxFuture, Principal, PrincipalSource, Request, Response};
use std::sync::Arc;

/// Derives the request principal from its session and reloads it through
/// the registered [`PrincipalSource`].
///
/// A principal set by an outer layer wins over the session. Requests without
/// a session, or with an anonymous one, proceed without a principal. A
/// logged-in session without a uid becomes a principal built from the
/// session's name and email and is not reloaded. A failed reload is logged
/// and the unloaded principal is kept.
#[derive(Default)]
pub struct LoadPrincipal {
    source: Option<Arc<dyn PrincipalSource>>,
}

impl LoadPrincipal {
    /// Step name.
    pub const NAME: &'static str = "load_principal";

    /// Creates the step.
    pub fn new(source: Option<Arc<dyn PrincipalSource>>) -> Self {
        Self { source }
    }

    async fn load(&self, request: &mut Request) -> StepResult {
        if request.user().is_none() {
            let Some(session) = request.session() else {
                return Ok(Flow::Proceed);
            };

            match session.uid.clone() {
                Some(uid) => request.set_user(Some(Principal::with_id(uid))),
                None if session.logged_in => {
                    let principal = Principal::from_session(session);
                    request.set_user(Some(principal));
                    return Ok(Flow::Proceed);
                }
                None => return Ok(Flow::Proceed),
            }
        }

        let (Some(source), Some(current)) = (&self.source, request.user().cloned()) else {
            return Ok(Flow::Proceed);
        };

        match source.load(&current).await {
            Ok(loaded) => request.set_user(Some(loaded)),
            Err(error) => {
                tracing::warn!(
                    principal_id = current.id.as_deref().unwrap_or_default(),
                    error = %error,
                    "Could not load principal"
                );
            }
        }

        Ok(Flow::Proceed)
    }
}

impl Step for LoadPrincipal {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn call<'a>(
        &'a self,
        request: &'a mut Request,
        _response: &'a mut Response,
    ) -> BoxFuture<'a, StepResult> {
        Box::pin(self.load(request))
    }
}
