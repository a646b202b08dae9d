//! Fixed-order step pipelines.
//!
//! A [`Pipeline`] is the immutable list of steps a compiled route replays for
//! every request. It is assembled once with a [`PipelineBuilder`] and never
//! reordered afterwards.

use crate::step::{FnStep, Step, StepResult, SyncStep};
use dynaroute_core::{BoxFuture, Request, Response};
use std::fmt;
use std::sync::Arc;

/// A type-erased step that can be stored in a pipeline.
pub type BoxedStep = Arc<dyn Step>;

/// An immutable, ordered list of steps.
///
/// # Example
///
/// ```
/// use dynaroute_pipeline::{Flow, Pipeline};
///
/// let pipeline = Pipeline::builder("/devices")
///     .sync_step("first", |_req, _res| Ok(Flow::Proceed))
///     .sync_step("second", |_req, _res| Ok(Flow::Proceed))
///     .build();
///
/// assert_eq!(pipeline.step_names(), vec!["first", "second"]);
/// ```
#[derive(Clone)]
pub struct Pipeline {
    /// Label used for logs and metrics, usually the HTTP route.
    label: String,

    /// Steps in execution order.
    steps: Vec<BoxedStep>,
}

impl Pipeline {
    /// Creates a new pipeline builder.
    #[must_use]
    pub fn builder(label: impl Into<String>) -> PipelineBuilder {
        PipelineBuilder::new(label)
    }

    /// Returns the label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the steps in execution order.
    #[must_use]
    pub fn steps(&self) -> &[BoxedStep] {
        &self.steps
    }

    /// Returns the names of all steps in order.
    #[must_use]
    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Returns the number of steps.
    #[must_use]
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Returns true if the pipeline has no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("label", &self.label)
            .field("steps", &self.step_names())
            .finish()
    }
}

/// Builder for constructing a [`Pipeline`].
pub struct PipelineBuilder {
    label: String,
    steps: Vec<BoxedStep>,
}

impl PipelineBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            steps: Vec::new(),
        }
    }

    /// Appends a shared step.
    #[must_use]
    pub fn step(mut self, step: BoxedStep) -> Self {
        self.steps.push(step);
        self
    }

    /// Appends several shared steps in order.
    #[must_use]
    pub fn steps(mut self, steps: impl IntoIterator<Item = BoxedStep>) -> Self {
        self.steps.extend(steps);
        self
    }

    /// Appends an async closure step.
    #[must_use]
    pub fn fn_step<F>(self, name: impl Into<String>, func: F) -> Self
    where
        F: for<'a> Fn(&'a mut Request, &'a mut Response) -> BoxFuture<'a, StepResult>
            + Send
            + Sync
            + 'static,
    {
        self.step(Arc::new(FnStep::new(name, func)))
    }

    /// Appends a synchronous closure step.
    #[must_use]
    pub fn sync_step<F>(self, name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&mut Request, &mut Response) -> StepResult + Send + Sync + 'static,
    {
        self.step(Arc::new(SyncStep::new(name, func)))
    }

    /// Appends a step only when `step` is `Some`.
    #[must_use]
    pub fn optional_step(self, step: Option<BoxedStep>) -> Self {
        match step {
            Some(step) => self.step(step),
            None => self,
        }
    }

    /// Returns the number of steps added so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns true if no step has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Builds the pipeline.
    #[must_use]
    pub fn build(self) -> Pipeline {
        Pipeline {
            label: self.label,
            steps: self.steps,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::Flow;
    use http::Method;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_empty_pipeline() {
        let pipeline = Pipeline::builder("/empty").build();
        assert!(pipeline.is_empty());
        assert_eq!(pipeline.step_count(), 0);
        assert_eq!(pipeline.label(), "/empty");
    }

    #[test]
    fn test_step_order_is_insertion_order() {
        let pipeline = Pipeline::builder("/devices")
            .sync_step("a", |_, _| Ok(Flow::Proceed))
            .fn_step("b", |_, _| Box::pin(async { Ok(Flow::Proceed) }))
            .optional_step(None)
            .sync_step("c", |_, _| Ok(Flow::Proceed))
            .build();

        assert_eq!(pipeline.step_names(), vec!["a", "b", "c"]);
        assert_eq!(pipeline.step_count(), 3);
    }

    #[test]
    fn test_builder_len() {
        let builder = PipelineBuilder::new("/x");
        assert!(builder.is_empty());
        let builder = builder.sync_step("only", |_, _| Ok(Flow::Proceed));
        assert_eq!(builder.len(), 1);
    }

    #[tokio::test]
    async fn test_shared_step_runs_in_each_pipeline() {
        let counter = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&counter);
        let shared: BoxedStep = Arc::new(SyncStep::new("count", move |_, _| {
            seen.fetch_add(1, Ordering::SeqCst);
            Ok(Flow::Proceed)
        }));

        let first = Pipeline::builder("/a").step(Arc::clone(&shared)).build();
        let second = Pipeline::builder("/b").steps([shared]).build();

        for pipeline in [&first, &second] {
            let mut req = Request::new(Method::GET, "/");
            let mut res = Response::new();
            pipeline.steps()[0].call(&mut req, &mut res).await.unwrap();
        }

        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_debug_lists_step_names() {
        let pipeline = Pipeline::builder("/devices")
            .sync_step("load_principal", |_, _| Ok(Flow::Proceed))
            .build();
        let debug = format!("{pipeline:?}");
        assert!(debug.contains("load_principal"));
    }
}
