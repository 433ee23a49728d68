//! Linear workflow driver.
//!
//! A [`Pipeline`] is an ordered list of stateless [`Step`]s. Each step takes the
//! context produced by the previous one and returns the context for the next. The
//! first failing step ends the run and its error is returned untouched; no step is
//! retried or revisited.

use crate::api::error;

#[async_trait::async_trait]
pub trait Step<C>: Send + Sync
where
    C: Send + 'static,
{
    fn name(&self) -> &'static str;

    async fn run(&self, ctx: C) -> Result<C, error::SystemError>;
}

pub struct Pipeline<C> {
    name: &'static str,
    steps: Vec<Box<dyn Step<C>>>,
}

impl<C> Pipeline<C>
where
    C: Send + 'static,
{
    pub fn new(name: &'static str) -> Self {
        Pipeline { name, steps: Vec::new() }
    }

    pub fn step(mut self, step: impl Step<C> + 'static) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    pub async fn run(&self, mut ctx: C) -> Result<C, error::SystemError> {
        for step in &self.steps {
            tracing::debug!(pipeline = self.name, step = step.name(), "step started");
            ctx = match step.run(ctx).await {
                Ok(next) => next,
                Err(e) => {
                    tracing::warn!(
                        pipeline = self.name,
                        step = step.name(),
                        error = %e,
                        "step failed, aborting workflow"
                    );
                    return Err(e);
                }
            };
        }
        tracing::info!(pipeline = self.name, steps = self.steps.len(), "workflow completed");
        Ok(ctx)
    }
}
