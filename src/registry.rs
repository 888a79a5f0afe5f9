//! Action registry: tag → component factory.
//!
//! Nothing registers itself. The composition root builds a registry, calls
//! [`register_defaults`] (or registers its own actions), and hands it to
//! whatever drives the page.

use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::DashboardError;
use crate::render::TemplateEngine;
use crate::rpc::source::RuleSource;
use crate::view::{Component, DashboardView};

pub const DASHBOARD_ACTION: &str = "kh_approvals.dashboard";

/// Shared collaborators a factory may wire into a fresh component.
#[derive(Clone)]
pub struct ActionContext {
    pub source: Arc<dyn RuleSource>,
    pub templates: Arc<TemplateEngine>,
}

pub type ActionFactory = Arc<dyn Fn(&ActionContext) -> Box<dyn Component> + Send + Sync>;

#[derive(Default, Clone)]
pub struct ActionRegistry {
    actions: HashMap<String, ActionFactory>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, tag: impl Into<String>, factory: F) -> Result<(), DashboardError>
    where
        F: Fn(&ActionContext) -> Box<dyn Component> + Send + Sync + 'static,
    {
        let tag = tag.into();
        if self.actions.contains_key(&tag) {
            return Err(DashboardError::DuplicateAction(tag));
        }
        tracing::debug!(action = %tag, "action registered");
        self.actions.insert(tag, Arc::new(factory));
        Ok(())
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.actions.contains_key(tag)
    }

    /// Build a fresh, uninitialized component for `tag`.
    pub fn instantiate(
        &self,
        tag: &str,
        ctx: &ActionContext,
    ) -> Result<Box<dyn Component>, DashboardError> {
        let factory = self
            .actions
            .get(tag)
            .ok_or_else(|| DashboardError::UnknownAction(tag.to_string()))?;
        Ok(factory(ctx))
    }

    /// Registered tags, sorted.
    pub fn tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = self.actions.keys().cloned().collect();
        tags.sort();
        tags
    }
}

/// Register the built-in dashboard action.
pub fn register_defaults(registry: &mut ActionRegistry) -> Result<(), DashboardError> {
    registry.register(DASHBOARD_ACTION, |ctx: &ActionContext| {
        Box::new(DashboardView::new(
            Arc::clone(&ctx.source),
            Arc::clone(&ctx.templates),
        )) as Box<dyn Component>
    })
}
