//! Named template rendering.
//!
//! Templates are resolved by identifier at render time, so a missing or
//! misnamed template surfaces as [`RenderError::TemplateNotFound`] instead of
//! failing at build time. The dashboard template ships built in and can be
//! overridden by dropping a file with the same stem into the template dir.

use std::path::Path;

use handlebars::Handlebars;
use serde::Serialize;

use crate::errors::{DashboardError, RenderError};

pub const DASHBOARD_TEMPLATE: &str = "kh_approvals.dashboard_template";

const DASHBOARD_TEMPLATE_SRC: &str =
    include_str!("../../templates/kh_approvals.dashboard_template.hbs");

const TEMPLATE_EXTENSION: &str = "hbs";

pub struct TemplateEngine {
    registry: Handlebars<'static>,
}

impl TemplateEngine {
    /// An engine with no templates registered.
    pub fn empty() -> Self {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(false);
        Self { registry }
    }

    /// An engine with the built-in templates registered.
    pub fn with_builtin() -> Result<Self, DashboardError> {
        let mut engine = Self::empty();
        engine.register(DASHBOARD_TEMPLATE, DASHBOARD_TEMPLATE_SRC)?;
        Ok(engine)
    }

    pub fn register(&mut self, name: &str, source: &str) -> Result<(), DashboardError> {
        self.registry
            .register_template_string(name, source)
            .map_err(|e| DashboardError::Config(format!("template '{}' does not compile: {}", name, e)))
    }

    /// Register every `*.hbs` file in `dir` under its file stem, replacing
    /// any template already registered under that name. Returns the names
    /// that were loaded.
    pub fn load_dir(&mut self, dir: &Path) -> Result<Vec<String>, DashboardError> {
        let entries = std::fs::read_dir(dir).map_err(|e| {
            DashboardError::Config(format!("cannot read template dir {}: {}", dir.display(), e))
        })?;

        let mut loaded = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|e| DashboardError::Config(format!("cannot list template dir: {}", e)))?
                .path();

            if path.extension().and_then(|e| e.to_str()) != Some(TEMPLATE_EXTENSION) {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            let source = std::fs::read_to_string(&path).map_err(|e| {
                DashboardError::Config(format!("cannot read template {}: {}", path.display(), e))
            })?;
            self.register(name, &source)?;
            tracing::debug!(template = %name, path = %path.display(), "loaded template override");
            loaded.push(name.to_string());
        }

        loaded.sort();
        Ok(loaded)
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.registry.has_template(name)
    }

    pub fn render<T: Serialize>(&self, name: &str, context: &T) -> Result<String, RenderError> {
        if !self.registry.has_template(name) {
            return Err(RenderError::TemplateNotFound(name.to_string()));
        }
        self.registry
            .render(name, context)
            .map_err(|e| RenderError::Template(e.to_string()))
    }
}
