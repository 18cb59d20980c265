//! Theme engine
//!
//! This module provides template rendering using Tera.
//! Features:
//! - Loading `*.html` templates from `themes/<active>/`
//! - A built-in default theme compiled into the binary
//! - Fallback rendering that always produces a page

use anyhow::{Context, Result};
use rust_embed::RustEmbed;
use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::fs;
use std::path::{Path, PathBuf};
use tera::{Context as TeraContext, Tera};

mod error;

pub use error::ThemeError;

/// Built-in default theme
#[derive(RustEmbed)]
#[folder = "templates/"]
#[include = "*.html"]
struct DefaultTheme;

/// Template rendered for missing posts, tags and routes
pub const NOT_FOUND_TEMPLATE: &str = "404.html";

/// Template rendered when another template fails
pub const ERROR_TEMPLATE: &str = "error.html";

/// Theme engine for rendering templates
pub struct ThemeEngine {
    /// Tera template engine instance
    tera: Tera,
    /// Path to themes directory
    themes_path: PathBuf,
    /// Currently active theme name
    current_theme: String,
}

impl ThemeEngine {
    /// Create a new theme engine
    ///
    /// # Arguments
    /// * `themes_path` - Path to the themes directory
    /// * `active_theme` - Name of the theme directory to load
    ///
    /// A missing theme directory is not an error: every page is then
    /// served by the built-in theme.
    pub fn new(themes_path: &Path, active_theme: &str) -> Result<Self> {
        let mut engine = Self {
            tera: Tera::default(),
            themes_path: themes_path.to_path_buf(),
            current_theme: active_theme.to_string(),
        };
        engine.load_templates()?;
        Ok(engine)
    }

    /// Built-in theme only, ignoring the filesystem
    pub fn builtin() -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(embedded_templates()?).map_err(|e| {
            ThemeError::TemplateError(error_chain("Failed to load built-in theme", &e))
        })?;

        Ok(Self {
            tera,
            themes_path: PathBuf::new(),
            current_theme: "builtin".to_string(),
        })
    }

    /// Load the active theme over the built-in one.
    ///
    /// A template on disk replaces the built-in template of the same name;
    /// templates the theme lacks keep their built-in version.
    fn load_templates(&mut self) -> Result<()> {
        let mut templates: BTreeMap<String, String> =
            embedded_templates()?.into_iter().collect();

        let theme_path = self.themes_path.join(&self.current_theme);
        if theme_path.is_dir() {
            let mut on_disk = Vec::new();
            collect_templates_from_dir(&theme_path, &theme_path, &mut on_disk)?;
            tracing::info!(
                "Loaded {} templates from theme '{}'",
                on_disk.len(),
                self.current_theme
            );
            templates.extend(on_disk);
        } else {
            tracing::warn!(
                "Theme directory {:?} not found, using the built-in theme",
                theme_path
            );
        }

        // Registering everything in one call lets children precede their parents
        let mut tera = Tera::default();
        tera.add_raw_templates(templates.into_iter().collect::<Vec<_>>())
            .map_err(|e| {
                let what = format!("Failed to load theme '{}'", self.current_theme);
                ThemeError::TemplateError(error_chain(&what, &e))
            })?;

        self.tera = tera;
        Ok(())
    }

    /// Re-read the active theme from disk
    pub fn reload_templates(&mut self) -> Result<()> {
        if !self.themes_path.join(&self.current_theme).is_dir() {
            return Err(ThemeError::NotFound(self.current_theme.clone()).into());
        }
        self.load_templates()
    }

    /// Render a template with context
    ///
    /// # Arguments
    /// * `template` - Template name (e.g., "index.html", "post-details.html")
    /// * `context` - Tera context with template variables
    pub fn render(&self, template: &str, context: &TeraContext) -> Result<String> {
        self.tera
            .render(template, context)
            .map_err(|e| {
                let what = format!("Failed to render '{}'", template);
                ThemeError::TemplateError(error_chain(&what, &e)).into()
            })
    }

    /// Render a template with fallback to the error template or simple HTML
    ///
    /// Never fails: if `template` cannot be rendered, `error.html` is tried,
    /// and a plain built-in page is returned as a last resort.
    pub fn render_with_fallback(&self, template: &str, context: &TeraContext) -> String {
        match self.render(template, context) {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!(
                    "Failed to render template '{}': {}, trying error template",
                    template,
                    e
                );

                let mut error_context = context.clone();
                error_context.insert("error_message", &e.to_string());
                error_context.insert("requested_template", template);

                match self.render(ERROR_TEMPLATE, &error_context) {
                    Ok(html) => html,
                    Err(error_template_err) => {
                        tracing::warn!(
                            "Failed to render error template: {}, returning simple HTML error page",
                            error_template_err
                        );
                        simple_error_page("Template Error", &e.to_string())
                    }
                }
            }
        }
    }

    /// Render the not-found page for `message`
    pub fn render_not_found(&self, message: &str) -> String {
        let mut context = TeraContext::new();
        context.insert("message", message);

        match self.render(NOT_FOUND_TEMPLATE, &context) {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!("Failed to render not-found page: {}", e);
                simple_error_page("Not Found", message)
            }
        }
    }

    /// Get the current theme name
    pub fn current_theme(&self) -> &str {
        &self.current_theme
    }
}

/// Every `*.html` file of the built-in theme
fn embedded_templates() -> Result<Vec<(String, String)>> {
    DefaultTheme::iter()
        .map(|name| {
            let file = DefaultTheme::get(&name)
                .ok_or_else(|| ThemeError::NotFound(format!("built-in template {}", name)))?;
            let content = String::from_utf8(file.data.into_owned())
                .with_context(|| format!("Built-in template {} is not UTF-8", name))?;
            Ok((name.into_owned(), content))
        })
        .collect()
}

/// Collect templates below `current_path`, named by their path relative to `base_path`
fn collect_templates_from_dir(
    base_path: &Path,
    current_path: &Path,
    templates: &mut Vec<(String, String)>,
) -> Result<()> {
    for entry in fs::read_dir(current_path).map_err(ThemeError::from)? {
        let path = entry.map_err(ThemeError::from)?.path();

        if path.is_dir() {
            collect_templates_from_dir(base_path, &path, templates)?;
        } else if path.extension().is_some_and(|ext| ext == "html") {
            let relative_path = path
                .strip_prefix(base_path)
                .map_err(|_| ThemeError::TemplateError("Failed to get relative path".to_string()))?;

            // Forward slashes on every platform
            let template_name = relative_path.to_string_lossy().replace('\\', "/");

            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read template: {:?}", path))?;

            templates.push((template_name, content));
        }
    }

    Ok(())
}

/// Flatten a Tera error and its causes into one message
fn error_chain(what: &str, e: &tera::Error) -> String {
    let mut message = format!("{}: {}", what, e);
    let mut source = e.source();
    while let Some(s) = source {
        message.push_str(&format!("\n  Caused by: {}", s));
        source = s.source();
    }
    message
}

/// Generate a simple HTML page.
///
/// Last resort when neither the requested template nor the error
/// template can be rendered.
pub fn simple_error_page(title: &str, message: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>{title}</title>
    <style>
        body {{ font-family: sans-serif; max-width: 600px; margin: 50px auto; padding: 20px; }}
        h1 {{ color: #c0392b; }}
    </style>
</head>
<body>
    <h1>{title}</h1>
    <p>{message}</p>
</body>
</html>"#,
        title = tera::escape_html(title),
        message = tera::escape_html(message),
    )
}

#[cfg(test)]
mod tests;
