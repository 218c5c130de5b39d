//! Template loading utilities

use super::Template;
use crate::utils::image::ImageUtils;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Template loader searching one or more directories
pub struct TemplateLoader {
    template_dirs: Vec<PathBuf>,
    supported_extensions: Vec<String>,
}

impl TemplateLoader {
    /// Create new template loader
    pub fn new() -> Self {
        Self {
            template_dirs: Vec::new(),
            supported_extensions: vec![
                "png".to_string(),
                "jpg".to_string(),
                "jpeg".to_string(),
                "bmp".to_string(),
            ],
        }
    }

    /// Add template directory
    pub fn add_template_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.template_dirs.push(dir.as_ref().to_path_buf());
        self
    }

    /// Load template by name, `None` when no directory holds it
    pub fn load_template(&self, name: &str) -> Result<Option<Template>> {
        for ext in &self.supported_extensions {
            let candidate = format!("{}.{}", name, ext);
            if let Some(path) = self.find_template_file(&candidate) {
                let image = ImageUtils::load_grayscale(&path)
                    .with_context(|| format!("Failed to load template: {:?}", path))?;

                debug!(template = name, path = %path.display(), "template loaded");
                return Ok(Some(Template::new(name, image)));
            }
        }

        Ok(None)
    }

    /// Load a template that must exist
    pub fn require(&self, name: &str) -> Result<Template> {
        self.load_template(name)?.with_context(|| {
            format!(
                "Template '{}' not found in {:?}",
                name, self.template_dirs
            )
        })
    }

    /// Find template file in directories
    fn find_template_file(&self, candidate: &str) -> Option<PathBuf> {
        for dir in &self.template_dirs {
            let path = dir.join(candidate);
            if path.exists() {
                return Some(path);
            }

            // Case-insensitive search
            if let Ok(entries) = fs::read_dir(dir) {
                for entry in entries.flatten() {
                    let file_name = entry.file_name();
                    if file_name.to_string_lossy().eq_ignore_ascii_case(candidate) {
                        return Some(entry.path());
                    }
                }
            }
        }

        None
    }
}

impl Default for TemplateLoader {
    fn default() -> Self {
        Self::new()
    }
}
