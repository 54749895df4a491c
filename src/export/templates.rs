//! Template sets: the embedded defaults, or a user directory that replaces them.

use crate::error::ExportError;
use std::path::Path;
use tera::{Context, Tera};

pub const POJO_TEMPLATE: &str = "pojo.java.tera";
pub const DAO_TEMPLATE: &str = "dao.java.tera";

const BUILTIN: &[(&str, &str)] = &[
    (POJO_TEMPLATE, include_str!("../../templates/pojo.java.tera")),
    (DAO_TEMPLATE, include_str!("../../templates/dao.java.tera")),
];

pub struct TemplateSet {
    tera: Tera,
}

impl TemplateSet {
    pub fn builtin() -> Result<Self, ExportError> {
        let mut tera = Tera::default();
        tera.add_raw_templates(BUILTIN.iter().copied())
            .map_err(ExportError::Template)?;
        Ok(TemplateSet { tera })
    }

    /// Every file under `dir`, named by its path relative to `dir`. Nothing is inherited from the defaults.
    pub fn from_dir(dir: &Path) -> Result<Self, ExportError> {
        if !dir.is_dir() {
            return Err(ExportError::TemplateDirectory {
                path: dir.to_path_buf(),
            });
        }
        let pattern = dir.join("**").join("*");
        let tera = Tera::new(&pattern.to_string_lossy()).map_err(ExportError::Template)?;
        tracing::debug!(
            dir = %dir.display(),
            templates = tera.get_template_names().count(),
            "template override loaded"
        );
        Ok(TemplateSet { tera })
    }

    pub fn load(dir: Option<&Path>) -> Result<Self, ExportError> {
        match dir {
            Some(dir) => TemplateSet::from_dir(dir),
            None => TemplateSet::builtin(),
        }
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.tera.get_template_names().any(|n| n == name)
    }

    pub fn render(&self, name: &str, context: &Context) -> Result<String, tera::Error> {
        self.tera.render(name, context)
    }
}
