use crate::error::MarkupError;
use std::io;
use std::path::{Path, PathBuf};

pub const DEFAULT_DECOUPLED_LOGIC_SUFFIX: &str = ".th.xml";

/// Source text of a decoupled logic resource.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecoupledLogicResource {
    pub name: String,
    pub content: String,
}

/// Locates the decoupled logic resource that belongs to a template.
pub trait DecoupledLogicResolver: Send + Sync {
    /// `Ok(None)` when the template has no decoupled logic.
    fn resolve(&self, template: &Path) -> Result<Option<DecoupledLogicResource>, MarkupError>;
}

/// Looks for `{prefix}{template base name}{suffix}` next to the template,
/// so `templates/home.html` maps to `templates/home.th.xml` by default.
#[derive(Clone, Debug)]
pub struct StandardDecoupledLogicResolver {
    prefix: String,
    suffix: String,
}

impl Default for StandardDecoupledLogicResolver {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            suffix: DEFAULT_DECOUPLED_LOGIC_SUFFIX.to_string(),
        }
    }
}

impl StandardDecoupledLogicResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    pub fn resource_path(&self, template: &Path) -> Option<PathBuf> {
        let base = template.file_stem()?.to_str()?;
        let file_name = format!("{}{base}{}", self.prefix, self.suffix);
        Some(match template.parent() {
            Some(dir) => dir.join(file_name),
            None => PathBuf::from(file_name),
        })
    }
}

impl DecoupledLogicResolver for StandardDecoupledLogicResolver {
    fn resolve(&self, template: &Path) -> Result<Option<DecoupledLogicResource>, MarkupError> {
        let Some(path) = self.resource_path(template) else {
            return Ok(None);
        };
        let name = path.display().to_string();
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                log::debug!(target: "markup.decoupled", "resolved decoupled logic {name}");
                Ok(Some(DecoupledLogicResource { name, content }))
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(MarkupError::Io {
                resource: name,
                source,
            }),
        }
    }
}
