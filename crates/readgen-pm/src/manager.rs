use std::fs;
use std::path::{Path, PathBuf};

use minijinja::{AutoEscape, Environment, ErrorKind, UndefinedBehavior};
use serde::Serialize;
use tracing::debug;

use crate::error::PmError;
use crate::template::PromptTemplate;

/// Name of the built-in README generation template.
pub const README_TEMPLATE: &str = "readme/generate";

/// Templates compiled into the binary, registered by [`PromptManager::new`].
const BUILTIN_TEMPLATES: &[(&str, &str)] = &[(
    README_TEMPLATE,
    include_str!("../templates/readme/generate.j2"),
)];

/// Manages prompt templates and renders them with context variables.
///
/// Built-in templates are always registered. Templates loaded afterwards with
/// [`load_dir`](Self::load_dir) or [`add_template`](Self::add_template)
/// replace built-ins of the same name.
#[derive(Debug)]
pub struct PromptManager {
    env: Environment<'static>,
}

impl PromptManager {
    /// Create a manager with the built-in templates registered.
    ///
    /// # Errors
    ///
    /// Returns `PmError::InvalidTemplate` if a built-in template fails to parse.
    pub fn new() -> Result<Self, PmError> {
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_auto_escape_callback(|_| AutoEscape::None);

        for &(name, source) in BUILTIN_TEMPLATES {
            env.add_template(name, source)
                .map_err(|e| PmError::invalid(name, &e))?;
        }

        Ok(Self { env })
    }

    /// Load all `.j2` / `.jinja` templates below a directory.
    ///
    /// Template names are the file paths relative to `dir` without the
    /// extension, using `/` as separator. Returns the number of templates loaded.
    ///
    /// # Errors
    ///
    /// Returns `PmError::Io` if the directory cannot be read and
    /// `PmError::InvalidTemplate` if a template fails to parse.
    pub fn load_dir(&mut self, dir: &Path) -> Result<usize, PmError> {
        let mut files = Vec::new();
        collect_files(dir, &mut files)?;
        files.sort();

        let mut loaded = 0;
        for path in files {
            let Some(name) = PromptTemplate::name_from_path(dir, &path) else {
                continue;
            };
            let source = fs::read_to_string(&path)?;
            debug!(template = %name, path = %path.display(), "loading prompt template");
            self.add_template(PromptTemplate { name, source })?;
            loaded += 1;
        }

        Ok(loaded)
    }

    /// Register a single template, replacing any existing one with the same name.
    ///
    /// # Errors
    ///
    /// Returns `PmError::InvalidTemplate` if the source fails to parse.
    pub fn add_template(&mut self, template: PromptTemplate) -> Result<(), PmError> {
        let PromptTemplate { name, source } = template;
        self.env
            .add_template_owned(name.clone(), source)
            .map_err(|e| PmError::invalid(&name, &e))
    }

    /// Returns whether a template with the given name is registered.
    pub fn has_template(&self, name: &str) -> bool {
        self.env.get_template(name).is_ok()
    }

    /// Render a template by name with the given context.
    ///
    /// # Errors
    ///
    /// Returns `PmError::TemplateNotFound` for an unknown name and
    /// `PmError::Render` if rendering fails.
    pub fn render<S: Serialize>(&self, name: &str, ctx: S) -> Result<String, PmError> {
        let template = self.env.get_template(name).map_err(|e| match e.kind() {
            ErrorKind::TemplateNotFound => PmError::TemplateNotFound {
                name: name.to_owned(),
            },
            _ => PmError::render(name, &e),
        })?;
        template
            .render(ctx)
            .map_err(|e| PmError::render(name, &e))
    }
}

fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), PmError> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_files(&path, out)?;
        } else {
            out.push(path);
        }
    }
    Ok(())
}
