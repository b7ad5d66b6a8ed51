//! Views map actions to template files and render them.
//!
//! A view definition file is plain YAML:
//!
//! ```yaml
//! class: ArticleView
//! extension: .html
//! layout: blog
//! templates:
//!   print: article/print-friendly.html
//! ```
//!
//! Templates are looked up as `<templates_path>/<type>/<action><extension>`
//! unless `templates` overrides the action. Resolved paths never leave the
//! templates directory: actions that are not plain names are replaced by the
//! default action, and overrides that climb out are ignored.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::rc::Rc;

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use crate::error::RenderError;
use crate::mvc::controller::Controller;
use crate::mvc::naming::{file_name, is_plain_segment};
use crate::template::render_template;

/// Rendering object bound to exactly one controller.
pub trait View {
    fn class_name(&self) -> &str;

    fn controller(&self) -> Rc<dyn Controller>;

    /// Template file rendered for `action`.
    fn view_filename(&self, action: &str) -> PathBuf;

    /// Render the controller's current action.
    fn render(&self) -> Result<String, RenderError>;
}

impl fmt::Debug for dyn View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View")
            .field("class_name", &self.class_name())
            .field("controller", &self.controller().class_name())
            .finish()
    }
}

/// Declarative view loaded from a definition file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewDefinition {
    pub class: Option<String>,
    pub extension: Option<String>,
    pub layout: Option<String>,
    /// Action → template path, relative to the templates directory.
    pub templates: IndexMap<String, PathBuf>,
}

/// Where a default view finds its templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateLocation {
    pub templates_dir: PathBuf,
    pub type_name: String,
    pub extension: String,
    /// Action used when the requested one is not a plain name.
    pub default_action: String,
}

/// Last-resort action when even the configured default is unusable.
const FALLBACK_ACTION: &str = "index";

/// The view every unresolved class name falls back to.
pub struct DefaultView {
    class_name: String,
    controller: Rc<dyn Controller>,
    location: TemplateLocation,
    definition: Rc<ViewDefinition>,
}

impl DefaultView {
    pub fn new(
        class_name: impl Into<String>,
        controller: Rc<dyn Controller>,
        location: TemplateLocation,
        definition: Rc<ViewDefinition>,
    ) -> Self {
        Self {
            class_name: class_name.into(),
            controller,
            location,
            definition,
        }
    }

    pub fn definition(&self) -> &ViewDefinition {
        &self.definition
    }

    fn extension(&self) -> &str {
        self.definition
            .extension
            .as_deref()
            .unwrap_or(self.location.extension.as_str())
    }

    fn layout(&self) -> Option<String> {
        self.definition
            .layout
            .clone()
            .or_else(|| self.controller.layout())
    }

    /// Directory holding this type's templates.
    fn type_dir(&self) -> PathBuf {
        let type_name = &self.location.type_name;
        if is_plain_segment(type_name) {
            return self.location.templates_dir.join(type_name);
        }
        let stem = self.class_name.strip_suffix("View").unwrap_or(self.class_name.as_str());
        self.location.templates_dir.join(file_name(stem, ""))
    }

    fn layout_filename(&self, layout: &str) -> PathBuf {
        self.location
            .templates_dir
            .join("layouts")
            .join(format!("{}{}", layout, self.extension()))
    }
}

impl View for DefaultView {
    fn class_name(&self) -> &str {
        &self.class_name
    }

    fn controller(&self) -> Rc<dyn Controller> {
        self.controller.clone()
    }

    fn view_filename(&self, action: &str) -> PathBuf {
        if let Some(path) = self.definition.templates.get(action) {
            if stays_inside(path) {
                return self.location.templates_dir.join(path);
            }
            tracing::warn!(
                view = %self.class_name,
                action = %action,
                template = %path.display(),
                "ignoring template override outside the templates directory"
            );
        }

        let action = if is_plain_segment(action) {
            action
        } else if is_plain_segment(&self.location.default_action) {
            self.location.default_action.as_str()
        } else {
            FALLBACK_ACTION
        };
        self.type_dir()
            .join(format!("{}{}", action, self.extension()))
    }

    fn render(&self) -> Result<String, RenderError> {
        let proxy = self.controller.proxy().ok_or(RenderError::PageDropped)?;
        let action = self.controller.called_action();
        let path = self.view_filename(&action);

        tracing::debug!(
            view = %self.class_name,
            action = %action,
            template = %path.display(),
            "rendering view"
        );

        let lookup = |key: &str| -> Value { proxy.get(key) };
        let body = render_template(&read_template(&path)?, &lookup, None);

        match self.layout() {
            Some(layout) if !is_plain_segment(&layout) => {
                tracing::warn!(view = %self.class_name, layout = %layout, "ignoring layout that is not a plain name");
                Ok(body)
            }
            Some(layout) => {
                let layout_path = self.layout_filename(&layout);
                match read_template(&layout_path) {
                    Ok(source) => Ok(render_template(&source, &lookup, Some(&body))),
                    // No layout file, return content as-is
                    Err(RenderError::TemplateNotFound(_)) => Ok(body),
                    Err(e) => Err(e),
                }
            }
            None => Ok(body),
        }
    }
}

/// Whether a relative path only descends.
fn stays_inside(path: &Path) -> bool {
    path.components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

fn read_template(path: &Path) -> Result<String, RenderError> {
    fs::read_to_string(path).map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            RenderError::TemplateNotFound(path.to_path_buf())
        } else {
            RenderError::Io {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mvc::controller::{ControllerDefinition, DefaultController};
    use std::rc::Weak;

    fn view(definition: ViewDefinition) -> DefaultView {
        let controller: Rc<dyn Controller> = Rc::new(DefaultController::new(
            "ArticleController",
            Weak::new(),
            "index",
            Rc::new(ControllerDefinition::default()),
        ));
        DefaultView::new(
            "ArticleView",
            controller,
            TemplateLocation {
                templates_dir: PathBuf::from("/srv/site/templates"),
                type_name: "article".to_string(),
                extension: ".html".to_string(),
                default_action: "index".to_string(),
            },
            Rc::new(definition),
        )
    }

    #[test]
    fn test_view_filename_by_convention() {
        assert_eq!(
            view(ViewDefinition::default()).view_filename("show"),
            PathBuf::from("/srv/site/templates/article/show.html")
        );
    }

    #[test]
    fn test_view_filename_overrides() {
        let definition: ViewDefinition =
            serde_yaml::from_str("extension: .php\ntemplates:\n  print: shared/print.html\n")
                .unwrap();
        let view = view(definition);
        assert_eq!(
            view.view_filename("print"),
            PathBuf::from("/srv/site/templates/shared/print.html")
        );
        assert_eq!(
            view.view_filename("index"),
            PathBuf::from("/srv/site/templates/article/index.php")
        );
    }

    #[test]
    fn test_view_filename_stays_in_templates_dir() {
        let view = view(ViewDefinition::default());
        for action in ["../../secret", "..", "a/b", "a\\b", "x\0"] {
            assert_eq!(
                view.view_filename(action),
                PathBuf::from("/srv/site/templates/article/index.html")
            );
        }
    }

    #[test]
    fn test_escaping_override_ignored() {
        let definition: ViewDefinition = serde_yaml::from_str(
            "templates:\n  print: ../../etc/passwd\n  raw: /etc/passwd\n",
        )
        .unwrap();
        let view = view(definition);
        assert_eq!(
            view.view_filename("print"),
            PathBuf::from("/srv/site/templates/article/print.html")
        );
        assert_eq!(
            view.view_filename("raw"),
            PathBuf::from("/srv/site/templates/article/raw.html")
        );
    }

    #[test]
    fn test_unsafe_type_name_uses_class_name() {
        let mut view = view(ViewDefinition::default());
        view.location.type_name = "../article".to_string();
        assert_eq!(
            view.view_filename("show"),
            PathBuf::from("/srv/site/templates/article/show.html")
        );
    }

    #[test]
    fn test_layout_filename() {
        assert_eq!(
            view(ViewDefinition::default()).layout_filename("blog"),
            PathBuf::from("/srv/site/templates/layouts/blog.html")
        );
    }

    #[test]
    fn test_render_without_proxy_fails() {
        assert!(matches!(
            view(ViewDefinition::default()).render(),
            Err(RenderError::PageDropped)
        ));
    }

    #[test]
    fn test_read_missing_template() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.html");
        assert!(matches!(
            read_template(&missing),
            Err(RenderError::TemplateNotFound(path)) if path == missing
        ));
    }
}
