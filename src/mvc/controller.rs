//! Controllers decide which action a page is rendered with.
//!
//! A controller definition file is plain YAML:
//!
//! ```yaml
//! class: ArticleController
//! default_action: show
//! actions: [show, print]
//! layout: blog
//! ```
//!
//! Every field is optional. Without an `actions` list any `action` page
//! property that is a plain name (no path separators, no `..`) is accepted.

use std::fmt;
use std::rc::{Rc, Weak};

use serde::Deserialize;

use crate::mvc::naming::is_plain_segment;
use crate::mvc::proxy::PageProxy;

/// Page property selecting the current action.
pub const ACTION_PROPERTY: &str = "action";

/// Non-owning handle to the proxy a controller is bound to.
pub type ProxyRef = Weak<PageProxy>;

/// Role-specific logic object bound to exactly one proxy.
pub trait Controller {
    fn class_name(&self) -> &str;

    /// The proxy this controller was constructed with, if still alive.
    fn proxy(&self) -> Option<Rc<PageProxy>>;

    /// Name of the currently selected action, defaulted when none is selected.
    fn called_action(&self) -> String;

    /// Layout the view wraps its output in.
    fn layout(&self) -> Option<String> {
        None
    }
}

impl fmt::Debug for dyn Controller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controller")
            .field("class_name", &self.class_name())
            .finish()
    }
}

/// Declarative controller loaded from a definition file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ControllerDefinition {
    /// Class the file defines; when absent the file defines the class it was
    /// resolved for.
    pub class: Option<String>,
    pub default_action: Option<String>,
    pub actions: Vec<String>,
    pub layout: Option<String>,
}

impl ControllerDefinition {
    /// Check if an action may be selected by the page.
    pub fn allows(&self, action: &str) -> bool {
        self.actions.is_empty() || self.actions.iter().any(|a| a == action)
    }
}

/// The controller every unresolved class name falls back to.
pub struct DefaultController {
    class_name: String,
    proxy: ProxyRef,
    default_action: String,
    definition: Rc<ControllerDefinition>,
}

impl DefaultController {
    pub fn new(
        class_name: impl Into<String>,
        proxy: ProxyRef,
        default_action: impl Into<String>,
        definition: Rc<ControllerDefinition>,
    ) -> Self {
        let default_action = definition
            .default_action
            .clone()
            .unwrap_or_else(|| default_action.into());
        Self {
            class_name: class_name.into(),
            proxy,
            default_action,
            definition,
        }
    }

    pub fn definition(&self) -> &ControllerDefinition {
        &self.definition
    }

    fn requested_action(&self) -> Option<String> {
        let proxy = self.proxy.upgrade()?;
        let action = proxy.get(ACTION_PROPERTY);
        let action = action.as_str()?.trim();
        if action.is_empty() {
            return None;
        }
        if !is_plain_segment(action) {
            tracing::warn!(
                controller = %self.class_name,
                action = %action,
                "rejecting action that is not a plain name"
            );
            return None;
        }
        Some(action.to_string())
    }
}

impl Controller for DefaultController {
    fn class_name(&self) -> &str {
        &self.class_name
    }

    fn proxy(&self) -> Option<Rc<PageProxy>> {
        self.proxy.upgrade()
    }

    fn called_action(&self) -> String {
        match self.requested_action() {
            Some(action) if self.definition.allows(&action) => action,
            Some(action) => {
                tracing::debug!(
                    controller = %self.class_name,
                    action = %action,
                    "action not allowed, using default"
                );
                self.default_action.clone()
            }
            None => self.default_action.clone(),
        }
    }

    fn layout(&self) -> Option<String> {
        self.definition.layout.clone()
    }
}
