//! Minimal page model consumed by the dispatch proxy.
//!
//! Pages belong to the content layer. The proxy only aliases them through
//! [`SharedPage`] and sees every mutation made elsewhere.

use std::cell::RefCell;
use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::mvc::view::View;

/// Page handle shared between the content layer and the proxy.
pub type SharedPage = Rc<RefCell<Page>>;

/// Template metadata attached to a page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Template {
    /// Type name used to resolve the controller and view (e.g. "basic-page").
    pub name: String,
    /// Resolved content file, read by the viewability check.
    pub filename: Option<PathBuf>,
    /// Alternate content file hint.
    pub alt_filename: Option<PathBuf>,
}

impl Template {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            filename: None,
            alt_filename: None,
        }
    }

    /// A page is viewable once its template points at a content file.
    pub fn is_viewable(&self) -> bool {
        self.filename.is_some()
    }
}

/// One unit of content.
pub struct Page {
    pub id: u64,
    pub name: String,
    pub path: String,
    pub template: Template,
    properties: IndexMap<String, Value>,
    /// Cached view; only replaced by a bind pass.
    output: Option<Rc<dyn View>>,
}

impl Page {
    pub fn new(id: u64, template: impl Into<String>) -> Self {
        Self {
            id,
            name: String::new(),
            path: String::new(),
            template: Template::new(template),
            properties: IndexMap::new(),
            output: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Wrap into a shared handle.
    pub fn shared(self) -> SharedPage {
        Rc::new(RefCell::new(self))
    }

    /// Read a property; absent keys yield `Value::Null`.
    pub fn get(&self, key: &str) -> Value {
        match key {
            "id" => Value::from(self.id),
            "name" => Value::from(self.name.clone()),
            "path" => Value::from(self.path.clone()),
            "template" => Value::from(self.template.name.clone()),
            _ => self.properties.get(key).cloned().unwrap_or(Value::Null),
        }
    }

    /// Write a property, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.properties.insert(key.into(), value.into());
    }

    pub fn has(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.properties.shift_remove(key)
    }

    pub fn properties(&self) -> &IndexMap<String, Value> {
        &self.properties
    }

    pub fn output(&self) -> Option<Rc<dyn View>> {
        self.output.clone()
    }

    /// Overwrite the cached view.
    pub fn set_output(&mut self, view: Rc<dyn View>) {
        self.output = Some(view);
    }
}

impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("template", &self.template)
            .field("properties", &self.properties)
            .field("output", &self.output.as_ref().map(|v| v.class_name().to_string()))
            .finish()
    }
}
