//! Class registry and loader for controllers and views.
//!
//! This module handles:
//! - Explicit registration of Rust controller/view constructors
//! - Loading definition files on first use (each file at most once)
//! - Scanning the controllers/views directories at startup
//! - Falling back to the default controller/view for unresolved class names
//! - Rejecting a second page type that maps onto an already bound class

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde::de::DeserializeOwned;

use crate::config::MvcConfig;
use crate::error::ResolutionError;
use crate::mvc::controller::{Controller, ControllerDefinition, DefaultController, ProxyRef};
use crate::mvc::naming::{class_from_file_stem, Role};
use crate::mvc::view::{DefaultView, TemplateLocation, View, ViewDefinition};

/// What a factory knows about the class it is constructing.
#[derive(Debug, Clone)]
pub struct ClassContext {
    pub class_name: String,
    /// Page type the class was resolved for (e.g. "article").
    pub type_name: String,
    pub config: Rc<MvcConfig>,
}

pub type ControllerFactory = Rc<dyn Fn(&ClassContext, ProxyRef) -> Rc<dyn Controller>>;
pub type ViewFactory = Rc<dyn Fn(&ClassContext, Rc<dyn Controller>) -> Rc<dyn View>>;

/// A constructor registered under a class name.
#[derive(Clone)]
pub enum ClassFactory {
    Controller(ControllerFactory),
    View(ViewFactory),
}

impl ClassFactory {
    pub fn role(&self) -> Role {
        match self {
            Self::Controller(_) => Role::Controller,
            Self::View(_) => Role::View,
        }
    }

    /// Whether both handles point at the same registered constructor.
    pub fn same_as(&self, other: &ClassFactory) -> bool {
        match (self, other) {
            (Self::Controller(a), Self::Controller(b)) => Rc::ptr_eq(a, b),
            (Self::View(a), Self::View(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Controller/view registry, keyed by class name per role.
pub struct Registry {
    controllers: HashMap<String, ControllerFactory>,
    views: HashMap<String, ViewFactory>,
    /// Definition files already loaded.
    loaded: HashSet<PathBuf>,
    /// Page type that first resolved each class.
    claims: HashMap<(Role, String), String>,
    fallback: bool,
}

impl Registry {
    /// Create an empty registry that falls back to the default classes.
    pub fn new() -> Self {
        Self {
            controllers: HashMap::new(),
            views: HashMap::new(),
            loaded: HashSet::new(),
            claims: HashMap::new(),
            fallback: true,
        }
    }

    /// Enable or disable the default fallback.
    pub fn with_fallback(mut self, fallback: bool) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn fallback(&self) -> bool {
        self.fallback
    }

    /// Register a controller constructor under `class_name`.
    pub fn register_controller<F>(&mut self, class_name: impl Into<String>, factory: F)
    where
        F: Fn(&ClassContext, ProxyRef) -> Rc<dyn Controller> + 'static,
    {
        self.controllers.insert(class_name.into(), Rc::new(factory));
    }

    /// Register a view constructor under `class_name`.
    pub fn register_view<F>(&mut self, class_name: impl Into<String>, factory: F)
    where
        F: Fn(&ClassContext, Rc<dyn Controller>) -> Rc<dyn View> + 'static,
    {
        self.views.insert(class_name.into(), Rc::new(factory));
    }

    /// Register a declarative controller.
    pub fn register_controller_definition(
        &mut self,
        class_name: impl Into<String>,
        definition: ControllerDefinition,
    ) {
        self.controllers
            .insert(class_name.into(), default_controller_factory(definition));
    }

    /// Register a declarative view.
    pub fn register_view_definition(&mut self, class_name: impl Into<String>, definition: ViewDefinition) {
        self.views
            .insert(class_name.into(), default_view_factory(definition));
    }

    /// Get a registered class.
    pub fn get(&self, role: Role, class_name: &str) -> Option<ClassFactory> {
        match role {
            Role::Controller => self
                .controllers
                .get(class_name)
                .cloned()
                .map(ClassFactory::Controller),
            Role::View => self.views.get(class_name).cloned().map(ClassFactory::View),
        }
    }

    pub fn is_registered(&self, role: Role, class_name: &str) -> bool {
        match role {
            Role::Controller => self.controllers.contains_key(class_name),
            Role::View => self.views.contains_key(class_name),
        }
    }

    /// All class names registered for a role, sorted.
    pub fn registered(&self, role: Role) -> Vec<&str> {
        let mut names: Vec<&str> = match role {
            Role::Controller => self.controllers.keys().map(String::as_str).collect(),
            Role::View => self.views.keys().map(String::as_str).collect(),
        };
        names.sort_unstable();
        names
    }

    pub fn is_loaded(&self, path: &Path) -> bool {
        self.loaded.contains(path)
    }

    /// Record that `type_name` resolves to `class_name`.
    ///
    /// Distinct type names such as `basic-page` and `basic_page` share a class
    /// name; the first one to resolve keeps it and later ones are rejected.
    pub fn claim(&mut self, role: Role, class_name: &str, type_name: &str) -> Result<(), ResolutionError> {
        match self.claims.get(&(role, class_name.to_string())) {
            Some(owner) if owner != type_name => {
                tracing::warn!(
                    role = %role,
                    class = %class_name,
                    type_name = %type_name,
                    claimed_by = %owner,
                    "page type maps onto a class bound to another type"
                );
                Err(ResolutionError::conflict(role, class_name, owner.as_str()))
            }
            Some(_) => Ok(()),
            None => {
                self.claims
                    .insert((role, class_name.to_string()), type_name.to_string());
                Ok(())
            }
        }
    }

    /// Page type that claimed a class, if any.
    pub fn claimed_by(&self, role: Role, class_name: &str) -> Option<&str> {
        self.claims
            .get(&(role, class_name.to_string()))
            .map(String::as_str)
    }

    /// Make `class_name` available for `role`.
    ///
    /// An already registered class wins. Otherwise the definition file at
    /// `path` is loaded if it exists and has not been loaded before. If the
    /// class is still missing, the role's default is registered under
    /// `class_name` when fallback is enabled.
    pub fn ensure_loaded(
        &mut self,
        path: &Path,
        class_name: &str,
        role: Role,
    ) -> Result<ClassFactory, ResolutionError> {
        if let Some(factory) = self.get(role, class_name) {
            return Ok(factory);
        }

        if !self.loaded.contains(path) && path.is_file() {
            self.load_file(path, role, class_name)?;
            if let Some(factory) = self.get(role, class_name) {
                return Ok(factory);
            }
        }

        if !self.fallback {
            return Err(ResolutionError::unregistered(
                role,
                class_name,
                Some(path.to_path_buf()),
            ));
        }

        tracing::debug!(role = %role, class = %class_name, "extending default class");
        match role {
            Role::Controller => {
                self.register_controller_definition(class_name, ControllerDefinition::default())
            }
            Role::View => self.register_view_definition(class_name, ViewDefinition::default()),
        }
        self.get(role, class_name)
            .ok_or_else(|| ResolutionError::unregistered(role, class_name, Some(path.to_path_buf())))
    }

    /// Scan the controllers and views directories and register every
    /// definition found. Malformed files are skipped with a warning.
    pub fn scan(&mut self, config: &MvcConfig) -> usize {
        let mut count = 0;
        for (role, dir) in [
            (Role::Controller, config.controllers_dir()),
            (Role::View, config.views_dir()),
        ] {
            for path in scan_definitions(&dir, role, &config.definition_extension) {
                if self.loaded.contains(&path) {
                    continue;
                }
                let Some((_, class_name)) = path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .and_then(class_from_file_stem)
                else {
                    continue;
                };

                match self.load_file(&path, role, &class_name) {
                    Ok(Some(registered)) => {
                        tracing::debug!(role = %role, class = %registered, "registered from scan");
                        count += 1;
                    }
                    Ok(None) => {}
                    Err(e) => tracing::warn!("Failed to load {}: {}", path.display(), e),
                }
            }
        }
        count
    }

    /// Load a definition file and register the class it defines. Returns the
    /// registered class name, or `None` when that class was already
    /// registered; existing registrations are never replaced.
    fn load_file(
        &mut self,
        path: &Path,
        role: Role,
        class_name: &str,
    ) -> Result<Option<String>, ResolutionError> {
        let source = fs::read_to_string(path)
            .map_err(|e| ResolutionError::unreadable(role, class_name, path.to_path_buf(), e))?;

        let registered = match role {
            Role::Controller => {
                let definition: ControllerDefinition = parse_definition(&source, path, role, class_name)?;
                let name = definition.class.clone().unwrap_or_else(|| class_name.to_string());
                if self.is_registered(role, &name) {
                    None
                } else {
                    self.register_controller_definition(name.clone(), definition);
                    Some(name)
                }
            }
            Role::View => {
                let definition: ViewDefinition = parse_definition(&source, path, role, class_name)?;
                let name = definition.class.clone().unwrap_or_else(|| class_name.to_string());
                if self.is_registered(role, &name) {
                    None
                } else {
                    self.register_view_definition(name.clone(), definition);
                    Some(name)
                }
            }
        };

        match &registered {
            Some(class) => tracing::debug!(path = %path.display(), class = %class, "loaded definition"),
            None => tracing::warn!(
                path = %path.display(),
                "definition names a class that is already registered, keeping the existing one"
            ),
        }
        self.loaded.insert(path.to_path_buf());
        Ok(registered)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_definition<T: DeserializeOwned + Default>(
    source: &str,
    path: &Path,
    role: Role,
    class_name: &str,
) -> Result<T, ResolutionError> {
    if source.trim().is_empty() {
        return Ok(T::default());
    }
    serde_yaml::from_str(source)
        .map_err(|e| ResolutionError::malformed(role, class_name, path.to_path_buf(), e.to_string()))
}

/// Definition files for `role` directly inside `dir`, sorted by path.
fn scan_definitions(dir: &Path, role: Role, extension: &str) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let suffix = format!("_{}", role.as_str());
    let extension = extension.trim_start_matches('.');

    let mut paths: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| path.extension().is_some_and(|ext| ext == extension))
        .filter(|path| {
            path.file_stem()
                .and_then(|s| s.to_str())
                .is_some_and(|stem| stem.ends_with(&suffix))
        })
        .collect();
    paths.sort();
    paths
}

fn default_controller_factory(definition: ControllerDefinition) -> ControllerFactory {
    let definition = Rc::new(definition);
    Rc::new(move |ctx: &ClassContext, proxy: ProxyRef| -> Rc<dyn Controller> {
        Rc::new(DefaultController::new(
            ctx.class_name.as_str(),
            proxy,
            ctx.config.default_action.as_str(),
            definition.clone(),
        ))
    })
}

fn default_view_factory(definition: ViewDefinition) -> ViewFactory {
    let definition = Rc::new(definition);
    Rc::new(move |ctx: &ClassContext, controller: Rc<dyn Controller>| -> Rc<dyn View> {
        let location = TemplateLocation {
            templates_dir: ctx.config.templates_dir(),
            type_name: ctx.type_name.clone(),
            extension: ctx.config.template_extension.clone(),
            default_action: ctx.config.default_action.clone(),
        };
        Rc::new(DefaultView::new(ctx.class_name.as_str(), controller, location, definition.clone()))
    })
}
