//! Builds the controller/view pair for a page and caches the view on it.

use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

use crate::config::MvcConfig;
use crate::error::ResolutionError;
use crate::mvc::naming::{resolve_class_name, resolve_file_path, Role};
use crate::mvc::proxy::PageProxy;
use crate::mvc::registry::{ClassContext, ClassFactory, ControllerFactory, Registry, ViewFactory};
use crate::mvc::view::View;

/// Resolves classes through the registry and binds them to proxies.
pub struct Binder {
    config: Rc<MvcConfig>,
    registry: RefCell<Registry>,
}

impl Binder {
    pub fn new(config: MvcConfig, registry: Registry) -> Self {
        Self {
            config: Rc::new(config),
            registry: RefCell::new(registry),
        }
    }

    /// Binder with an empty registry whose fallback follows the config.
    pub fn from_config(config: MvcConfig) -> Self {
        let registry = Registry::new().with_fallback(config.fallback_to_defaults);
        Self::new(config, registry)
    }

    /// Like [`Binder::from_config`], registering every definition found on disk.
    pub fn scanned(config: MvcConfig) -> Self {
        let binder = Self::from_config(config);
        let count = binder.registry.borrow_mut().scan(&binder.config);
        tracing::debug!(count, "scanned class definitions");
        binder
    }

    pub fn config(&self) -> &MvcConfig {
        &self.config
    }

    pub fn registry(&self) -> Ref<'_, Registry> {
        self.registry.borrow()
    }

    pub fn registry_mut(&self) -> RefMut<'_, Registry> {
        self.registry.borrow_mut()
    }

    /// Resolve and load the class for `type_name` in `role`.
    ///
    /// Fails when another page type already resolved to the same class.
    pub fn resolve(&self, type_name: &str, role: Role) -> Result<ClassFactory, ResolutionError> {
        let class_name = resolve_class_name(type_name, role);
        let path = resolve_file_path(&self.config, role, &class_name);
        tracing::trace!(role = %role, class = %class_name, path = %path.display(), "resolving class");
        let mut registry = self.registry.borrow_mut();
        let factory = registry.ensure_loaded(&path, &class_name, role)?;
        registry.claim(role, &class_name, type_name)?;
        Ok(factory)
    }

    /// Construct a fresh controller and view for the proxy's page and store
    /// the view in the page's cache slot.
    ///
    /// Nothing is cached when resolution fails.
    pub fn bind(&self, proxy: &Rc<PageProxy>) -> Result<Rc<dyn View>, ResolutionError> {
        let type_name = proxy.template_name();

        let (controller_ctx, controller_factory) = self.controller(&type_name)?;
        let controller = controller_factory(&controller_ctx, Rc::downgrade(proxy));

        let (view_ctx, view_factory) = self.view(&type_name)?;
        let view = view_factory(&view_ctx, controller);

        tracing::debug!(
            page = proxy.id(),
            controller = %controller_ctx.class_name,
            view = %view_ctx.class_name,
            "bound view"
        );

        proxy.page().borrow_mut().set_output(view.clone());
        Ok(view)
    }

    fn controller(&self, type_name: &str) -> Result<(ClassContext, ControllerFactory), ResolutionError> {
        match self.resolve(type_name, Role::Controller)? {
            ClassFactory::Controller(factory) => {
                Ok((self.context(type_name, Role::Controller), factory))
            }
            ClassFactory::View(_) => Err(ResolutionError::unregistered(
                Role::Controller,
                resolve_class_name(type_name, Role::Controller),
                None,
            )),
        }
    }

    fn view(&self, type_name: &str) -> Result<(ClassContext, ViewFactory), ResolutionError> {
        match self.resolve(type_name, Role::View)? {
            ClassFactory::View(factory) => Ok((self.context(type_name, Role::View), factory)),
            ClassFactory::Controller(_) => Err(ResolutionError::unregistered(
                Role::View,
                resolve_class_name(type_name, Role::View),
                None,
            )),
        }
    }

    fn context(&self, type_name: &str, role: Role) -> ClassContext {
        ClassContext {
            class_name: resolve_class_name(type_name, role),
            type_name: type_name.to_string(),
            config: self.config.clone(),
        }
    }
}
