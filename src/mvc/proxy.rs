//! Dispatch proxy standing in for a page.
//!
//! The proxy binds the page's controller/view on construction and exposes
//! the view through [`PageProxy::output`]. The page capabilities callers use
//! (`id`, `name`, `path`, `get`, `set`, `has`, `remove`) are forwarded to the
//! wrapped page unchanged.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use serde_json::Value;

use crate::error::ResolutionError;
use crate::mvc::binder::Binder;
use crate::mvc::view::View;
use crate::page::{SharedPage, Template};

/// Binding state; a proxy becomes `Bound` once and stays there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyState {
    Unbound,
    Bound,
}

pub struct PageProxy {
    page: SharedPage,
    binder: Rc<Binder>,
    state: Cell<ProxyState>,
}

impl PageProxy {
    /// Wrap `page` and run the initial bind.
    ///
    /// The bound view's file for the current action is written to the
    /// page template's `filename` and `alt_filename` is cleared, so the page
    /// counts as viewable. On failure the page is left untouched.
    pub fn new(page: SharedPage, binder: Rc<Binder>) -> Result<Rc<Self>, ResolutionError> {
        let proxy = Rc::new(Self {
            page,
            binder,
            state: Cell::new(ProxyState::Unbound),
        });

        let view = proxy.binder.bind(&proxy)?;
        let action = view.controller().called_action();
        let filename = view.view_filename(&action);

        tracing::debug!(
            page = proxy.id(),
            action = %action,
            filename = %filename.display(),
            "page proxy bound"
        );

        {
            let mut page = proxy.page.borrow_mut();
            page.template.filename = Some(filename);
            page.template.alt_filename = None;
        }
        proxy.state.set(ProxyState::Bound);
        Ok(proxy)
    }

    pub fn state(&self) -> ProxyState {
        self.state.get()
    }

    /// The view for this page, rebuilt when `force_new` is set or nothing is
    /// cached yet.
    pub fn output(self: &Rc<Self>, force_new: bool) -> Result<Rc<dyn View>, ResolutionError> {
        if !force_new {
            let cached = self.page.borrow().output();
            if let Some(view) = cached {
                return Ok(view);
            }
        }
        self.binder.bind(self)
    }

    /// The wrapped page.
    pub fn page(&self) -> &SharedPage {
        &self.page
    }

    pub fn binder(&self) -> &Rc<Binder> {
        &self.binder
    }

    pub fn id(&self) -> u64 {
        self.page.borrow().id
    }

    pub fn name(&self) -> String {
        self.page.borrow().name.clone()
    }

    pub fn path(&self) -> String {
        self.page.borrow().path.clone()
    }

    pub fn template(&self) -> Template {
        self.page.borrow().template.clone()
    }

    pub fn template_name(&self) -> String {
        self.page.borrow().template.name.clone()
    }

    pub fn get(&self, key: &str) -> Value {
        self.page.borrow().get(key)
    }

    /// Write through to the page; returns the proxy for chaining.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) -> &Self {
        self.page.borrow_mut().set(key, value);
        self
    }

    pub fn has(&self, key: &str) -> bool {
        self.page.borrow().has(key)
    }

    pub fn remove(&self, key: &str) -> Option<Value> {
        self.page.borrow_mut().remove(key)
    }
}

impl fmt::Debug for PageProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageProxy")
            .field("page", &self.page)
            .field("state", &self.state.get())
            .finish()
    }
}
