//! Pagemvc: controller/view dispatch for content pages.
//!
//! This is the library root that exports all modules.
//!
//! # Usage
//!
//! ```no_run
//! use std::rc::Rc;
//! use pagemvc::{Binder, MvcConfig, Page, PageProxy};
//!
//! let config = MvcConfig::from_env()?;
//! let binder = Rc::new(Binder::scanned(config));
//! let page = Page::new(1, "article").with_property("title", "Hello").shared();
//!
//! let proxy = PageProxy::new(page, binder)?;
//! let html = proxy.output(false)?.render()?;
//! # Ok::<(), pagemvc::MvcError>(())
//! ```

#![allow(clippy::new_without_default)]
#![allow(clippy::type_complexity)]

pub mod config;
pub mod error;
pub mod mvc;
pub mod page;
pub mod template;

pub use config::MvcConfig;
pub use error::{MvcError, RenderError, ResolutionError};
pub use mvc::{Binder, Controller, PageProxy, Registry, Role, View};
pub use page::{Page, SharedPage, Template};
