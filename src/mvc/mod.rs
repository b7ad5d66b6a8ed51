//! Controller/view dispatch for pages.
//!
//! A page's template name selects its controller and view by convention:
//!
//! - `article` → `ArticleController` (`controllers/article_controller.yml`)
//! - `article` → `ArticleView` (`views/article_view.yml`)
//!
//! Classes come from explicit registration, from definition files, or from
//! the default controller/view when neither exists.

pub mod binder;
pub mod controller;
pub mod naming;
pub mod proxy;
pub mod registry;
pub mod view;

pub use binder::Binder;
pub use controller::{Controller, ControllerDefinition, DefaultController, ProxyRef};
pub use naming::Role;
pub use proxy::{PageProxy, ProxyState};
pub use registry::{ClassContext, ClassFactory, Registry};
pub use view::{DefaultView, View, ViewDefinition};
