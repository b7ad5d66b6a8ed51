//! Naming conventions for controller and view classes.
//!
//! - `article` → `ArticleController` / `ArticleView`
//! - `basic-page` → `BasicPageController`, defined in `basic_page_controller.yml`
//!
//! Only alphanumerics survive into class names; every other character is a
//! word boundary. Type names that end up on the same class are rejected by
//! the registry.

use std::fmt;
use std::path::PathBuf;

use crate::config::MvcConfig;

/// The two resolvable roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Controller,
    View,
}

impl Role {
    /// Class name suffix, e.g. "Controller".
    pub fn suffix(self) -> &'static str {
        match self {
            Role::Controller => "Controller",
            Role::View => "View",
        }
    }

    /// Lowercase name, also used as the file stem suffix.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Controller => "controller",
            Role::View => "view",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Convert a type name to its class name for `role`.
///
/// "basic-page" + Controller → "BasicPageController"
pub fn resolve_class_name(type_name: &str, role: Role) -> String {
    let mut result = String::with_capacity(type_name.len() + role.suffix().len());
    let mut capitalize = true;
    for c in type_name.chars() {
        if !c.is_alphanumeric() {
            capitalize = true;
        } else if capitalize {
            result.extend(c.to_uppercase());
            capitalize = false;
        } else {
            result.push(c);
        }
    }
    result.push_str(role.suffix());
    result
}

/// Whether `name` is usable as a single path segment: non-empty, no
/// separators, no `..` and no NUL.
pub fn is_plain_segment(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && !name.contains("..")
        && !name.contains(|c: char| matches!(c, '/' | '\\' | '\0'))
}

/// Definition file name for a class: "BasicPageController" → "basic_page_controller.yml"
pub fn file_name(class_name: &str, extension: &str) -> String {
    let mut stem = String::with_capacity(class_name.len() + 4);
    for (i, c) in class_name.chars().enumerate() {
        if i > 0 && c.is_uppercase() {
            stem.push('_');
        }
        stem.extend(c.to_lowercase());
    }
    if extension.is_empty() {
        stem
    } else {
        format!("{}.{}", stem, extension.trim_start_matches('.'))
    }
}

/// Absolute path of the definition file for a class.
pub fn resolve_file_path(config: &MvcConfig, role: Role, class_name: &str) -> PathBuf {
    let base = match role {
        Role::Controller => config.controllers_dir(),
        Role::View => config.views_dir(),
    };
    base.join(file_name(class_name, &config.definition_extension))
}

/// Recover the role and class name from a definition file stem.
///
/// "basic_page_controller" → (Controller, "BasicPageController")
pub fn class_from_file_stem(stem: &str) -> Option<(Role, String)> {
    [Role::Controller, Role::View].into_iter().find_map(|role| {
        let type_name = stem.strip_suffix(&format!("_{}", role.as_str()))?;
        if type_name.is_empty() {
            return None;
        }
        Some((role, resolve_class_name(type_name, role)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_resolve_class_name() {
        assert_eq!(resolve_class_name("article", Role::Controller), "ArticleController");
        assert_eq!(resolve_class_name("article", Role::View), "ArticleView");
        assert_eq!(resolve_class_name("basic-page", Role::Controller), "BasicPageController");
        assert_eq!(resolve_class_name("blog_post", Role::View), "BlogPostView");
    }

    #[test]
    fn test_roles_never_collide() {
        for name in ["article", "home", "basic-page", "x", ""] {
            let controller = resolve_class_name(name, Role::Controller);
            let view = resolve_class_name(name, Role::View);
            assert_ne!(controller, view);
            assert_eq!(controller, resolve_class_name(name, Role::Controller));
        }
    }

    #[test]
    fn test_class_names_are_alphanumeric() {
        assert_eq!(
            resolve_class_name("../../etc/passwd", Role::Controller),
            "EtcPasswdController"
        );
        assert_eq!(resolve_class_name("a\\b\0c", Role::View), "ABCView");
    }

    #[test]
    fn test_is_plain_segment() {
        assert!(is_plain_segment("index"));
        assert!(is_plain_segment("print-friendly.v2"));
        assert!(!is_plain_segment(""));
        assert!(!is_plain_segment("."));
        assert!(!is_plain_segment(".."));
        assert!(!is_plain_segment("../../secret"));
        assert!(!is_plain_segment("a/b"));
        assert!(!is_plain_segment("a\\b"));
        assert!(!is_plain_segment("a\0b"));
    }

    #[test]
    fn test_file_name() {
        assert_eq!(file_name("ArticleController", "yml"), "article_controller.yml");
        assert_eq!(file_name("BasicPageView", ".yml"), "basic_page_view.yml");
        assert_eq!(file_name("HomeView", ""), "home_view");
    }

    #[test]
    fn test_resolve_file_path_uses_role_base() {
        let config = MvcConfig::new("/srv/site");
        assert_eq!(
            resolve_file_path(&config, Role::Controller, "ArticleController"),
            Path::new("/srv/site/controllers/article_controller.yml")
        );
        assert_eq!(
            resolve_file_path(&config, Role::View, "ArticleView"),
            Path::new("/srv/site/views/article_view.yml")
        );
    }

    #[test]
    fn test_class_from_file_stem() {
        assert_eq!(
            class_from_file_stem("basic_page_controller"),
            Some((Role::Controller, "BasicPageController".to_string()))
        );
        assert_eq!(
            class_from_file_stem("article_view"),
            Some((Role::View, "ArticleView".to_string()))
        );
        assert_eq!(class_from_file_stem("_view"), None);
        assert_eq!(class_from_file_stem("helpers"), None);
    }
}
