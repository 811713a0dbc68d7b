//! Per-schema lifecycle hooks and permission checks.

use std::any::Any;
use std::sync::Arc;

use lazyrecord_core::{Right, ValueMap};

/// The acting user, handed to [`ModelHooks::current_user_can`] untouched.
///
/// Hooks downcast it to their own user type:
///
/// ```
/// use std::sync::Arc;
/// use lazyrecord_model::CurrentUser;
///
/// struct Staff { admin: bool }
///
/// let user: CurrentUser = Arc::new(Staff { admin: true });
/// assert!(user.downcast_ref::<Staff>().is_some_and(|s| s.admin));
/// ```
pub type CurrentUser = Arc<dyn Any + Send + Sync>;

/// Hooks run around the lifecycle operations of one schema.
///
/// Every method has a permissive default, so an implementation only overrides what
/// it needs. `before_*` hooks may rewrite the argument set; `after_*` hooks see the
/// arguments as they were before column filtering.
pub trait ModelHooks: Send + Sync {
    /// Whether `user` may perform `right` with `args`. Checked before any SQL is built.
    fn current_user_can(&self, user: Option<&CurrentUser>, right: Right, args: &ValueMap) -> bool {
        let _ = (user, right, args);
        true
    }

    fn before_create(&self, args: ValueMap) -> ValueMap {
        args
    }

    fn after_create(&self, args: &ValueMap) {
        let _ = args;
    }

    fn before_update(&self, args: ValueMap) -> ValueMap {
        args
    }

    fn after_update(&self, args: &ValueMap) {
        let _ = args;
    }

    /// Receives the record data about to be deleted.
    fn before_delete(&self, data: &ValueMap) {
        let _ = data;
    }

    fn after_delete(&self, data: &ValueMap) {
        let _ = data;
    }
}

/// Allows everything and leaves arguments alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultHooks;

impl ModelHooks for DefaultHooks {}

#[cfg(test)]
mod tests {
    use super::*;
    use lazyrecord_core::{Value, value_map};

    struct Stamp;

    impl ModelHooks for Stamp {
        fn before_create(&self, mut args: ValueMap) -> ValueMap {
            args.insert("source".to_string(), Value::from("import"));
            args
        }
    }

    #[test]
    fn test_defaults_allow_and_pass_through() {
        let hooks = DefaultHooks;
        let args = value_map! { "title" => "Dune" };
        assert!(hooks.current_user_can(None, Right::Delete, &args));
        assert_eq!(hooks.before_update(args.clone()), args);
    }

    #[test]
    fn test_before_create_can_rewrite() {
        let args = Stamp.before_create(value_map! { "title" => "Dune" });
        assert_eq!(args.get("source"), Some(&Value::from("import")));
    }
}
