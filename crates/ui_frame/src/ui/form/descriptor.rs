//! Per-type form descriptor
//!
//! Every form type owns one `static` [`FormDescriptor`]. Its prefab path is
//! resolved on first use and then shared, unchanged, by every instance of the
//! type. Two threads racing the first resolution compute the same string, so
//! whichever wins the `OnceLock` is correct.

use std::any::type_name;
use std::borrow::Cow;
use std::sync::OnceLock;

/// Type-level prefab path, resolved lazily exactly once
#[derive(Debug)]
pub struct FormDescriptor {
    explicit: Option<&'static str>,
    resolved: OnceLock<String>,
}

impl FormDescriptor {
    /// Descriptor whose path derives from the type name
    pub const fn new() -> Self {
        Self {
            explicit: None,
            resolved: OnceLock::new(),
        }
    }

    /// Descriptor with an explicit path (an empty path falls back to the type name)
    pub const fn with_path(path: &'static str) -> Self {
        Self {
            explicit: Some(path),
            resolved: OnceLock::new(),
        }
    }

    /// Resolve the path for form type `T`, memoizing the first result
    ///
    /// `root` is only consulted on the first call.
    pub fn resolve<T: ?Sized>(&'static self, root: &str) -> &'static str {
        self.resolved.get_or_init(|| {
            let path = match self.explicit.filter(|path| !path.is_empty()) {
                Some(path) => path.to_string(),
                None => format!("{root}{}", simple_type_name::<T>()),
            };
            log::debug!("Resolved prefab path for {}: {}", type_name::<T>(), path);
            path
        })
    }

    /// The resolved path, if resolution already happened
    pub fn resolved(&self) -> Option<&str> {
        self.resolved.get().map(String::as_str)
    }

    /// The path `resolve` would return for `root`, without memoizing it
    pub fn peek<T: ?Sized>(&self, root: &str) -> Cow<'_, str> {
        if let Some(path) = self.resolved() {
            return Cow::Borrowed(path);
        }
        match self.explicit.filter(|path| !path.is_empty()) {
            Some(path) => Cow::Borrowed(path),
            None => Cow::Owned(format!("{root}{}", simple_type_name::<T>())),
        }
    }
}

impl Default for FormDescriptor {
    fn default() -> Self {
        Self::new()
    }
}

/// Type name without its module path or generic arguments
pub fn simple_type_name<T: ?Sized>() -> &'static str {
    let full = type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// Implement `FormType::descriptor` with a `static` descriptor
///
/// ```ignore
/// impl FormType for Dialog {
///     form_descriptor!();
///     fn create(_ctx: &UiContext) -> Self { Dialog::new() }
/// }
/// ```
///
/// Pass a path literal to override the derived path. The static lives in the
/// generated function, so generic form types share one descriptor across all
/// of their instantiations.
#[macro_export]
macro_rules! form_descriptor {
    () => {
        fn descriptor() -> &'static $crate::ui::FormDescriptor {
            static DESCRIPTOR: $crate::ui::FormDescriptor = $crate::ui::FormDescriptor::new();
            &DESCRIPTOR
        }
    };
    ($path:expr) => {
        fn descriptor() -> &'static $crate::ui::FormDescriptor {
            static DESCRIPTOR: $crate::ui::FormDescriptor = $crate::ui::FormDescriptor::with_path($path);
            &DESCRIPTOR
        }
    };
}
