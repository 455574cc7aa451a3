use std::collections::HashMap;

use crate::effects::builtin::{Blur, Border, Brightness, Clipping, DropShadow, Gamma, InnerShadow, Invert};
use crate::effects::{FilterDesc, ImageFilter};
use crate::foundation::error::{EngineError, EngineResult};

type Factory = Box<dyn Fn(&serde_json::Value) -> EngineResult<Box<dyn ImageFilter>> + Send + Sync>;

fn serde_factory<F>() -> Factory
where
    F: ImageFilter + serde::de::DeserializeOwned + 'static,
{
    Box::new(|params: &serde_json::Value| {
        let params = if params.is_null() {
            serde_json::json!({})
        } else {
            params.clone()
        };
        let f: F = serde_json::from_value(params)?;
        Ok(Box::new(f) as Box<dyn ImageFilter>)
    })
}

/// Name-keyed constructors for image filters.
///
/// Passed explicitly to whoever builds filters from descriptions; there is no process-wide
/// instance.
pub struct FilterRegistry {
    factories: HashMap<String, Factory>,
}

impl std::fmt::Debug for FilterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds: Vec<_> = self.factories.keys().collect();
        kinds.sort();
        f.debug_struct("FilterRegistry").field("kinds", &kinds).finish()
    }
}

impl Default for FilterRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl FilterRegistry {
    /// Registry with no kinds.
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registry preloaded with every built-in filter.
    pub fn with_builtins() -> Self {
        let mut r = Self::empty();
        r.factories.insert("blur".into(), serde_factory::<Blur>());
        r.factories.insert("drop_shadow".into(), serde_factory::<DropShadow>());
        r.factories.insert("inner_shadow".into(), serde_factory::<InnerShadow>());
        r.factories.insert("border".into(), serde_factory::<Border>());
        r.factories.insert("clipping".into(), serde_factory::<Clipping>());
        r.factories.insert("invert".into(), serde_factory::<Invert>());
        r.factories.insert("brightness".into(), serde_factory::<Brightness>());
        r.factories.insert("gamma".into(), serde_factory::<Gamma>());
        r
    }

    /// Register a constructor for `kind`. Fails if the kind is taken.
    pub fn register<F>(&mut self, kind: &str, factory: F) -> EngineResult<()>
    where
        F: Fn(&serde_json::Value) -> EngineResult<Box<dyn ImageFilter>> + Send + Sync + 'static,
    {
        if self.factories.contains_key(kind) {
            return Err(EngineError::validation(format!(
                "filter kind \"{kind}\" is already registered"
            )));
        }
        self.factories.insert(kind.to_string(), Box::new(factory));
        Ok(())
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.factories.contains_key(kind)
    }

    /// Build a filter from its description.
    pub fn create(&self, desc: &FilterDesc) -> EngineResult<Box<dyn ImageFilter>> {
        let factory = self
            .factories
            .get(&desc.kind)
            .ok_or_else(|| EngineError::validation(format!("unknown filter kind \"{}\"", desc.kind)))?;
        factory(&desc.params)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/registry.rs"]
mod tests;
