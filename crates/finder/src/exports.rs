//! Export inspection and instance classification.

use serde::Serialize;
use serde_json::Value;

/// Key of the distinguished default export.
pub const DEFAULT_EXPORT_KEY: &str = "default";

/// Marker property carried by instances of well-known runtime classes.
pub const INSTANCE_MARKER_KEY: &str = "@instanceof";

/// Shape of a loaded module result.
pub trait ExportShape {
    /// The default export, if the result exposes one.
    fn default_export(&self) -> Option<&Self>;

    /// Named exports in insertion order. `None` unless the result is a plain
    /// keyed collection.
    fn named_exports(&self) -> Option<Vec<(&str, &Self)>>;
}

impl ExportShape for Value {
    fn default_export(&self) -> Option<&Self> {
        self.as_object()?.get(DEFAULT_EXPORT_KEY)
    }

    fn named_exports(&self) -> Option<Vec<(&str, &Self)>> {
        self.as_object()
            .map(|map| map.iter().map(|(k, v)| (k.as_str(), v)).collect())
    }
}

/// Decides whether a value is the instance being searched for.
pub trait InstancePredicate<V>: Send + Sync {
    fn is_instance(&self, value: &V) -> bool;
}

impl<V, F> InstancePredicate<V> for F
where
    F: Fn(&V) -> bool + Send + Sync,
{
    fn is_instance(&self, value: &V) -> bool {
        self(value)
    }
}

/// Recognises values tagged `{"@instanceof": {"$symbol": "<name>"}}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceOfPredicate {
    class_name: String,
}

impl InstanceOfPredicate {
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
        }
    }

    pub fn data_source() -> Self {
        Self::new("DataSource")
    }
}

impl InstancePredicate<Value> for InstanceOfPredicate {
    fn is_instance(&self, value: &Value) -> bool {
        value
            .get(INSTANCE_MARKER_KEY)
            .and_then(|marker| marker.get("$symbol"))
            .and_then(Value::as_str)
            .is_some_and(|name| name == self.class_name)
    }
}

/// Where in a module the instance was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum ExportSlot {
    Whole,
    Default,
    Named(String),
}

/// Classify a module result: whole result, then default export, then named
/// exports in order. First hit wins.
pub fn select_instance<'a, V, P>(exports: &'a V, predicate: &P) -> Option<(ExportSlot, &'a V)>
where
    V: ExportShape,
    P: InstancePredicate<V> + ?Sized,
{
    if predicate.is_instance(exports) {
        return Some((ExportSlot::Whole, exports));
    }

    if let Some(default) = exports.default_export() {
        if predicate.is_instance(default) {
            return Some((ExportSlot::Default, default));
        }
    }

    exports
        .named_exports()?
        .into_iter()
        .find(|(_, value)| predicate.is_instance(value))
        .map(|(name, value)| (ExportSlot::Named(name.to_string()), value))
}
