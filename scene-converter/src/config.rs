//! Import/export configuration options and their per-phase materialization
//!
//! A session keeps two independent [`ConfigSet`]s, one per [`ConfigPhase`].
//! Right before the engine call of a phase, every option of that phase is
//! materialized into a [`PropertyStore`], the representation the engine
//! consumes. The store lives in a [`MaterializedConfigs`] guard that releases
//! every option exactly once, whether the phase succeeded or not.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::{
    error::{Error, Result},
    transform::Matrix4x4,
};

/// Which half of the pipeline a configuration option belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigPhase {
    /// Applied while importing and post-processing
    Import,
    /// Applied while exporting
    Export,
}

/// Property values understood by the engine
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// Integer property
    Integer(i32),
    /// Float property
    Float(f32),
    /// String property
    String(String),
    /// Boolean property (stored as integer by Assimp)
    Boolean(bool),
    /// Matrix property (4x4 transformation matrix)
    Matrix(Matrix4x4),
}

/// Materialized configuration handed to the engine for one phase
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyStore {
    properties: Vec<(String, PropertyValue)>,
}

impl PropertyStore {
    /// Create a new empty property store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a property
    pub fn set<S: Into<String>>(&mut self, name: S, value: PropertyValue) -> &mut Self {
        let name = name.into();
        match self.properties.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.properties.push((name, value)),
        }
        self
    }

    /// Remove a property, returning its value
    pub fn remove(&mut self, name: &str) -> Option<PropertyValue> {
        let pos = self.properties.iter().position(|(n, _)| n == name)?;
        Some(self.properties.remove(pos).1)
    }

    /// Look up a property
    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.properties
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Get all properties as a slice
    pub fn properties(&self) -> &[(String, PropertyValue)] {
        &self.properties
    }

    /// Check if the property store is empty
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Get the number of properties
    pub fn len(&self) -> usize {
        self.properties.len()
    }
}

/// A named configuration option with a materialize/release lifecycle.
///
/// `materialize` runs once when its phase starts and `release` once when the
/// phase ends, including when materialization or the engine call failed.
///
/// Both run while the owning [`ConverterSession`](crate::ConverterSession)
/// holds its lock. Calling back into that session from either deadlocks.
pub trait PropertyConfig: Send + Sync + fmt::Debug {
    /// Unique option name (the key in its [`ConfigSet`])
    fn name(&self) -> &str;

    /// Write the engine-facing representation into `store`
    fn materialize(&self, store: &mut PropertyStore) -> Result<()>;

    /// Undo [`materialize`](Self::materialize)
    fn release(&self, store: &mut PropertyStore) {
        store.remove(self.name());
    }
}

/// A plain name/value option
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    name: String,
    value: PropertyValue,
}

impl Property {
    /// Create an option from a name and value
    pub fn new<S: Into<String>>(name: S, value: PropertyValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    /// Integer option
    pub fn integer<S: Into<String>>(name: S, value: i32) -> Self {
        Self::new(name, PropertyValue::Integer(value))
    }

    /// Float option
    pub fn float<S: Into<String>>(name: S, value: f32) -> Self {
        Self::new(name, PropertyValue::Float(value))
    }

    /// String option
    pub fn string<S: Into<String>, V: Into<String>>(name: S, value: V) -> Self {
        Self::new(name, PropertyValue::String(value.into()))
    }

    /// Boolean option
    pub fn boolean<S: Into<String>>(name: S, value: bool) -> Self {
        Self::new(name, PropertyValue::Boolean(value))
    }

    /// Matrix option
    pub fn matrix<S: Into<String>>(name: S, value: Matrix4x4) -> Self {
        Self::new(name, PropertyValue::Matrix(value))
    }

    /// The option value
    pub fn value(&self) -> &PropertyValue {
        &self.value
    }
}

impl PropertyConfig for Property {
    fn name(&self) -> &str {
        &self.name
    }

    fn materialize(&self, store: &mut PropertyStore) -> Result<()> {
        if self.name.is_empty() || self.name.contains('\0') {
            return Err(Error::invalid_property(format!(
                "invalid property name {:?}",
                self.name
            )));
        }
        if let PropertyValue::String(s) = &self.value {
            if s.len() >= 1024 || s.contains('\0') {
                return Err(Error::invalid_property(format!(
                    "string value of {} does not fit an engine string",
                    self.name
                )));
            }
        }
        store.set(self.name.clone(), self.value.clone());
        Ok(())
    }
}

/// Options of one phase, keyed by name (last `set` wins)
#[derive(Debug, Clone, Default)]
pub struct ConfigSet {
    entries: BTreeMap<String, Arc<dyn PropertyConfig>>,
}

impl ConfigSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an option
    pub fn set(&mut self, config: Arc<dyn PropertyConfig>) {
        self.entries.insert(config.name().to_string(), config);
    }

    /// Remove an option; returns whether it was present
    pub fn remove(&mut self, name: &str) -> bool {
        self.entries.remove(name).is_some()
    }

    /// Remove every option
    pub fn remove_all(&mut self) {
        self.entries.clear();
    }

    /// Whether an option with this name is set
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Look up an option by name
    pub fn get(&self, name: &str) -> Option<&Arc<dyn PropertyConfig>> {
        self.entries.get(name)
    }

    /// Option names in sorted order
    pub fn names(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    /// Number of options
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Materialize every option into a fresh store.
    ///
    /// All options are attempted even after a failure; failures are reported
    /// together. On error every option has already been released.
    pub fn materialize(&self, phase: ConfigPhase) -> Result<MaterializedConfigs> {
        let mut guard = MaterializedConfigs {
            phase,
            entries: self.entries.values().cloned().collect(),
            store: PropertyStore::new(),
            released: false,
        };

        let failures: Vec<String> = guard
            .entries
            .iter()
            .filter_map(|entry| {
                entry
                    .materialize(&mut guard.store)
                    .err()
                    .map(|err| format!("{}: {}", entry.name(), err))
            })
            .collect();

        if failures.is_empty() {
            tracing::trace!(?phase, count = guard.entries.len(), "materialized configs");
            Ok(guard)
        } else {
            guard.release();
            Err(Error::invalid_property(failures.join("; ")))
        }
    }
}

/// Options of one phase materialized for the engine.
///
/// Every option is released exactly once, by [`release`](Self::release) or on drop.
pub struct MaterializedConfigs {
    phase: ConfigPhase,
    entries: Vec<Arc<dyn PropertyConfig>>,
    store: PropertyStore,
    released: bool,
}

impl MaterializedConfigs {
    /// Store to pass to the engine
    pub fn store(&self) -> &PropertyStore {
        &self.store
    }

    /// Phase these options belong to
    pub fn phase(&self) -> ConfigPhase {
        self.phase
    }

    /// Release every option; later calls are no-ops
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        for entry in &self.entries {
            entry.release(&mut self.store);
        }
        tracing::trace!(phase = ?self.phase, count = self.entries.len(), "released configs");
    }
}

impl fmt::Debug for MaterializedConfigs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MaterializedConfigs")
            .field("phase", &self.phase)
            .field("entries", &self.entries.len())
            .field("released", &self.released)
            .finish()
    }
}

impl Drop for MaterializedConfigs {
    fn drop(&mut self) {
        self.release();
    }
}

/// Common property keys
///
/// Values of Assimp's `AI_CONFIG_*` macros, usable with [`Property`].
pub mod property_keys {
    /// Remove vertex components (AI_CONFIG_PP_RVC_FLAGS)
    pub const REMOVE_VERTEX_COMPONENTS: &str = "PP_RVC_FLAGS";

    /// Maximum smoothing angle for normal generation (AI_CONFIG_PP_GSN_MAX_SMOOTHING_ANGLE)
    pub const MAX_SMOOTHING_ANGLE: &str = "PP_GSN_MAX_SMOOTHING_ANGLE";

    /// Remove degenerate faces (AI_CONFIG_PP_FD_REMOVE)
    pub const REMOVE_DEGENERATE_FACES: &str = "PP_FD_REMOVE";

    /// Split large meshes vertex limit (AI_CONFIG_PP_SLM_VERTEX_LIMIT)
    pub const SPLIT_LARGE_MESHES_VERTEX_LIMIT: &str = "PP_SLM_VERTEX_LIMIT";

    /// Split large meshes triangle limit (AI_CONFIG_PP_SLM_TRIANGLE_LIMIT)
    pub const SPLIT_LARGE_MESHES_TRIANGLE_LIMIT: &str = "PP_SLM_TRIANGLE_LIMIT";

    /// Limit bone weights (AI_CONFIG_PP_LBW_MAX_WEIGHTS)
    pub const LIMIT_BONE_WEIGHTS_MAX: &str = "PP_LBW_MAX_WEIGHTS";

    /// FBX: preserve pivots (AI_CONFIG_IMPORT_FBX_PRESERVE_PIVOTS)
    pub const FBX_PRESERVE_PIVOTS: &str = "IMPORT_FBX_PRESERVE_PIVOTS";

    /// FBX: read all geometry layers (AI_CONFIG_IMPORT_FBX_READ_ALL_GEOMETRY_LAYERS)
    pub const FBX_READ_ALL_GEOMETRY_LAYERS: &str = "IMPORT_FBX_READ_ALL_GEOMETRY_LAYERS";

    /// Global scale factor (AI_CONFIG_GLOBAL_SCALE_FACTOR_KEY)
    pub const GLOBAL_SCALE_FACTOR: &str = "GLOBAL_SCALE_FACTOR";

    /// Export: name of the primary blob (AI_CONFIG_EXPORT_BLOB_NAME)
    pub const EXPORT_BLOB_NAME: &str = "EXPORT_BLOB_NAME";
}
