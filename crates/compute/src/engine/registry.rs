use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;
use tunegraph_core::{Dataset, ParamBundle};

/// Names starting with this prefix mark shared helper code, not runnable units.
pub const RESERVED_PREFIX: char = '_';

/// The single entry point every analysis unit exposes: read the dataset and
/// parameters, write one artifact under `output_prefix`, return its full path.
pub type EntryPoint =
    Arc<dyn Fn(&Dataset, &ParamBundle, &Path) -> anyhow::Result<PathBuf> + Send + Sync>;

/// A registered unit. `entry_point` is `None` for a unit that was declared
/// but never wired to a callable.
#[derive(Clone)]
pub struct UnitDefinition {
    name: String,
    entry_point: Option<EntryPoint>,
}

impl UnitDefinition {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entry_point(&self) -> Option<&EntryPoint> {
        self.entry_point.as_ref()
    }
}

impl std::fmt::Debug for UnitDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnitDefinition")
            .field("name", &self.name)
            .field("entry_point", &self.entry_point.is_some())
            .finish()
    }
}

/// Name -> unit lookup table, populated at startup from an explicit
/// registration table. Thread-safe to share once built.
#[derive(Default)]
pub struct UnitRegistry {
    units: HashMap<String, UnitDefinition>,
}

impl UnitRegistry {
    pub fn new() -> Self {
        Self {
            units: HashMap::new(),
        }
    }

    /// Register a runnable unit. Returns error if the name is taken or invalid.
    pub fn register<F>(&mut self, name: &str, run: F) -> Result<(), RegistryError>
    where
        F: Fn(&Dataset, &ParamBundle, &Path) -> anyhow::Result<PathBuf> + Send + Sync + 'static,
    {
        let entry_point: EntryPoint = Arc::new(run);
        self.insert(name, Some(entry_point))
    }

    /// Declare a unit without an entry point.
    pub fn declare(&mut self, name: &str) -> Result<(), RegistryError> {
        self.insert(name, None)
    }

    fn insert(&mut self, name: &str, entry_point: Option<EntryPoint>) -> Result<(), RegistryError> {
        validate_name(name)?;
        if self.units.contains_key(name) {
            return Err(RegistryError::DuplicateName(name.to_string()));
        }
        debug!(unit = name, runnable = entry_point.is_some(), "registered unit");
        self.units.insert(
            name.to_string(),
            UnitDefinition {
                name: name.to_string(),
                entry_point,
            },
        );
        Ok(())
    }

    /// Look up a unit by name, helpers included.
    pub fn resolve(&self, name: &str) -> Option<&UnitDefinition> {
        self.units.get(name)
    }

    /// Every runnable unit name, sorted, with reserved helper entries removed.
    pub fn discover(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .units
            .keys()
            .filter(|n| !n.starts_with(RESERVED_PREFIX))
            .cloned()
            .collect();
        names.sort();
        names
    }

    /// Number of registered entries, helpers included.
    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

fn validate_name(name: &str) -> Result<(), RegistryError> {
    // Names double as output file stems.
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(RegistryError::InvalidName(name.to_string()))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Unit with name '{0}' is already registered")]
    DuplicateName(String),
    #[error("Invalid unit name '{0}'")]
    InvalidName(String),
}
