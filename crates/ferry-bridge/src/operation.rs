//! Operations and the registry they are exposed through.

use std::collections::BTreeMap;
use std::sync::Arc;

use ferry_core::HostValue;
use serde::Serialize;

use crate::error::{BridgeError, BridgeResult};

/// One positional parameter of an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Param {
    /// Parameter name as shown to callers.
    pub name: &'static str,
    /// What the caller should pass.
    pub description: &'static str,
    /// Whether the caller must supply it.
    pub required: bool,
}

impl Param {
    /// A required parameter.
    #[must_use]
    pub const fn required(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            description,
            required: true,
        }
    }

    /// An optional parameter.
    #[must_use]
    pub const fn optional(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            description,
            required: false,
        }
    }
}

/// Call contract of an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Contract {
    /// One-line description.
    pub summary: &'static str,
    /// Positional parameters. Required ones come first.
    pub params: Vec<Param>,
}

impl Contract {
    /// Create a contract.
    #[must_use]
    pub fn new(summary: &'static str, params: Vec<Param>) -> Self {
        Self { summary, params }
    }

    /// Fewest arguments a caller may pass.
    #[must_use]
    pub fn min_args(&self) -> usize {
        self.params.iter().filter(|p| p.required).count()
    }

    /// Most arguments the operation reads. Extra arguments are ignored.
    #[must_use]
    pub fn max_args(&self) -> usize {
        self.params.len()
    }

    /// Reject calls with fewer arguments than required.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Argument`] naming the missing parameters.
    pub fn check_arity(&self, operation: &str, supplied: usize) -> BridgeResult<()> {
        let min = self.min_args();
        if supplied >= min {
            return Ok(());
        }
        let names: Vec<&str> = self
            .params
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name)
            .collect();
        Err(BridgeError::argument(
            operation,
            format!(
                "expected at least {min} argument(s) ({}), got {supplied}",
                names.join(", ")
            ),
        ))
    }

    /// `name(a, b?)` style signature.
    #[must_use]
    pub fn signature(&self, name: &str) -> String {
        let params: Vec<String> = self
            .params
            .iter()
            .map(|p| {
                if p.required {
                    p.name.to_string()
                } else {
                    format!("{}?", p.name)
                }
            })
            .collect();
        format!("{name}({})", params.join(", "))
    }
}

/// A named host operation callable through the bridge.
///
/// Implementations run on a worker thread and may block.
pub trait Operation: Send + Sync {
    /// Name the operation is exposed under.
    fn name(&self) -> &'static str;

    /// Arguments the operation expects.
    fn contract(&self) -> Contract;

    /// Run the operation. Arity has already been checked against
    /// [`contract`](Self::contract); missing optional arguments read as
    /// [`HostValue::Undefined`].
    ///
    /// # Errors
    ///
    /// Any [`BridgeError`]; it becomes the invocation's rejection.
    fn call(&self, args: &[HostValue]) -> BridgeResult<String>;
}

/// Immutable set of exposed operations.
#[derive(Clone, Default)]
pub struct OperationRegistry {
    operations: BTreeMap<&'static str, Arc<dyn Operation>>,
}

impl OperationRegistry {
    /// Start building a registry.
    #[must_use]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Look up an operation by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn Operation>> {
        self.operations.get(name).cloned()
    }

    /// Exposed operation names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.operations.keys().copied()
    }

    /// Iterate over all operations, sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Operation>> {
        self.operations.values()
    }

    /// Number of exposed operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Whether no operation is exposed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

impl std::fmt::Debug for OperationRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationRegistry")
            .field("operations", &self.operations.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Collects operations before the registry is frozen.
#[derive(Default)]
pub struct RegistryBuilder {
    operations: BTreeMap<&'static str, Arc<dyn Operation>>,
}

impl RegistryBuilder {
    /// Add an operation.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::AlreadyRegistered`] if the name is taken.
    pub fn register<O: Operation + 'static>(mut self, operation: O) -> BridgeResult<Self> {
        let name = operation.name();
        if self.operations.contains_key(name) {
            return Err(BridgeError::AlreadyRegistered(name.to_string()));
        }
        self.operations.insert(name, Arc::new(operation));
        Ok(self)
    }

    /// Freeze the registry.
    #[must_use]
    pub fn build(self) -> OperationRegistry {
        OperationRegistry {
            operations: self.operations,
        }
    }
}
