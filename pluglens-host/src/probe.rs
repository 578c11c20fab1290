//! Capability probing
//!
//! Contracts are identified by a stable interface id and checked
//! structurally: every method the contract declares must be present in the
//! interface table with the same signature text and a resolved call pointer.
//! A contract either binds completely or not at all.

use crate::module::RootObject;
use pluglens_api::abi::StringMethodFn;
use pluglens_api::{string_method_signature, PLUGIN_INTERFACE_IID};
use serde::Serialize;
use thiserror::Error;

/// A method a contract requires
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodSignature {
    pub name: String,
    pub signature: String,
}

impl MethodSignature {
    /// A nullary method returning a string
    pub fn string_method(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            signature: string_method_signature(&name),
            name,
        }
    }
}

/// A named method set a root object may implement
///
/// Every contract declares `name()` and `version()`; further string methods
/// can be added with [`CapabilityContract::method`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityContract {
    id: String,
    methods: Vec<MethodSignature>,
}

impl CapabilityContract {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            methods: vec![
                MethodSignature::string_method("name"),
                MethodSignature::string_method("version"),
            ],
        }
    }

    /// The `com.example.PluginInterface` contract
    pub fn plugin_interface() -> Self {
        Self::new(PLUGIN_INTERFACE_IID)
    }

    /// Require an additional string method
    pub fn method(mut self, name: impl Into<String>) -> Self {
        let method = MethodSignature::string_method(name);
        if !self.methods.contains(&method) {
            self.methods.push(method);
        }
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn methods(&self) -> &[MethodSignature] {
        &self.methods
    }
}

/// Contracts to probe, in priority order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContractRegistry {
    contracts: Vec<CapabilityContract>,
}

impl ContractRegistry {
    /// Registry with no contracts
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding only `com.example.PluginInterface`
    pub fn with_plugin_interface() -> Self {
        Self::new().register(CapabilityContract::plugin_interface())
    }

    /// Append a contract; re-registering an id replaces it in place
    pub fn register(mut self, contract: CapabilityContract) -> Self {
        match self.contracts.iter_mut().find(|c| c.id == contract.id) {
            Some(existing) => *existing = contract,
            None => self.contracts.push(contract),
        }
        self
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.contracts.iter().map(|c| c.id())
    }

    pub fn iter(&self) -> impl Iterator<Item = &CapabilityContract> {
        self.contracts.iter()
    }

    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }
}

/// Why a contract did not bind
#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum Rejection {
    #[error("interface not implemented")]
    NotImplemented,

    #[error("method '{0}' missing")]
    MissingMethod(String),

    #[error("method '{method}' has signature '{actual}', expected '{expected}'")]
    SignatureMismatch {
        method: String,
        expected: String,
        actual: String,
    },

    #[error("method '{0}' is unresolved")]
    Unresolved(String),
}

struct BoundMethod {
    name: String,
    call: StringMethodFn,
}

/// A root object viewed through a matched contract
///
/// Borrows the root object, so it cannot outlive the module.
pub struct BoundCapability<'r> {
    contract_id: String,
    root: &'r RootObject<'r>,
    methods: Vec<BoundMethod>,
}

impl<'r> BoundCapability<'r> {
    pub fn contract_id(&self) -> &str {
        &self.contract_id
    }

    /// Call a contract method by name
    pub fn invoke(&self, method: &str) -> Option<String> {
        self.methods
            .iter()
            .find(|m| m.name == method)
            .map(|m| self.root.call_string(m.call))
    }

    pub fn name(&self) -> String {
        self.invoke("name").unwrap_or_default()
    }

    pub fn version(&self) -> String {
        self.invoke("version").unwrap_or_default()
    }

    /// Contract method names in declaration order
    pub fn method_names(&self) -> impl Iterator<Item = &str> {
        self.methods.iter().map(|m| m.name.as_str())
    }
}

/// Tests root objects against registered contracts
#[derive(Debug, Clone, Default)]
pub struct CapabilityProbe {
    registry: ContractRegistry,
}

impl CapabilityProbe {
    pub fn new(registry: ContractRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ContractRegistry {
        &self.registry
    }

    /// Bind the first contract `root` fully satisfies
    ///
    /// Returns `None` for a null root object or when no contract matches.
    pub fn probe<'r>(&self, root: Option<&'r RootObject<'r>>) -> Option<BoundCapability<'r>> {
        let root = root?;

        for contract in self.registry.iter() {
            match bind(root, contract) {
                Ok(bound) => {
                    tracing::debug!(contract = %contract.id(), "Contract matched");
                    return Some(bound);
                }
                Err(reason) => {
                    tracing::debug!(contract = %contract.id(), %reason, "Contract rejected");
                }
            }
        }

        None
    }
}

fn bind<'r>(
    root: &'r RootObject<'r>,
    contract: &CapabilityContract,
) -> Result<BoundCapability<'r>, Rejection> {
    let table = root
        .query_interface(contract.id())
        .ok_or(Rejection::NotImplemented)?;
    let slots = unsafe { table.slots() };

    let mut methods = Vec::with_capacity(contract.methods().len());
    for required in contract.methods() {
        let slot = slots
            .iter()
            .find(|slot| unsafe { slot.name.as_bytes() } == required.name.as_bytes())
            .ok_or_else(|| Rejection::MissingMethod(required.name.clone()))?;

        let actual = unsafe { slot.signature.to_string_lossy() };
        if actual != required.signature {
            return Err(Rejection::SignatureMismatch {
                method: required.name.clone(),
                expected: required.signature.clone(),
                actual,
            });
        }

        let call = slot
            .call
            .ok_or_else(|| Rejection::Unresolved(required.name.clone()))?;
        methods.push(BoundMethod {
            name: required.name.clone(),
            call,
        });
    }

    Ok(BoundCapability {
        contract_id: contract.id().to_string(),
        root,
        methods,
    })
}
