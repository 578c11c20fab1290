//! pluglens-api: Shared types for the pluglens plugin system
//!
//! This crate defines the protocol between a host and a native plugin module
//! (`.so` / `.dylib` / `.dll`). The module exports a single entry symbol that
//! returns its root object as a `#[repr(C)]` vtable pair; see [`abi`].
//! Structural metadata crosses the boundary MessagePack-encoded.

pub mod abi;

use serde::{Deserialize, Serialize};
use std::fmt;

/// ABI version for compatibility checking
pub const ABI_VERSION: u32 = 1;

/// Entry symbol every plugin module exports (`extern "C" fn() -> RawRootObject`)
pub const ROOT_OBJECT_SYMBOL: &str = "pluglens_root_object";

/// Interface id of the standard plugin contract
pub const PLUGIN_INTERFACE_IID: &str = "com.example.PluginInterface";

/// Canonical signature of the contract's `name` method
pub const NAME_SIGNATURE: &str = "name() -> string";

/// Canonical signature of the contract's `version` method
pub const VERSION_SIGNATURE: &str = "version() -> string";

/// Canonical signature text of a nullary string-returning method
pub fn string_method_signature(method: &str) -> String {
    format!("{}() -> string", method)
}

/// Member access level as declared by the plugin
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Access {
    Public,
    Protected,
    Private,
    #[default]
    Unknown,
}

/// Kind of a declared method
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodKind {
    #[default]
    Method,
    Signal,
    Slot,
    Constructor,
}

/// A declared method of the root object's type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDescriptor {
    /// Declared access level
    #[serde(default)]
    pub access: Access,

    /// Method, signal, slot or constructor
    #[serde(default)]
    pub kind: MethodKind,

    /// Method name
    pub name: String,

    /// Parameter names in declaration order
    #[serde(default)]
    pub parameters: Vec<String>,
}

/// A declared property of the root object's type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDescriptor {
    /// Property name
    pub name: String,

    /// Name of the property's type (e.g., "int", "QString")
    pub type_name: String,
}

/// One key of a declared enumeration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumKey {
    pub key: String,
    pub value: i64,
}

/// A declared enumeration of the root object's type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumDescriptor {
    /// Enumeration name
    pub name: String,

    /// Keys in declaration order
    #[serde(default)]
    pub keys: Vec<EnumKey>,
}

/// Structural snapshot of a root object's type
///
/// Produced by the plugin's `type_description` vtable entry. Owned data only:
/// once decoded on the host side it holds nothing that points into the module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDescription {
    /// Type name of the root object
    #[serde(default)]
    pub class_name: String,

    /// Declared methods in declaration order
    #[serde(default)]
    pub methods: Vec<MethodDescriptor>,

    /// Declared properties in declaration order
    #[serde(default)]
    pub properties: Vec<PropertyDescriptor>,

    /// Declared enumerations in declaration order
    #[serde(default)]
    pub enums: Vec<EnumDescriptor>,
}

impl TypeDescription {
    /// Create an empty description for a class
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            ..Default::default()
        }
    }

    /// Add a method
    pub fn method(mut self, method: MethodDescriptor) -> Self {
        self.methods.push(method);
        self
    }

    /// Add a property
    pub fn property(mut self, name: impl Into<String>, type_name: impl Into<String>) -> Self {
        self.properties.push(PropertyDescriptor {
            name: name.into(),
            type_name: type_name.into(),
        });
        self
    }

    /// Add an enumeration
    pub fn enumeration(mut self, enumeration: EnumDescriptor) -> Self {
        self.enums.push(enumeration);
        self
    }

    /// True when no member of any kind is declared
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty() && self.properties.is_empty() && self.enums.is_empty()
    }

    /// Encode as MessagePack for the `type_description` vtable entry
    pub fn to_msgpack(&self) -> Result<Vec<u8>, rmp_serde::encode::Error> {
        rmp_serde::to_vec_named(self)
    }

    /// Decode from the bytes returned by the `type_description` vtable entry
    pub fn from_msgpack(bytes: &[u8]) -> Result<Self, rmp_serde::decode::Error> {
        rmp_serde::from_slice(bytes)
    }
}

impl MethodDescriptor {
    fn with_kind(kind: MethodKind, name: impl Into<String>) -> Self {
        Self {
            access: Access::Public,
            kind,
            name: name.into(),
            parameters: Vec::new(),
        }
    }

    /// Create a public method
    pub fn method(name: impl Into<String>) -> Self {
        Self::with_kind(MethodKind::Method, name)
    }

    /// Create a public signal
    pub fn signal(name: impl Into<String>) -> Self {
        Self::with_kind(MethodKind::Signal, name)
    }

    /// Create a public slot
    pub fn slot(name: impl Into<String>) -> Self {
        Self::with_kind(MethodKind::Slot, name)
    }

    /// Create a public constructor
    pub fn constructor(name: impl Into<String>) -> Self {
        Self::with_kind(MethodKind::Constructor, name)
    }

    /// Set access level
    pub fn access(mut self, access: Access) -> Self {
        self.access = access;
        self
    }

    /// Add a parameter name
    pub fn param(mut self, name: impl Into<String>) -> Self {
        self.parameters.push(name.into());
        self
    }
}

impl EnumDescriptor {
    /// Create an enumeration with no keys
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            keys: Vec::new(),
        }
    }

    /// Add a key
    pub fn key(mut self, key: impl Into<String>, value: i64) -> Self {
        self.keys.push(EnumKey {
            key: key.into(),
            value,
        });
        self
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Access::Public => "public",
            Access::Protected => "protected",
            Access::Private => "private",
            Access::Unknown => "unknown",
        })
    }
}

impl fmt::Display for MethodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MethodKind::Method => "method",
            MethodKind::Signal => "signal",
            MethodKind::Slot => "slot",
            MethodKind::Constructor => "constructor",
        })
    }
}
