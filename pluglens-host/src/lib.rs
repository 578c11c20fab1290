//! pluglens-host: Native plugin host runtime
//!
//! This crate loads a plugin module, obtains its root object, probes it for
//! known capability contracts and falls back to reflective introspection
//! when none matches. See [`PluginLoader`] for the load sequence.

pub mod discovery;
pub mod error;
pub mod introspect;
pub mod loader;
pub mod module;
pub mod probe;
pub mod report;

pub use discovery::{is_native_library, scan_directory, DiscoveryError};
pub use error::{ErrorKind, LoaderError};
pub use introspect::{Introspector, MetadataIntrospector};
pub use loader::{LoadReport, LoadState, LoaderConfig, PluginLoader};
pub use module::{
    open_library_count, LibraryModule, LibraryOpener, ModuleOpener, PluginModule, RootObject,
    StaticModule, StaticOpener,
};
pub use probe::{BoundCapability, CapabilityContract, CapabilityProbe, ContractRegistry};
pub use report::{CapabilityReport, FailureReport, MethodResult, Outcome};
pub use pluglens_api::{
    Access, EnumDescriptor, EnumKey, MethodDescriptor, MethodKind, PropertyDescriptor,
    TypeDescription, PLUGIN_INTERFACE_IID,
};
