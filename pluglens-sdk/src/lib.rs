//! pluglens-sdk: SDK for creating native plugins
//!
//! This SDK turns a plain Rust type into a plugin root object: implement
//! [`Plugin`], optionally [`PluginInterface`], and let [`export_plugin!`]
//! generate the module entry symbol. No `unsafe` is needed on the plugin side.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pluglens_sdk::prelude::*;
//!
//! struct Demo;
//!
//! impl Plugin for Demo {
//!     fn create() -> Option<Self> {
//!         Some(Demo)
//!     }
//!
//!     fn query_interface(&self, iid: &str) -> Option<&'static InterfaceTable> {
//!         (iid == PLUGIN_INTERFACE_IID).then(plugin_interface_table::<Self>)
//!     }
//! }
//!
//! impl PluginInterface for Demo {
//!     fn name(&self) -> String {
//!         "Demo".to_string()
//!     }
//!
//!     fn version(&self) -> String {
//!         "2.1".to_string()
//!     }
//! }
//!
//! // Generate the entry symbol
//! export_plugin!(Demo);
//! ```
//!
//! Build the crate as a `cdylib`.

use pluglens_api::abi::{InterfaceTable, MethodSlot, RawStr, RootObjectVTable};

// Re-export everything from pluglens-api
pub use pluglens_api::*;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{export_plugin, plugin_interface_table, Plugin, PluginInterface};
    pub use pluglens_api::abi::InterfaceTable;
    pub use pluglens_api::{
        Access, EnumDescriptor, MethodDescriptor, MethodKind, TypeDescription,
        PLUGIN_INTERFACE_IID,
    };
}

/// Trait that plugin root objects must implement
pub trait Plugin: Sized + 'static {
    /// Instantiates the root object; `None` exports a null root object
    fn create() -> Option<Self>;

    /// Type name reported to the host
    fn class_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Declared structure for reflective introspection
    fn type_description(&self) -> Option<TypeDescription> {
        None
    }

    /// Returns the method table of the interface `iid`, if implemented
    fn query_interface(&self, _iid: &str) -> Option<&'static InterfaceTable> {
        None
    }
}

/// The `com.example.PluginInterface` contract
pub trait PluginInterface: Plugin {
    fn name(&self) -> String;
    fn version(&self) -> String;
}

/// Method table implementing `com.example.PluginInterface` for `T`
pub fn plugin_interface_table<T: PluginInterface>() -> &'static InterfaceTable {
    <T as PluginInterfaceExport>::TABLE
}

trait PluginInterfaceExport {
    const SLOTS: &'static [MethodSlot];
    const TABLE: &'static InterfaceTable;
}

impl<T: PluginInterface> PluginInterfaceExport for T {
    const SLOTS: &'static [MethodSlot] = &[
        MethodSlot {
            name: RawStr::from_static("name"),
            signature: RawStr::from_static(NAME_SIGNATURE),
            call: Some(thunks::name::<T>),
        },
        MethodSlot {
            name: RawStr::from_static("version"),
            signature: RawStr::from_static(VERSION_SIGNATURE),
            call: Some(thunks::version::<T>),
        },
    ];
    const TABLE: &'static InterfaceTable = &InterfaceTable::new(Self::SLOTS);
}

trait RootExport {
    const VTABLE: &'static RootObjectVTable;
}

impl<T: Plugin> RootExport for T {
    const VTABLE: &'static RootObjectVTable = &RootObjectVTable {
        abi_version: ABI_VERSION,
        class_name: thunks::class_name::<T>,
        query_interface: Some(thunks::query_interface::<T>),
        type_description: Some(thunks::type_description::<T>),
        free_buffer: thunks::free_buffer,
        release: Some(thunks::release::<T>),
    };
}

/// Entry point plumbing used by [`export_plugin!`]
pub mod export {
    use super::{Plugin, RootExport};
    use pluglens_api::abi::RawRootObject;
    use std::ffi::c_void;

    /// Instantiate `T` and hand ownership to the host
    pub fn root_object<T: Plugin>() -> RawRootObject {
        match T::create() {
            Some(object) => RawRootObject {
                this: Box::into_raw(Box::new(object)) as *mut c_void,
                vtable: <T as RootExport>::VTABLE,
            },
            None => RawRootObject::null(),
        }
    }
}

mod thunks {
    use super::{Plugin, PluginInterface};
    use pluglens_api::abi::{InterfaceTable, RawBuffer, RawStr};
    use std::ffi::c_void;
    use std::ptr;

    unsafe fn object<'a, T>(this: *const c_void) -> &'a T {
        &*(this as *const T)
    }

    pub(super) unsafe extern "C" fn class_name<T: Plugin>(this: *const c_void) -> RawStr {
        RawStr::from_static(object::<T>(this).class_name())
    }

    pub(super) unsafe extern "C" fn query_interface<T: Plugin>(
        this: *const c_void,
        iid: RawStr,
    ) -> *const InterfaceTable {
        let Ok(iid) = std::str::from_utf8(iid.as_bytes()) else {
            return ptr::null();
        };
        match object::<T>(this).query_interface(iid) {
            Some(table) => table,
            None => ptr::null(),
        }
    }

    pub(super) unsafe extern "C" fn type_description<T: Plugin>(this: *const c_void) -> RawBuffer {
        let plugin = object::<T>(this);
        match plugin.type_description() {
            Some(description) => metadata_buffer(plugin.class_name(), description.to_msgpack()),
            None => RawBuffer::empty(),
        }
    }

    /// Encoded metadata, or an empty buffer when encoding failed
    pub(super) fn metadata_buffer<E: std::fmt::Display>(
        class_name: &str,
        encoded: Result<Vec<u8>, E>,
    ) -> RawBuffer {
        match encoded {
            Ok(bytes) => RawBuffer::from_vec(bytes),
            Err(e) => {
                tracing::warn!(class = %class_name, error = %e, "Type description encoding failed");
                RawBuffer::empty()
            }
        }
    }

    pub(super) unsafe extern "C" fn free_buffer(buffer: RawBuffer) {
        drop(buffer.into_vec());
    }

    pub(super) unsafe extern "C" fn release<T: Plugin>(this: *mut c_void) {
        drop(Box::from_raw(this as *mut T));
    }

    pub(super) unsafe extern "C" fn name<T: PluginInterface>(this: *const c_void) -> RawBuffer {
        RawBuffer::from_vec(object::<T>(this).name().into_bytes())
    }

    pub(super) unsafe extern "C" fn version<T: PluginInterface>(this: *const c_void) -> RawBuffer {
        RawBuffer::from_vec(object::<T>(this).version().into_bytes())
    }
}

/// Macro to export the module entry symbol
///
/// Generates `pluglens_root_object`, which instantiates the given [`Plugin`]
/// type each time the host asks for the root object.
///
/// # Example
///
/// ```rust,ignore
/// struct MyPlugin;
///
/// impl Plugin for MyPlugin {
///     fn create() -> Option<Self> { Some(MyPlugin) }
/// }
///
/// export_plugin!(MyPlugin);
/// ```
#[macro_export]
macro_rules! export_plugin {
    ($plugin:ty) => {
        #[no_mangle]
        pub extern "C" fn pluglens_root_object() -> $crate::abi::RawRootObject {
            $crate::export::root_object::<$plugin>()
        }
    };
}
