//! Test plugins compiled into the test binary and served by `StaticOpener`

#![allow(dead_code)]

use pluglens_host::{StaticOpener, TypeDescription};
use pluglens_sdk::abi::{
    InterfaceTable, MethodSlot, RawBuffer, RawRootObject, RawStr, RootObjectVTable,
};
use pluglens_sdk::export::root_object;
use pluglens_sdk::prelude::*;
use pluglens_sdk::{NAME_SIGNATURE, VERSION_SIGNATURE};
use std::ffi::c_void;
use std::sync::atomic::{AtomicUsize, Ordering};

pub const DEMO_PATH: &str = "plugins/demo.so";
pub const LEGACY_PATH: &str = "plugins/legacy.so";
pub const NULL_PATH: &str = "plugins/null.so";
pub const OPAQUE_PATH: &str = "plugins/opaque.so";
pub const NAMELESS_PATH: &str = "plugins/nameless.so";
pub const MISMATCH_PATH: &str = "plugins/mismatch.so";
pub const UNRESOLVED_PATH: &str = "plugins/unresolved.so";
pub const VENDOR_PATH: &str = "plugins/vendor.so";
pub const ABI_PATH: &str = "plugins/abi.so";
pub const MISSING_PATH: &str = "plugins/missing.so";

pub const VENDOR_IID: &str = "com.example.VendorInterface";

/// Number of demo root objects released so far
pub static DEMO_RELEASES: AtomicUsize = AtomicUsize::new(0);

/// Implements `com.example.PluginInterface`
pub struct DemoPlugin;

impl Plugin for DemoPlugin {
    fn create() -> Option<Self> {
        Some(DemoPlugin)
    }

    fn class_name(&self) -> &'static str {
        "DemoPlugin"
    }

    fn type_description(&self) -> Option<TypeDescription> {
        Some(TypeDescription::new("DemoPlugin").property("ready", "bool"))
    }

    fn query_interface(&self, iid: &str) -> Option<&'static InterfaceTable> {
        (iid == PLUGIN_INTERFACE_IID).then(plugin_interface_table::<Self>)
    }
}

impl PluginInterface for DemoPlugin {
    fn name(&self) -> String {
        "Demo".to_string()
    }

    fn version(&self) -> String {
        "2.1".to_string()
    }
}

impl Drop for DemoPlugin {
    fn drop(&mut self) {
        DEMO_RELEASES.fetch_add(1, Ordering::SeqCst);
    }
}

/// Metadata only: 3 methods, 2 properties, 1 enum with 4 keys
pub struct LegacyPlugin;

pub fn legacy_description() -> TypeDescription {
    TypeDescription::new("LegacyPlugin")
        .method(MethodDescriptor::constructor("LegacyPlugin").param("parent"))
        .method(MethodDescriptor::slot("refresh").param("force"))
        .method(
            MethodDescriptor::signal("stateChanged")
                .access(Access::Protected)
                .param("state"),
        )
        .property("interval", "int")
        .property("label", "QString")
        .enumeration(
            EnumDescriptor::new("State")
                .key("Idle", 0)
                .key("Running", 1)
                .key("Paused", 2)
                .key("Stopped", 3),
        )
}

impl Plugin for LegacyPlugin {
    fn create() -> Option<Self> {
        Some(LegacyPlugin)
    }

    fn class_name(&self) -> &'static str {
        "LegacyPlugin"
    }

    fn type_description(&self) -> Option<TypeDescription> {
        Some(legacy_description())
    }
}

/// Exports a null root object
pub struct NullPlugin;

impl Plugin for NullPlugin {
    fn create() -> Option<Self> {
        None
    }
}

/// Neither a contract nor metadata, only a class name
pub struct OpaquePlugin;

impl Plugin for OpaquePlugin {
    fn create() -> Option<Self> {
        Some(OpaquePlugin)
    }

    fn class_name(&self) -> &'static str {
        "OpaquePlugin"
    }
}

/// No contract, no metadata and an empty class name
pub struct NamelessPlugin;

impl Plugin for NamelessPlugin {
    fn create() -> Option<Self> {
        Some(NamelessPlugin)
    }

    fn class_name(&self) -> &'static str {
        ""
    }
}

unsafe extern "C" fn text_value(_this: *const c_void) -> RawBuffer {
    RawBuffer::from_vec(b"value".to_vec())
}

unsafe extern "C" fn vendor_name(_this: *const c_void) -> RawBuffer {
    RawBuffer::from_vec(b"Vendor".to_vec())
}

unsafe extern "C" fn vendor_version(_this: *const c_void) -> RawBuffer {
    RawBuffer::from_vec(b"9.0".to_vec())
}

unsafe extern "C" fn vendor_vendor(_this: *const c_void) -> RawBuffer {
    RawBuffer::from_vec(b"ACME".to_vec())
}

static MISMATCH_SLOTS: [MethodSlot; 2] = [
    MethodSlot {
        name: RawStr::from_static("name"),
        signature: RawStr::from_static(NAME_SIGNATURE),
        call: Some(text_value),
    },
    MethodSlot {
        name: RawStr::from_static("version"),
        signature: RawStr::from_static("version() -> int"),
        call: Some(text_value),
    },
];
static MISMATCH_TABLE: InterfaceTable = InterfaceTable::new(&MISMATCH_SLOTS);

/// Claims the contract but `version` has the wrong signature
pub struct MismatchPlugin;

impl Plugin for MismatchPlugin {
    fn create() -> Option<Self> {
        Some(MismatchPlugin)
    }

    fn class_name(&self) -> &'static str {
        "MismatchPlugin"
    }

    fn type_description(&self) -> Option<TypeDescription> {
        Some(TypeDescription::new("MismatchPlugin").property("broken", "bool"))
    }

    fn query_interface(&self, iid: &str) -> Option<&'static InterfaceTable> {
        (iid == PLUGIN_INTERFACE_IID).then_some(&MISMATCH_TABLE)
    }
}

static UNRESOLVED_SLOTS: [MethodSlot; 2] = [
    MethodSlot {
        name: RawStr::from_static("name"),
        signature: RawStr::from_static(NAME_SIGNATURE),
        call: Some(text_value),
    },
    MethodSlot {
        name: RawStr::from_static("version"),
        signature: RawStr::from_static(VERSION_SIGNATURE),
        call: None,
    },
];
static UNRESOLVED_TABLE: InterfaceTable = InterfaceTable::new(&UNRESOLVED_SLOTS);

/// Claims the contract but `version` is unresolved
pub struct UnresolvedPlugin;

impl Plugin for UnresolvedPlugin {
    fn create() -> Option<Self> {
        Some(UnresolvedPlugin)
    }

    fn class_name(&self) -> &'static str {
        "UnresolvedPlugin"
    }

    fn type_description(&self) -> Option<TypeDescription> {
        Some(TypeDescription::new("UnresolvedPlugin"))
    }

    fn query_interface(&self, iid: &str) -> Option<&'static InterfaceTable> {
        (iid == PLUGIN_INTERFACE_IID).then_some(&UNRESOLVED_TABLE)
    }
}

static VENDOR_SLOTS: [MethodSlot; 3] = [
    MethodSlot {
        name: RawStr::from_static("vendor"),
        signature: RawStr::from_static("vendor() -> string"),
        call: Some(vendor_vendor),
    },
    MethodSlot {
        name: RawStr::from_static("version"),
        signature: RawStr::from_static(VERSION_SIGNATURE),
        call: Some(vendor_version),
    },
    MethodSlot {
        name: RawStr::from_static("name"),
        signature: RawStr::from_static(NAME_SIGNATURE),
        call: Some(vendor_name),
    },
];
static VENDOR_TABLE: InterfaceTable = InterfaceTable::new(&VENDOR_SLOTS);

/// Implements both the vendor contract and `com.example.PluginInterface`
pub struct VendorPlugin;

impl Plugin for VendorPlugin {
    fn create() -> Option<Self> {
        Some(VendorPlugin)
    }

    fn query_interface(&self, iid: &str) -> Option<&'static InterfaceTable> {
        match iid {
            VENDOR_IID => Some(&VENDOR_TABLE),
            PLUGIN_INTERFACE_IID => Some(plugin_interface_table::<Self>()),
            _ => None,
        }
    }
}

impl PluginInterface for VendorPlugin {
    fn name(&self) -> String {
        "VendorPlugin".to_string()
    }

    fn version(&self) -> String {
        "1.0".to_string()
    }
}

unsafe extern "C" fn abi_class_name(_this: *const c_void) -> RawStr {
    RawStr::from_static("FutureAbi")
}

unsafe extern "C" fn abi_free_buffer(buffer: RawBuffer) {
    drop(buffer.into_vec());
}

static FUTURE_VTABLE: RootObjectVTable = RootObjectVTable {
    abi_version: 99,
    class_name: abi_class_name,
    query_interface: None,
    type_description: None,
    free_buffer: abi_free_buffer,
    release: None,
};

static FUTURE_OBJECT: u8 = 0;

extern "C" fn demo_entry() -> RawRootObject {
    root_object::<DemoPlugin>()
}

extern "C" fn legacy_entry() -> RawRootObject {
    root_object::<LegacyPlugin>()
}

extern "C" fn null_entry() -> RawRootObject {
    root_object::<NullPlugin>()
}

extern "C" fn opaque_entry() -> RawRootObject {
    root_object::<OpaquePlugin>()
}

extern "C" fn nameless_entry() -> RawRootObject {
    root_object::<NamelessPlugin>()
}

extern "C" fn mismatch_entry() -> RawRootObject {
    root_object::<MismatchPlugin>()
}

extern "C" fn unresolved_entry() -> RawRootObject {
    root_object::<UnresolvedPlugin>()
}

extern "C" fn vendor_entry() -> RawRootObject {
    root_object::<VendorPlugin>()
}

extern "C" fn abi_entry() -> RawRootObject {
    RawRootObject {
        this: &FUTURE_OBJECT as *const u8 as *mut c_void,
        vtable: &FUTURE_VTABLE,
    }
}

/// Opener serving every test plugin under its `plugins/*.so` path
pub fn opener() -> StaticOpener {
    StaticOpener::new()
        .register(DEMO_PATH, demo_entry)
        .register(LEGACY_PATH, legacy_entry)
        .register(NULL_PATH, null_entry)
        .register(OPAQUE_PATH, opaque_entry)
        .register(NAMELESS_PATH, nameless_entry)
        .register(MISMATCH_PATH, mismatch_entry)
        .register(UNRESOLVED_PATH, unresolved_entry)
        .register(VENDOR_PATH, vendor_entry)
        .register(ABI_PATH, abi_entry)
}
