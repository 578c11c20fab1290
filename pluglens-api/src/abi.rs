//! `#[repr(C)]` types crossing the host/plugin boundary
//!
//! A plugin module exports [`ROOT_OBJECT_SYMBOL`](crate::ROOT_OBJECT_SYMBOL)
//! as a [`RootEntryFn`]. The returned [`RawRootObject`] pairs an opaque
//! object pointer with a [`RootObjectVTable`]. Interfaces are looked up by id
//! through `query_interface` and come back as [`InterfaceTable`]s of named,
//! signature-tagged [`MethodSlot`]s.
//!
//! Every [`RawBuffer`] handed to the host was allocated by the plugin and
//! must go back through the plugin's `free_buffer`.

use std::ffi::c_void;
use std::ptr;

/// Module entry point
pub type RootEntryFn = unsafe extern "C" fn() -> RawRootObject;

/// Type name of the root object
pub type ClassNameFn = unsafe extern "C" fn(this: *const c_void) -> RawStr;

/// Interface lookup by id; null when not implemented
pub type QueryInterfaceFn =
    unsafe extern "C" fn(this: *const c_void, iid: RawStr) -> *const InterfaceTable;

/// MessagePack-encoded `TypeDescription`; empty when there is no metadata
pub type TypeDescriptionFn = unsafe extern "C" fn(this: *const c_void) -> RawBuffer;

/// Returns a buffer to the allocator that produced it
pub type FreeBufferFn = unsafe extern "C" fn(buffer: RawBuffer);

/// Destroys the root object
pub type ReleaseFn = unsafe extern "C" fn(this: *mut c_void);

/// Nullary contract method returning UTF-8 text
pub type StringMethodFn = unsafe extern "C" fn(this: *const c_void) -> RawBuffer;

/// Borrowed UTF-8 bytes, usually `'static` data inside the plugin image
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct RawStr {
    pub ptr: *const u8,
    pub len: usize,
}

// RawStr only ever points at immutable data.
unsafe impl Send for RawStr {}
unsafe impl Sync for RawStr {}

impl RawStr {
    pub const fn from_static(s: &'static str) -> Self {
        Self {
            ptr: s.as_ptr(),
            len: s.len(),
        }
    }

    /// Borrow a host string for the duration of a call
    pub fn borrowed(s: &str) -> Self {
        Self {
            ptr: s.as_ptr(),
            len: s.len(),
        }
    }

    pub const fn empty() -> Self {
        Self {
            ptr: ptr::null(),
            len: 0,
        }
    }

    /// View the bytes
    ///
    /// # Safety
    /// `ptr` must be valid for `len` bytes for the returned lifetime.
    pub unsafe fn as_bytes<'a>(&self) -> &'a [u8] {
        if self.ptr.is_null() || self.len == 0 {
            return &[];
        }
        std::slice::from_raw_parts(self.ptr, self.len)
    }

    /// Copy into an owned string, replacing invalid UTF-8
    ///
    /// # Safety
    /// Same as [`RawStr::as_bytes`].
    pub unsafe fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(self.as_bytes()).into_owned()
    }
}

/// Owned byte buffer (pointer, length, capacity of a `Vec<u8>`)
#[repr(C)]
#[derive(Debug)]
pub struct RawBuffer {
    pub ptr: *mut u8,
    pub len: usize,
    pub cap: usize,
}

impl RawBuffer {
    pub const fn empty() -> Self {
        Self {
            ptr: ptr::null_mut(),
            len: 0,
            cap: 0,
        }
    }

    /// Leak a vector into a buffer
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        let mut bytes = std::mem::ManuallyDrop::new(bytes);
        Self {
            ptr: bytes.as_mut_ptr(),
            len: bytes.len(),
            cap: bytes.capacity(),
        }
    }

    /// Reclaim a buffer produced by [`RawBuffer::from_vec`]
    ///
    /// # Safety
    /// Must be called in the same allocator that created the buffer, once.
    pub unsafe fn into_vec(self) -> Vec<u8> {
        if self.ptr.is_null() {
            return Vec::new();
        }
        Vec::from_raw_parts(self.ptr, self.len, self.cap)
    }

    pub fn is_empty(&self) -> bool {
        self.ptr.is_null() || self.len == 0
    }

    /// View the contents
    ///
    /// # Safety
    /// The buffer must not have been freed.
    pub unsafe fn as_slice(&self) -> &[u8] {
        if self.is_empty() {
            return &[];
        }
        std::slice::from_raw_parts(self.ptr, self.len)
    }
}

/// One method of an interface
#[repr(C)]
#[derive(Debug)]
pub struct MethodSlot {
    /// Method name
    pub name: RawStr,

    /// Canonical signature text, e.g. `"name() -> string"`
    pub signature: RawStr,

    /// Implementation; `None` marks an unresolved method
    pub call: Option<StringMethodFn>,
}

/// Method table of an implemented interface
#[repr(C)]
#[derive(Debug)]
pub struct InterfaceTable {
    pub methods: *const MethodSlot,
    pub method_count: usize,
}

// Interface tables are immutable statics inside the plugin image.
unsafe impl Send for InterfaceTable {}
unsafe impl Sync for InterfaceTable {}

impl InterfaceTable {
    pub const fn new(methods: &'static [MethodSlot]) -> Self {
        Self {
            methods: methods.as_ptr(),
            method_count: methods.len(),
        }
    }

    /// View the method slots
    ///
    /// # Safety
    /// The table must point at `method_count` live slots.
    pub unsafe fn slots<'a>(&self) -> &'a [MethodSlot] {
        if self.methods.is_null() || self.method_count == 0 {
            return &[];
        }
        std::slice::from_raw_parts(self.methods, self.method_count)
    }
}

/// Function table of a root object
#[repr(C)]
#[derive(Debug)]
pub struct RootObjectVTable {
    /// Must equal [`ABI_VERSION`](crate::ABI_VERSION)
    pub abi_version: u32,
    pub class_name: ClassNameFn,
    pub query_interface: Option<QueryInterfaceFn>,
    pub type_description: Option<TypeDescriptionFn>,
    pub free_buffer: FreeBufferFn,
    pub release: Option<ReleaseFn>,
}

/// Root object as returned by the module entry point
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct RawRootObject {
    pub this: *mut c_void,
    pub vtable: *const RootObjectVTable,
}

impl RawRootObject {
    /// The "no instantiable root object" value
    pub const fn null() -> Self {
        Self {
            this: ptr::null_mut(),
            vtable: ptr::null(),
        }
    }

    pub fn is_null(&self) -> bool {
        self.this.is_null() || self.vtable.is_null()
    }
}
