//! Module handles
//!
//! A [`ModuleOpener`] turns a path into a [`PluginModule`]; the module owns
//! whatever keeps the plugin code mapped and hands out its [`RootObject`].
//! [`LibraryOpener`] goes through the platform dynamic linker,
//! [`StaticOpener`] serves plugins linked into the host binary.
//!
//! Closing is idempotent and dropping a module closes it.

use crate::error::LoaderError;
use libloading::{Library, Symbol};
use pluglens_api::abi::{
    InterfaceTable, RawBuffer, RawRootObject, RawStr, RootEntryFn, RootObjectVTable,
    StringMethodFn,
};
use pluglens_api::{ABI_VERSION, ROOT_OBJECT_SYMBOL};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

static OPEN_LIBRARIES: AtomicUsize = AtomicUsize::new(0);

/// Number of library handles currently held by [`LibraryModule`]s
pub fn open_library_count() -> usize {
    OPEN_LIBRARIES.load(Ordering::SeqCst)
}

/// Opens plugin modules
pub trait ModuleOpener {
    type Module: PluginModule;

    /// Open the module at `path`
    fn open(&self, path: &Path) -> Result<Self::Module, LoaderError>;
}

/// A loaded plugin module
pub trait PluginModule {
    fn path(&self) -> &Path;

    fn is_open(&self) -> bool;

    /// Instantiate the root object; `Ok(None)` when the module exports a null one
    fn root_object(&self) -> Result<Option<RootObject<'_>>, LoaderError>;

    /// Release the module; later calls are no-ops
    fn close(&mut self);
}

/// Opens modules through the platform dynamic linker
///
/// Opening different modules from several threads is only as safe as the
/// platform's dynamic linker is reentrant; callers that need it must
/// guarantee that themselves.
#[derive(Debug, Default, Clone, Copy)]
pub struct LibraryOpener;

impl ModuleOpener for LibraryOpener {
    type Module = LibraryModule;

    fn open(&self, path: &Path) -> Result<LibraryModule, LoaderError> {
        // Static initializers of the module run here.
        let library = unsafe { Library::new(path) }.map_err(|e| LoaderError::Open {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        OPEN_LIBRARIES.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(path = %path.display(), "Library opened");

        Ok(LibraryModule {
            path: path.to_path_buf(),
            library: Some(library),
        })
    }
}

/// Module backed by an OS library handle
pub struct LibraryModule {
    path: PathBuf,
    library: Option<Library>,
}

impl PluginModule for LibraryModule {
    fn path(&self) -> &Path {
        &self.path
    }

    fn is_open(&self) -> bool {
        self.library.is_some()
    }

    fn root_object(&self) -> Result<Option<RootObject<'_>>, LoaderError> {
        let library = self.library.as_ref().ok_or_else(|| LoaderError::ModuleClosed {
            path: self.path.clone(),
        })?;

        let entry: Symbol<RootEntryFn> = unsafe { library.get(ROOT_OBJECT_SYMBOL.as_bytes()) }
            .map_err(|e| LoaderError::SymbolNotFound {
                symbol: ROOT_OBJECT_SYMBOL,
                message: e.to_string(),
            })?;

        unsafe { RootObject::adopt(entry()) }
    }

    fn close(&mut self) {
        let Some(library) = self.library.take() else {
            return;
        };
        OPEN_LIBRARIES.fetch_sub(1, Ordering::SeqCst);

        match library.close() {
            Ok(()) => tracing::debug!(path = %self.path.display(), "Library closed"),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Library close failed")
            }
        }
    }
}

impl Drop for LibraryModule {
    fn drop(&mut self) {
        self.close();
    }
}

/// Serves modules whose entry points are linked into the host binary
///
/// Paths are only keys here; nothing is read from disk.
#[derive(Default)]
pub struct StaticOpener {
    entries: HashMap<PathBuf, RootEntryFn>,
    open: Arc<AtomicUsize>,
}

impl StaticOpener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module entry point under `path`
    pub fn register(mut self, path: impl Into<PathBuf>, entry: RootEntryFn) -> Self {
        self.entries.insert(path.into(), entry);
        self
    }

    /// Number of modules opened by this opener and not yet closed
    pub fn open_modules(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }
}

impl ModuleOpener for StaticOpener {
    type Module = StaticModule;

    fn open(&self, path: &Path) -> Result<StaticModule, LoaderError> {
        let entry = *self.entries.get(path).ok_or_else(|| LoaderError::Open {
            path: path.to_path_buf(),
            message: "no statically linked module registered for this path".to_string(),
        })?;
        self.open.fetch_add(1, Ordering::SeqCst);

        Ok(StaticModule {
            path: path.to_path_buf(),
            entry,
            open: Some(Arc::clone(&self.open)),
        })
    }
}

/// Module served by a [`StaticOpener`]
pub struct StaticModule {
    path: PathBuf,
    entry: RootEntryFn,
    open: Option<Arc<AtomicUsize>>,
}

impl PluginModule for StaticModule {
    fn path(&self) -> &Path {
        &self.path
    }

    fn is_open(&self) -> bool {
        self.open.is_some()
    }

    fn root_object(&self) -> Result<Option<RootObject<'_>>, LoaderError> {
        if self.open.is_none() {
            return Err(LoaderError::ModuleClosed {
                path: self.path.clone(),
            });
        }
        unsafe { RootObject::adopt((self.entry)()) }
    }

    fn close(&mut self) {
        if let Some(counter) = self.open.take() {
            counter.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

impl Drop for StaticModule {
    fn drop(&mut self) {
        self.close();
    }
}

/// A plugin's root object
///
/// Borrows the module it came from, so it cannot outlive it. The object is
/// released through its vtable when dropped.
pub struct RootObject<'m> {
    raw: RawRootObject,
    _module: PhantomData<&'m ()>,
}

impl<'m> RootObject<'m> {
    /// Take ownership of a root object returned by a module entry point
    ///
    /// A mismatched ABI version is rejected before any other vtable entry is
    /// touched; such an object is never released.
    ///
    /// # Safety
    /// A non-null `raw` must carry a vtable that stays valid for `'m`.
    pub(crate) unsafe fn adopt(raw: RawRootObject) -> Result<Option<Self>, LoaderError> {
        if raw.is_null() {
            return Ok(None);
        }

        let actual = (*raw.vtable).abi_version;
        if actual != ABI_VERSION {
            return Err(LoaderError::AbiVersionMismatch {
                expected: ABI_VERSION,
                actual,
            });
        }

        Ok(Some(Self {
            raw,
            _module: PhantomData,
        }))
    }

    fn vtable(&self) -> &RootObjectVTable {
        unsafe { &*self.raw.vtable }
    }

    /// Type name reported by the object
    pub fn class_name(&self) -> String {
        unsafe { (self.vtable().class_name)(self.raw.this).to_string_lossy() }
    }

    /// Method table of interface `iid`, if implemented
    pub(crate) fn query_interface(&self, iid: &str) -> Option<&InterfaceTable> {
        let query = self.vtable().query_interface?;
        let table = unsafe { query(self.raw.this, RawStr::borrowed(iid)) };
        unsafe { table.as_ref() }
    }

    /// Raw metadata bytes, copied out of the plugin; `None` when absent or empty
    pub(crate) fn type_description_bytes(&self) -> Option<Vec<u8>> {
        let describe = self.vtable().type_description?;
        let buffer = unsafe { describe(self.raw.this) };
        let bytes = self.take_buffer(buffer);
        (!bytes.is_empty()).then_some(bytes)
    }

    /// Invoke a bound string method
    pub(crate) fn call_string(&self, call: StringMethodFn) -> String {
        let buffer = unsafe { call(self.raw.this) };
        String::from_utf8_lossy(&self.take_buffer(buffer)).into_owned()
    }

    fn take_buffer(&self, buffer: RawBuffer) -> Vec<u8> {
        let bytes = unsafe { buffer.as_slice() }.to_vec();
        unsafe { (self.vtable().free_buffer)(buffer) };
        bytes
    }
}

impl Drop for RootObject<'_> {
    fn drop(&mut self) {
        if let Some(release) = self.vtable().release {
            unsafe { release(self.raw.this) };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    extern "C" fn null_entry() -> RawRootObject {
        RawRootObject::null()
    }

    #[test]
    fn test_static_open_and_close() {
        let opener = StaticOpener::new().register("plugins/null.so", null_entry);

        let mut module = opener.open(Path::new("plugins/null.so")).unwrap();
        assert!(module.is_open());
        assert_eq!(opener.open_modules(), 1);
        assert!(module.root_object().unwrap().is_none());

        module.close();
        assert!(!module.is_open());
        assert_eq!(opener.open_modules(), 0);

        module.close();
        assert_eq!(opener.open_modules(), 0);
        assert!(matches!(
            module.root_object(),
            Err(LoaderError::ModuleClosed { .. })
        ));
    }

    #[test]
    fn test_static_drop_closes() {
        let opener = StaticOpener::new().register("plugins/null.so", null_entry);
        {
            let _module = opener.open(Path::new("plugins/null.so")).unwrap();
            assert_eq!(opener.open_modules(), 1);
        }
        assert_eq!(opener.open_modules(), 0);
    }

    #[test]
    fn test_static_unknown_path() {
        let opener = StaticOpener::new();
        let result = opener.open(Path::new("plugins/other.so"));

        assert!(matches!(result, Err(LoaderError::Open { .. })));
        assert_eq!(opener.open_modules(), 0);
    }

    #[test]
    fn test_library_open_missing_path() {
        let result = LibraryOpener.open(Path::new("/nonexistent/plugins/missing.so"));

        match result {
            Err(LoaderError::Open { path, message }) => {
                assert_eq!(path, PathBuf::from("/nonexistent/plugins/missing.so"));
                assert!(!message.is_empty());
            }
            _ => panic!("Expected Open error"),
        }
    }
}
