//! Reflective introspection fallback
//!
//! Reads the declared structure of a root object. Only metadata entries of
//! the vtable are used; no contract method is ever invoked here.

use crate::error::LoaderError;
use crate::module::RootObject;
use pluglens_api::TypeDescription;

/// Produces a [`TypeDescription`] for a root object
pub trait Introspector {
    fn introspect(&self, root: &RootObject<'_>) -> Result<TypeDescription, LoaderError>;
}

/// Decodes the MessagePack metadata exported by the plugin
///
/// The snapshot is copied out of the plugin's buffer, so it stays valid after
/// the module is closed. The class name from the vtable fills in when the
/// metadata carries none, and stands alone when there is no metadata at all.
/// Only a root object with neither is an error.
#[derive(Debug, Default, Clone, Copy)]
pub struct MetadataIntrospector;

impl Introspector for MetadataIntrospector {
    fn introspect(&self, root: &RootObject<'_>) -> Result<TypeDescription, LoaderError> {
        let class_name = root.class_name();

        let mut description = match root.type_description_bytes() {
            Some(bytes) => {
                TypeDescription::from_msgpack(&bytes).map_err(LoaderError::MetadataDecode)?
            }
            None if class_name.is_empty() => return Err(LoaderError::NoMetadata),
            None => {
                tracing::debug!(class = %class_name, "No structural metadata, class name only");
                TypeDescription::new(class_name.as_str())
            }
        };
        if description.class_name.is_empty() {
            description.class_name = class_name;
        }

        tracing::debug!(
            class = %description.class_name,
            methods = description.methods.len(),
            properties = description.properties.len(),
            enums = description.enums.len(),
            "Type description captured"
        );
        Ok(description)
    }
}
