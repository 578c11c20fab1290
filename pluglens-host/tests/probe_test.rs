//! Capability probe and introspector tests against in-process root objects

mod common;

use common::*;
use pluglens_host::{
    CapabilityContract, CapabilityProbe, ContractRegistry, Introspector, LoaderError,
    MetadataIntrospector, ModuleOpener, PluginModule,
};
use std::path::Path;

#[test]
fn test_probe_binds_demo_contract() {
    let opener = opener();
    let module = opener.open(Path::new(DEMO_PATH)).unwrap();
    let root = module.root_object().unwrap().expect("demo exports a root");

    let probe = CapabilityProbe::new(ContractRegistry::with_plugin_interface());
    let bound = probe.probe(Some(&root)).expect("contract should bind");

    assert_eq!(bound.contract_id(), "com.example.PluginInterface");
    assert_eq!(bound.name(), "Demo");
    assert_eq!(bound.version(), "2.1");
    assert_eq!(bound.invoke("missing"), None);
    assert_eq!(bound.method_names().collect::<Vec<_>>(), vec!["name", "version"]);
}

#[test]
fn test_probe_rejects_partial_contract() {
    let opener = opener();
    let probe = CapabilityProbe::new(ContractRegistry::with_plugin_interface());

    for path in [MISMATCH_PATH, UNRESOLVED_PATH, LEGACY_PATH] {
        let module = opener.open(Path::new(path)).unwrap();
        let root = module.root_object().unwrap().expect("root exported");
        assert!(probe.probe(Some(&root)).is_none(), "{} should not bind", path);
    }
}

#[test]
fn test_probe_requires_every_contract_method() {
    let opener = opener();
    let module = opener.open(Path::new(DEMO_PATH)).unwrap();
    let root = module.root_object().unwrap().unwrap();

    // Demo implements name/version only
    let probe = CapabilityProbe::new(
        ContractRegistry::new().register(CapabilityContract::plugin_interface().method("vendor")),
    );
    assert!(probe.probe(Some(&root)).is_none());
}

#[test]
fn test_probe_with_empty_registry() {
    let opener = opener();
    let module = opener.open(Path::new(DEMO_PATH)).unwrap();
    let root = module.root_object().unwrap().unwrap();

    assert!(CapabilityProbe::default().probe(Some(&root)).is_none());
}

#[test]
fn test_null_root_object() {
    let opener = opener();
    let module = opener.open(Path::new(NULL_PATH)).unwrap();

    let root = module.root_object().unwrap();
    assert!(root.is_none());

    let probe = CapabilityProbe::new(ContractRegistry::with_plugin_interface());
    assert!(probe.probe(root.as_ref()).is_none());
}

#[test]
fn test_introspector_reads_declared_metadata() {
    let opener = opener();
    let module = opener.open(Path::new(LEGACY_PATH)).unwrap();
    let root = module.root_object().unwrap().unwrap();

    assert_eq!(root.class_name(), "LegacyPlugin");
    let description = MetadataIntrospector.introspect(&root).unwrap();
    assert_eq!(description, legacy_description());
}

#[test]
fn test_introspector_falls_back_to_class_name() {
    let opener = opener();
    let module = opener.open(Path::new(OPAQUE_PATH)).unwrap();
    let root = module.root_object().unwrap().unwrap();

    let description = MetadataIntrospector.introspect(&root).unwrap();
    assert_eq!(description.class_name, "OpaquePlugin");
    assert!(description.is_empty());
}

#[test]
fn test_introspector_without_metadata_or_class_name() {
    let opener = opener();
    let module = opener.open(Path::new(NAMELESS_PATH)).unwrap();
    let root = module.root_object().unwrap().unwrap();

    assert!(matches!(
        MetadataIntrospector.introspect(&root),
        Err(LoaderError::NoMetadata)
    ));
}

#[test]
fn test_description_outlives_module() {
    let opener = opener();
    let mut module = opener.open(Path::new(LEGACY_PATH)).unwrap();

    let description = {
        let root = module.root_object().unwrap().unwrap();
        MetadataIntrospector.introspect(&root).unwrap()
    };
    module.close();
    module.close();

    assert!(!module.is_open());
    assert_eq!(opener.open_modules(), 0);
    assert_eq!(description.properties[1].type_name, "QString");
}
