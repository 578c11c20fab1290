//! Legacy Plugin - no contract, declared structure only
//!
//! The host falls back to introspection and prints 3 methods,
//! 2 properties and 1 enumeration with 4 keys.

use pluglens_sdk::prelude::*;

struct LegacyPlugin;

impl Plugin for LegacyPlugin {
    fn create() -> Option<Self> {
        Some(LegacyPlugin)
    }

    fn class_name(&self) -> &'static str {
        "LegacyPlugin"
    }

    fn type_description(&self) -> Option<TypeDescription> {
        Some(
            TypeDescription::new(self.class_name())
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
                ),
        )
    }
}

export_plugin!(LegacyPlugin);
