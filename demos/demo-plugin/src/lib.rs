//! Demo Plugin - implements `com.example.PluginInterface`
//!
//! ```bash
//! cargo build --release
//! pluglens --path target/release/libdemo_plugin.so
//! ```

use pluglens_sdk::prelude::*;

struct DemoPlugin;

impl Plugin for DemoPlugin {
    fn create() -> Option<Self> {
        Some(DemoPlugin)
    }

    fn class_name(&self) -> &'static str {
        "DemoPlugin"
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

export_plugin!(DemoPlugin);
