//! Null Plugin - loads fine but exposes no root object
//!
//! The host reports `NullRootError` and exits with status 1.

use pluglens_sdk::prelude::*;

struct NullPlugin;

impl Plugin for NullPlugin {
    fn create() -> Option<Self> {
        None
    }
}

export_plugin!(NullPlugin);
