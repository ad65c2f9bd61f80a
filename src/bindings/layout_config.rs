// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Options every resource layout is built with.

/// How [crate::bindings::ShaderResourceLayout::variable] finds a variable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VariableLookup {
    /// Builds a name index when the layout is created.
    #[default]
    HashMap,
    /// Scans the records.  Cheaper for layouts with a handful of variables that are
    /// rarely looked up by name.
    LinearScan,
}

/// Configuration shared by the layouts of a shader, pipeline or binding instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LayoutConfig {
    pub lookup: VariableLookup,
    /// Reject texture and buffer views whose view type does not match the slot, for
    /// example a render target view bound to a texture SRV.
    pub verify_view_types: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            lookup: VariableLookup::default(),
            verify_view_types: true,
        }
    }
}
