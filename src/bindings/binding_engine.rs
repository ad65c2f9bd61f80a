// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Binding every variable of a layout from a resource mapping.

use crate::bindings::diagnostics::{BindingError, Diagnostics};
use crate::bindings::resource_cache::ResourceCache;
use crate::bindings::resource_layout::ShaderResourceLayout;
use crate::bindings::resource_mapping::ResourceMapping;

bitflags::bitflags! {
    /// Controls [ShaderResourceLayout::bind_resources].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BindShaderResourcesFlags: u32 {
        /// Unbind every element before resolving it.
        const RESET_BINDINGS = 1 << 0;
        /// Stop at the first element that is already bound.
        const UPDATE_UNRESOLVED = 1 << 1;
        /// Report every element that is left unbound.
        const ALL_RESOLVED = 1 << 2;
    }
}

impl ShaderResourceLayout {
    /// Resolves every element of every variable through `mapping` and binds what it finds.
    ///
    /// Problems are reported in the returned [Diagnostics] and do not stop the walk.
    /// With [BindShaderResourcesFlags::UPDATE_UNRESOLVED], the whole call returns as soon
    /// as it meets an element that is already bound, so elements after it are left as
    /// they are.
    pub fn bind_resources(
        &self,
        cache: &mut ResourceCache,
        mapping: Option<&dyn ResourceMapping>,
        flags: BindShaderResourcesFlags,
    ) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();
        let Some(mapping) = mapping else {
            diagnostics.report(BindingError::MissingResourceMapping {
                shader: self.shader_name().to_string(),
            });
            return diagnostics;
        };
        self.debug_check_cache(cache);

        for (index, record) in self.arena.all_resources().iter().enumerate() {
            let index = index as u32;
            for array_index in 0..record.bind_count() {
                if flags.contains(BindShaderResourcesFlags::RESET_BINDINGS) {
                    self.bind_resource(cache, index, array_index, None, &mut diagnostics);
                }
                if flags.contains(BindShaderResourcesFlags::UPDATE_UNRESOLVED)
                    && self.is_bound(cache, index, array_index)
                {
                    return diagnostics;
                }

                match mapping.resolve(record.name(), array_index) {
                    Some(object) => {
                        self.bind_resource(cache, index, array_index, Some(&object), &mut diagnostics)
                    }
                    None => {
                        if flags.contains(BindShaderResourcesFlags::ALL_RESOLVED)
                            && !self.is_bound(cache, index, array_index)
                        {
                            diagnostics.report(BindingError::UnresolvedVariable {
                                variable: record.attribs().print_name(array_index),
                                shader: self.shader_name().to_string(),
                            });
                        }
                    }
                }
            }
        }
        diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings::layout_config::LayoutConfig;
    use crate::bindings::resource_cache::CacheContentType;
    use crate::bindings::resource_layout::LayoutTarget;
    use crate::bindings::test_support::{self, Objects};
    use crate::bindings::variable_type::AllowedVariableTypes;

    fn layout(cache: &mut ResourceCache) -> ShaderResourceLayout {
        ShaderResourceLayout::new(
            test_support::device(),
            test_support::pixel_shader_resources(),
            AllowedVariableTypes::ALL,
            LayoutTarget::StaticCache(cache),
            &LayoutConfig::default(),
        )
    }

    #[test]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn full_mapping_binds_everything() {
        let objects = Objects::new();
        let mut cache = ResourceCache::new(CacheContentType::StaticShaderResources);
        let layout = layout(&mut cache);
        let mapping = objects.mapping();
        let diagnostics = layout.bind_resources(
            &mut cache,
            Some(&mapping),
            BindShaderResourcesFlags::ALL_RESOLVED,
        );
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
        assert!(layout.variables().all(|v| (0..v.array_size()).all(|i| v.is_bound(&cache, i))));
    }

    #[test]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn missing_mapping_changes_nothing() {
        let objects = Objects::new();
        let mut cache = ResourceCache::new(CacheContentType::StaticShaderResources);
        let layout = layout(&mut cache);
        layout.variable("g_Camera").unwrap().set(&mut cache, Some(&objects.camera));

        let diagnostics = layout.bind_resources(
            &mut cache,
            None,
            BindShaderResourcesFlags::RESET_BINDINGS | BindShaderResourcesFlags::ALL_RESOLVED,
        );
        assert!(matches!(
            diagnostics.errors(),
            [BindingError::MissingResourceMapping { .. }]
        ));
        assert!(layout.variable("g_Camera").unwrap().is_bound(&cache, 0));
    }

    #[test]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn unresolved_elements_are_reported_with_print_names() {
        let objects = Objects::new();
        let mut cache = ResourceCache::new(CacheContentType::StaticShaderResources);
        let layout = layout(&mut cache);
        let mut mapping = objects.mapping();
        mapping.remove("g_Decals", 2);

        let diagnostics = layout.bind_resources(
            &mut cache,
            Some(&mapping),
            BindShaderResourcesFlags::ALL_RESOLVED,
        );
        assert!(matches!(
            diagnostics.errors(),
            [BindingError::UnresolvedVariable { variable, .. }] if variable == "g_Decals[2]"
        ));
    }

    #[test]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn unresolved_without_all_resolved_is_silent() {
        let mut cache = ResourceCache::new(CacheContentType::StaticShaderResources);
        let layout = layout(&mut cache);
        let empty = crate::bindings::ResourceMappingTable::new();
        let diagnostics = layout.bind_resources(
            &mut cache,
            Some(&empty),
            BindShaderResourcesFlags::empty(),
        );
        assert!(diagnostics.is_empty());
        assert_eq!(cache.bound_count(), 0);
    }
}
