// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Propagating static resources into binding instances, and checking that a cache is
//! fully bound.

use crate::bindings::device_object::{DeviceObject, Usage};
use crate::bindings::diagnostics::{BindingError, Diagnostics};
use crate::bindings::resource_cache::{CacheContentType, CachedResource, ResourceCache};
use crate::bindings::resource_kind::{DescriptorHeapType, ResourceKind};
use crate::bindings::resource_layout::ShaderResourceLayout;
use crate::bindings::variable_type::ShaderVariableType;

impl ShaderResourceLayout {
    /// Copies the static resources bound in a shader's static cache into `dst_cache`.
    ///
    /// `self` must be a binding-instance layout containing the shader's static variables,
    /// and `src_layout` the layout of the shader's static cache.  Both list the static
    /// variables in the same order.
    pub fn copy_static_resource_descriptor_handles(
        &self,
        dst_cache: &mut ResourceCache,
        src_layout: &ShaderResourceLayout,
        src_cache: &ResourceCache,
    ) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();
        self.debug_check_cache(dst_cache);
        src_layout.debug_check_cache(src_cache);
        debug_assert_eq!(src_cache.content_type(), CacheContentType::StaticShaderResources);

        let dst_records = self.arena.resources(ShaderVariableType::Static);
        let src_records = src_layout.arena.resources(ShaderVariableType::Static);
        debug_assert_eq!(
            dst_records.len(),
            src_records.len(),
            "static layouts of \"{}\" disagree on the number of resources",
            self.shader_name()
        );

        for (dst, src) in dst_records.iter().zip(src_records) {
            debug_assert_eq!(dst.name(), src.name());
            debug_assert_eq!(dst.kind(), src.kind());
            for i in 0..dst.bind_count() {
                let src_cell = src_cache.resource(src.root_index(), src.offset() + i);
                if src_cell.is_empty() {
                    diagnostics.report(BindingError::StaticResourceNotAssigned {
                        variable: src.attribs().print_name(i),
                        shader: self.shader_name().to_string(),
                    });
                    continue;
                }
                self.copy_static_cell(
                    dst_cache,
                    dst.root_index(),
                    dst.offset() + i,
                    src_cell,
                    dst.kind().heap_type(),
                );
            }

            let (Some(dst_sampler), Some(src_sampler)) = (
                self.arena.sampler_of(dst),
                src_layout.arena.sampler_of(src),
            ) else {
                debug_assert_eq!(
                    self.arena.sampler_of(dst).is_some(),
                    src_layout.arena.sampler_of(src).is_some()
                );
                continue;
            };
            for i in 0..dst_sampler.bind_count() {
                let src_cell = src_cache.resource(src_sampler.root_index(), src_sampler.offset() + i);
                if src_cell.is_empty() {
                    diagnostics.report(BindingError::StaticSamplerNotAssigned {
                        variable: src_sampler.attribs().print_name(i),
                        shader: self.shader_name().to_string(),
                    });
                    continue;
                }
                self.copy_static_cell(
                    dst_cache,
                    dst_sampler.root_index(),
                    dst_sampler.offset() + i,
                    src_cell,
                    DescriptorHeapType::Sampler,
                );
            }
        }
        diagnostics
    }

    fn copy_static_cell(
        &self,
        dst_cache: &mut ResourceCache,
        root_index: u32,
        offset: u32,
        src: &CachedResource,
        heap_type: DescriptorHeapType,
    ) {
        let shader_visible = dst_cache.shader_visible_handle(root_index, offset, heap_type);
        let dst = dst_cache.root_table_mut(root_index).resource_mut(offset);
        if dst.object == src.object {
            return;
        }
        debug_assert!(
            dst.is_empty(),
            "static resource has already been initialized with a different object"
        );
        *dst = src.clone();
        if let Some(visible) = shader_visible
            && !src.cpu_handle.is_null()
        {
            self.device.copy_descriptors_simple(visible, src.cpu_handle, heap_type);
        }
    }

    /// Reports every element of every variable that is not bound in `cache`.
    pub fn verify_bindings(&self, cache: &ResourceCache) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();
        self.debug_check_cache(cache);

        for ty in ShaderVariableType::ALL {
            for record in self.arena.resources(ty) {
                for i in 0..record.bind_count() {
                    let cell = cache.resource(record.root_index(), record.offset() + i);
                    debug_assert!(cell.is_empty() || cell.kind == Some(record.kind()));
                    if !is_bound_for_draw(cell) {
                        diagnostics.report(BindingError::NoResourceBound {
                            variable_type: ty,
                            variable: record.attribs().print_name(i),
                            shader: self.shader_name().to_string(),
                        });
                    }
                }

                let Some(sampler) = self.arena.sampler_of(record) else {
                    continue;
                };
                for i in 0..sampler.bind_count() {
                    if cache.resource(sampler.root_index(), sampler.offset() + i).is_empty() {
                        diagnostics.report(BindingError::NoSamplerBound {
                            variable: sampler.attribs().print_name(i),
                            shader: self.shader_name().to_string(),
                        });
                    }
                }

                if sampler.bind_count() == 1 && record.bind_count() > 1 {
                    let Some(bound_sampler) =
                        &cache.resource(sampler.root_index(), sampler.offset()).object
                    else {
                        continue;
                    };
                    for i in 0..record.bind_count() {
                        let cell = cache.resource(record.root_index(), record.offset() + i);
                        if let Some(DeviceObject::TextureView(view)) = &cell.object
                            && let Some(view_sampler) = view.sampler()
                            && !bound_sampler.same_object(&DeviceObject::Sampler(view_sampler))
                        {
                            diagnostics.report(BindingError::InconsistentArraySampler {
                                texture: record.name().to_string(),
                                shader: self.shader_name().to_string(),
                                element: i,
                            });
                        }
                    }
                }
            }
        }
        diagnostics
    }
}

/// A constant buffer whose view has not been created only counts as bound when it is
/// dynamic; its view is created at draw time.
fn is_bound_for_draw(cell: &CachedResource) -> bool {
    match &cell.object {
        None => false,
        Some(DeviceObject::Buffer(buffer)) if cell.kind == Some(ResourceKind::ConstantBuffer) => {
            !cell.cpu_handle.is_null() || buffer.usage() == Usage::Dynamic
        }
        Some(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings::BindShaderResourcesFlags;
    use crate::bindings::layout_config::LayoutConfig;
    use crate::bindings::resource_layout::LayoutTarget;
    use crate::bindings::test_support::{self, Objects};
    use crate::bindings::variable_type::AllowedVariableTypes;

    #[test]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn verify_reports_each_unbound_element() {
        let objects = Objects::new();
        let mut cache = ResourceCache::new(CacheContentType::StaticShaderResources);
        let layout = ShaderResourceLayout::new(
            test_support::device(),
            test_support::pixel_shader_resources(),
            AllowedVariableTypes::ALL,
            LayoutTarget::StaticCache(&mut cache),
            &LayoutConfig::default(),
        );
        let mut mapping = objects.mapping();
        mapping.remove("g_Decals", 1);
        mapping.remove("g_Camera", 0);
        let _ = layout.bind_resources(&mut cache, Some(&mapping), BindShaderResourcesFlags::empty());

        let diagnostics = layout.verify_bindings(&cache);
        let unbound: Vec<_> = diagnostics
            .errors()
            .iter()
            .filter_map(|e| match e {
                BindingError::NoResourceBound { variable, .. } => Some(variable.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(unbound, ["g_Camera", "g_Decals[1]"]);
        assert_eq!(diagnostics.len(), 2);
    }

    #[test]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn verify_flags_array_elements_with_a_different_sampler() {
        let objects = Objects::new();
        let mut cache = ResourceCache::new(CacheContentType::StaticShaderResources);
        let layout = ShaderResourceLayout::new(
            test_support::device(),
            test_support::pixel_shader_resources(),
            AllowedVariableTypes::ALL,
            LayoutTarget::StaticCache(&mut cache),
            &LayoutConfig::default(),
        );
        let mut mapping = objects.mapping();
        mapping.add_resource_array("g_Decals", 3, [objects.point_sampled.clone()]);
        let _ = layout.bind_resources(&mut cache, Some(&mapping), BindShaderResourcesFlags::empty());

        let diagnostics = layout.verify_bindings(&cache);
        assert!(matches!(
            diagnostics.errors(),
            [BindingError::InconsistentArraySampler { element: 0, .. }, BindingError::InconsistentArraySampler { element: 1, .. }, BindingError::InconsistentArraySampler { element: 2, .. }]
        ));
    }

    #[test]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn dynamic_constant_buffers_count_as_bound_without_a_view() {
        let objects = Objects::new();
        let cell = CachedResource {
            kind: Some(ResourceKind::ConstantBuffer),
            object: Some(objects.per_draw.clone()),
            cpu_handle: crate::bindings::CpuDescriptorHandle::NULL,
        };
        assert!(is_bound_for_draw(&cell));
        assert!(!is_bound_for_draw(&CachedResource::default()));
    }
}
