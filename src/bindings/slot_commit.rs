// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Validating and committing one object to one cache slot.

use crate::bindings::diagnostics::{BindingError, Diagnostics};
use crate::bindings::device_object::{
    BindFlags, BufferViewType, CpuDescriptorHandle, DeviceObject, TextureViewType,
};
use crate::bindings::layout_records::{ResourceRecord, SamplerRecord};
use crate::bindings::resource_cache::{CacheContentType, CachedResource, ResourceCache};
use crate::bindings::resource_kind::ResourceKind;
use crate::bindings::resource_layout::ShaderResourceLayout;
use crate::bindings::variable_type::ShaderVariableType;
use crate::bindings::TextureView;
use std::sync::Arc;

/// A cell about to be written, and what to call it in diagnostics.
struct SlotTarget<'r> {
    root_index: u32,
    offset: u32,
    kind: ResourceKind,
    variable_type: ShaderVariableType,
    attribs_name: &'r str,
    print_name: String,
}

impl ShaderResourceLayout {
    /// Binds `object` to element `array_index` of the resource at `index`, or unbinds the
    /// element when `object` is `None`.
    pub(crate) fn bind_resource(
        &self,
        cache: &mut ResourceCache,
        index: u32,
        array_index: u32,
        object: Option<&DeviceObject>,
        diagnostics: &mut Diagnostics,
    ) {
        self.debug_check_cache(cache);
        let record = &self.arena.all_resources()[index as usize];
        if array_index >= record.bind_count() {
            diagnostics.report(self.array_index_out_of_range(record, array_index));
            return;
        }

        let Some(object) = object else {
            self.unbind(cache, record, array_index, diagnostics);
            return;
        };
        let Some(cpu_handle) = self.check_object(record, array_index, object, diagnostics) else {
            return;
        };
        let target = SlotTarget {
            root_index: record.root_index(),
            offset: record.offset() + array_index,
            kind: record.kind(),
            variable_type: record.variable_type(),
            attribs_name: record.name(),
            print_name: record.attribs().print_name(array_index),
        };
        self.commit(cache, &target, object, cpu_handle, diagnostics);

        if let (Some(sampler), DeviceObject::TextureView(view)) =
            (self.arena.sampler_of(record), object)
        {
            self.cache_sampler(cache, sampler, array_index, view, diagnostics);
        }
    }

    pub(crate) fn array_index_out_of_range(
        &self,
        record: &ResourceRecord,
        array_index: u32,
    ) -> BindingError {
        BindingError::ArrayIndexOutOfRange {
            variable: record.name().to_string(),
            index: array_index,
            array_size: record.bind_count(),
            shader: self.shader_name().to_string(),
        }
    }

    /// Checks that `object` fits the slot, returning the descriptor to cache.
    fn check_object(
        &self,
        record: &ResourceRecord,
        array_index: u32,
        object: &DeviceObject,
        diagnostics: &mut Diagnostics,
    ) -> Option<CpuDescriptorHandle> {
        let incorrect_view = |expected: &'static str, actual: &'static str| {
            BindingError::IncorrectViewType {
                object_type: object.type_name(),
                object: object.name().to_string(),
                variable: record.attribs().print_name(array_index),
                shader: self.shader_name().to_string(),
                expected,
                actual,
            }
        };
        match (record.kind(), object) {
            (ResourceKind::ConstantBuffer, DeviceObject::Buffer(buffer)) => {
                if !buffer.bind_flags().contains(BindFlags::UNIFORM_BUFFER) {
                    diagnostics.report(BindingError::MissingUniformBufferFlag {
                        buffer: buffer.name().to_string(),
                        variable: record.attribs().print_name(array_index),
                        shader: self.shader_name().to_string(),
                    });
                    return None;
                }
                Some(buffer.cbv_handle())
            }
            (kind @ (ResourceKind::TextureSrv | ResourceKind::TextureUav), DeviceObject::TextureView(view)) => {
                let expected = if kind == ResourceKind::TextureSrv {
                    TextureViewType::ShaderResource
                } else {
                    TextureViewType::UnorderedAccess
                };
                if self.config.verify_view_types && view.view_type() != expected {
                    diagnostics.report(incorrect_view(
                        expected.literal_name(),
                        view.view_type().literal_name(),
                    ));
                    return None;
                }
                Some(view.cpu_descriptor_handle())
            }
            (kind @ (ResourceKind::BufferSrv | ResourceKind::BufferUav), DeviceObject::BufferView(view)) => {
                let expected = if kind == ResourceKind::BufferSrv {
                    BufferViewType::ShaderResource
                } else {
                    BufferViewType::UnorderedAccess
                };
                if self.config.verify_view_types && view.view_type() != expected {
                    diagnostics.report(incorrect_view(
                        expected.literal_name(),
                        view.view_type().literal_name(),
                    ));
                    return None;
                }
                Some(view.cpu_descriptor_handle())
            }
            (kind, object) => {
                diagnostics.report(BindingError::WrongObjectType {
                    object_type: object.type_name(),
                    object: object.name().to_string(),
                    variable: record.attribs().print_name(array_index),
                    shader: self.shader_name().to_string(),
                    expected: kind.expected_object_name(),
                });
                None
            }
        }
    }

    /// Binds the sampler carried by `view` to the sampler paired with a texture.
    fn cache_sampler(
        &self,
        cache: &mut ResourceCache,
        sampler: &SamplerRecord,
        texture_element: u32,
        view: &Arc<dyn TextureView>,
        diagnostics: &mut Diagnostics,
    ) {
        let element = sampler_element(sampler, texture_element);
        let print_name = sampler.attribs().print_name(element);
        let Some(view_sampler) = view.sampler() else {
            diagnostics.report(BindingError::SamplerNotSetInView {
                variable: print_name,
                view: view.name().to_string(),
            });
            return;
        };
        let cpu_handle = view_sampler.cpu_descriptor_handle();
        let target = SlotTarget {
            root_index: sampler.root_index(),
            offset: sampler.offset() + element,
            kind: ResourceKind::Sampler,
            variable_type: sampler.variable_type(),
            attribs_name: sampler.name(),
            print_name,
        };
        self.commit(
            cache,
            &target,
            &DeviceObject::Sampler(view_sampler),
            cpu_handle,
            diagnostics,
        );
    }

    fn commit(
        &self,
        cache: &mut ResourceCache,
        target: &SlotTarget<'_>,
        object: &DeviceObject,
        cpu_handle: CpuDescriptorHandle,
        diagnostics: &mut Diagnostics,
    ) {
        let heap_type = target.kind.heap_type();
        let shader_visible = cache.shader_visible_handle(target.root_index, target.offset, heap_type);
        debug_check_shader_visible_space(cache.content_type(), target, shader_visible.is_some());

        let cell = cache
            .root_table_mut(target.root_index)
            .resource_mut(target.offset);
        if let Some(bound) = &cell.object {
            if bound.same_object(object) {
                return;
            }
            if target.variable_type != ShaderVariableType::Dynamic {
                diagnostics.report(BindingError::NonDynamicRebind {
                    object_type: bound.type_name(),
                    variable_type: target.variable_type,
                    variable: target.print_name.clone(),
                    shader: self.shader_name().to_string(),
                });
            }
        }
        *cell = CachedResource {
            kind: Some(target.kind),
            object: Some(object.clone()),
            cpu_handle,
        };
        // Dynamic constant buffers have no view until draw time.
        if let Some(dst) = shader_visible
            && !cpu_handle.is_null()
        {
            self.device.copy_descriptors_simple(dst, cpu_handle, heap_type);
        }
    }

    fn unbind(
        &self,
        cache: &mut ResourceCache,
        record: &ResourceRecord,
        array_index: u32,
        diagnostics: &mut Diagnostics,
    ) {
        let cell = cache
            .root_table_mut(record.root_index())
            .resource_mut(record.offset() + array_index);
        if !cell.is_empty() {
            if !record.is_dynamic() {
                diagnostics.report(BindingError::NonDynamicUnbind {
                    variable: record.attribs().print_name(array_index),
                    shader: self.shader_name().to_string(),
                });
            }
            cell.clear();
        }
        if let Some(sampler) = self.arena.sampler_of(record) {
            let element = sampler_element(sampler, array_index);
            cache
                .root_table_mut(sampler.root_index())
                .resource_mut(sampler.offset() + element)
                .clear();
        }
    }

    /// Whether element `array_index` of the resource at `index` holds an object.  Indices
    /// out of range read as unbound.
    pub fn is_bound(&self, cache: &ResourceCache, index: u32, array_index: u32) -> bool {
        let Some(record) = self.arena.all_resources().get(index as usize) else {
            return false;
        };
        if array_index >= record.bind_count() {
            return false;
        }
        let Some(table) = cache.root_tables().get(record.root_index() as usize) else {
            return false;
        };
        let Some(cell) = table.resources().get((record.offset() + array_index) as usize) else {
            return false;
        };
        debug_assert!(
            cell.is_empty() || cell.kind == Some(record.kind()),
            "cell of \"{}\" holds a {:?}",
            record.name(),
            cell.kind
        );
        !cell.is_empty()
    }
}

/// Element of `sampler` that pairs with element `texture_element` of its texture.  A single
/// sampler is shared by every element of a texture array.
pub(crate) fn sampler_element(sampler: &SamplerRecord, texture_element: u32) -> u32 {
    if sampler.bind_count() > 1 {
        texture_element
    } else {
        0
    }
}

fn debug_check_shader_visible_space(
    content: CacheContentType,
    target: &SlotTarget<'_>,
    has_shader_visible: bool,
) {
    match content {
        CacheContentType::StaticShaderResources => debug_assert!(
            !has_shader_visible,
            "static shader resource cache must not have shader-visible space for \"{}\"",
            target.attribs_name
        ),
        CacheContentType::SrbResources => {
            if target.kind == ResourceKind::ConstantBuffer {
                return;
            }
            if target.variable_type == ShaderVariableType::Dynamic {
                debug_assert!(
                    !has_shader_visible,
                    "dynamic variable \"{}\" must not have shader-visible space",
                    target.attribs_name
                );
            } else {
                debug_assert!(
                    has_shader_visible,
                    "{} variable \"{}\" has no shader-visible space",
                    target.variable_type,
                    target.attribs_name
                );
            }
        }
    }
}
