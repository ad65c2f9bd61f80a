// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
Maps a shader's declared resources to cache slots.

A [ShaderResourceLayout] is built in two passes over a [ShaderResourceSource].  The first
pass counts resources and samplers per variable type.  The second places one record per
resource at an address resolved against the layout's [LayoutTarget]:

| Target           | Root index                 | Offset                      |
|------------------|----------------------------|-----------------------------|
| `StaticCache`    | descriptor range type      | bind point                  |
| `RootSignature`  | allocated by the builder   | allocated by the builder    |

Layouts built against a root signature are reference layouts.  Each binding instance
clones the parts it needs with [ShaderResourceLayout::clone_subset], bound to the
instance's own cache.

Layouts never hold on to a cache.  Every binding operation takes the cache as an
argument, and debug builds check that it is the cache the layout was made for.
*/

use crate::bindings::diagnostics::{BindingError, Diagnostics};
use crate::bindings::device_object::DeviceObject;
use crate::bindings::layout_arena::{ArenaBuilder, LayoutArena, LayoutCounts};
use crate::bindings::layout_config::{LayoutConfig, VariableLookup};
use crate::bindings::layout_records::{MAX_ROOT_INDEX, ResourceRecord, SamplerRecord};
use crate::bindings::resource_cache::ResourceCache;
use crate::bindings::resource_kind::{
    DescriptorRangeType, ResourceKind, ShaderType, descriptor_range_type,
};
use crate::bindings::root_signature::{RootSignatureBuilder, RootSlot};
use crate::bindings::shader_resources::{ShaderResourceAttribs, ShaderResourceSource};
use crate::bindings::variable_type::{AllowedVariableTypes, ShaderVariableType};
use crate::imp::Device;
use std::collections::HashMap;
use std::sync::Arc;

/// What a layout resolves addresses against.
pub enum LayoutTarget<'a> {
    /// The shader's static resource cache.  It is (re)initialized with one table per
    /// descriptor range type.
    StaticCache(&'a mut ResourceCache),
    RootSignature(&'a mut dyn RootSignatureBuilder),
}

#[derive(Debug)]
pub struct ShaderResourceLayout {
    pub(crate) device: Arc<dyn Device>,
    resources: Arc<dyn ShaderResourceSource>,
    pub(crate) arena: LayoutArena,
    names: Option<HashMap<Arc<str>, u32>>,
    pub(crate) config: LayoutConfig,
    /// Cache this layout binds into.  Reference layouts have none.
    cache_id: Option<u64>,
}

impl ShaderResourceLayout {
    pub fn new(
        device: Arc<dyn Device>,
        resources: Arc<dyn ShaderResourceSource>,
        allowed: AllowedVariableTypes,
        mut target: LayoutTarget<'_>,
        config: &LayoutConfig,
    ) -> Self {
        let shader_type = resources.shader_type();

        let mut counts = LayoutCounts::default();
        resources.for_each_resource(allowed, &mut |kind, attribs| {
            let ty = attribs.variable_type.index();
            counts.resources[ty] += 1;
            if kind == ResourceKind::TextureSrv
                && let Some(id) = attribs.sampler_id()
                && !resources.sampler(id).is_static()
            {
                counts.samplers[ty] += 1;
            }
        });

        let mut builder = ArenaBuilder::with_counts(counts);
        let mut static_table_sizes = [0u32; DescriptorRangeType::COUNT];
        resources.for_each_resource(allowed, &mut |kind, attribs| {
            let ty = attribs.variable_type;
            let slot = resolve_slot(
                &mut target,
                shader_type,
                attribs,
                descriptor_range_type(kind),
                &mut static_table_sizes,
            );

            let mut sampler_index = None;
            if kind == ResourceKind::TextureSrv
                && let Some(id) = attribs.sampler_id()
            {
                let sampler = resources.sampler(id);
                debug_assert_eq!(
                    sampler.attribs.variable_type, ty,
                    "sampler \"{}\" and texture \"{}\" have different variable types",
                    sampler.attribs.name, attribs.name
                );
                if sampler.is_static() {
                    if let LayoutTarget::RootSignature(signature) = &mut target {
                        signature.init_static_sampler(shader_type, &attribs.name, sampler);
                    }
                } else {
                    let sampler_slot = resolve_slot(
                        &mut target,
                        shader_type,
                        &sampler.attribs,
                        DescriptorRangeType::Sampler,
                        &mut static_table_sizes,
                    );
                    sampler_index = Some(builder.place_sampler(
                        ty,
                        SamplerRecord::new(sampler.attribs.clone(), sampler_slot),
                    ));
                }
            }
            builder.place_resource(
                ty,
                ResourceRecord::new(attribs.clone(), kind, slot, sampler_index),
            );
        });
        let arena = builder.finish();

        let cache_id = match target {
            LayoutTarget::StaticCache(cache) => {
                cache.initialize(&static_table_sizes);
                for range in DescriptorRangeType::ALL {
                    cache
                        .root_table_mut(range.index() as u32)
                        .set_heap_type(range.heap_type());
                }
                Some(cache.id())
            }
            LayoutTarget::RootSignature(_) => None,
        };

        logwise::trace_sync!(
            "Built resource layout for {shader}: {resource_count} resources, {sampler_count} samplers",
            shader = logwise::privacy::LogIt(resources.shader_name()),
            resource_count = arena.all_resources().len(),
            sampler_count = ShaderVariableType::ALL
                .iter()
                .map(|ty| arena.sampler_count(*ty))
                .sum::<usize>()
        );

        let names = build_name_index(&arena, config.lookup);
        ShaderResourceLayout {
            device,
            resources,
            arena,
            names,
            config: config.clone(),
            cache_id,
        }
    }

    /// Copies the records of every bucket in `allowed` into a new layout that binds into
    /// `cache`.  `cache` is not touched.
    pub fn clone_subset(&self, allowed: AllowedVariableTypes, cache: &ResourceCache) -> Self {
        let mut counts = LayoutCounts::default();
        for ty in allowed.iter() {
            counts.resources[ty.index()] = self.arena.resource_count(ty) as u32;
            counts.samplers[ty.index()] = self.arena.sampler_count(ty) as u32;
        }

        let mut builder = ArenaBuilder::with_counts(counts);
        for ty in allowed.iter() {
            for sampler in self.arena.samplers(ty) {
                builder.place_sampler(ty, sampler.clone());
            }
            for record in self.arena.resources(ty) {
                debug_assert!(record.root_index() <= MAX_ROOT_INDEX);
                if let Some(sampler) = self.arena.sampler_of(record) {
                    debug_assert_eq!(sampler.variable_type(), record.variable_type());
                    debug_assert!(
                        sampler.bind_count() == 1 || sampler.bind_count() == record.bind_count(),
                        "sampler \"{}\" must be a single sampler or match texture \"{}\"",
                        sampler.name(),
                        record.name()
                    );
                }
                builder.place_resource(ty, record.clone());
            }
        }
        let arena = builder.finish();

        let names = build_name_index(&arena, self.config.lookup);
        ShaderResourceLayout {
            device: self.device.clone(),
            resources: self.resources.clone(),
            arena,
            names,
            config: self.config.clone(),
            cache_id: Some(cache.id()),
        }
    }

    pub fn shader_type(&self) -> ShaderType {
        self.resources.shader_type()
    }

    pub fn shader_name(&self) -> &str {
        self.resources.shader_name()
    }

    pub fn shader_resources(&self) -> &Arc<dyn ShaderResourceSource> {
        &self.resources
    }

    pub fn resource_count(&self, ty: ShaderVariableType) -> usize {
        self.arena.resource_count(ty)
    }

    pub fn sampler_count(&self, ty: ShaderVariableType) -> usize {
        self.arena.sampler_count(ty)
    }

    /// Number of variables across all buckets.
    pub fn variable_count(&self) -> usize {
        self.arena.all_resources().len()
    }

    pub fn resource(&self, ty: ShaderVariableType, index: usize) -> &ResourceRecord {
        &self.arena.resources(ty)[index]
    }

    pub fn sampler(&self, ty: ShaderVariableType, index: usize) -> &SamplerRecord {
        &self.arena.samplers(ty)[index]
    }

    pub fn resources(&self, ty: ShaderVariableType) -> &[ResourceRecord] {
        self.arena.resources(ty)
    }

    pub fn samplers(&self, ty: ShaderVariableType) -> &[SamplerRecord] {
        self.arena.samplers(ty)
    }

    /// Sampler record paired with `record`, if it has a non-static one.
    pub fn paired_sampler(&self, record: &ResourceRecord) -> Option<&SamplerRecord> {
        self.arena.sampler_of(record)
    }

    fn variable_index(&self, name: &str) -> Option<u32> {
        match &self.names {
            Some(names) => names.get(name).copied(),
            None => self
                .arena
                .all_resources()
                .iter()
                .position(|r| r.name() == name)
                .map(|i| i as u32),
        }
    }

    /// Looks up a variable by name, reporting [BindingError::VariableNotFound] into
    /// `diagnostics` when there is none.
    pub fn find_variable(
        &self,
        name: &str,
        diagnostics: &mut Diagnostics,
    ) -> Option<ShaderVariable<'_>> {
        let variable = self.variable(name);
        if variable.is_none() {
            diagnostics.report(BindingError::VariableNotFound {
                name: name.to_string(),
                shader: self.shader_name().to_string(),
                shader_type: self.shader_type(),
            });
        }
        variable
    }

    /// Looks up a variable by name without reporting anything.
    pub fn variable(&self, name: &str) -> Option<ShaderVariable<'_>> {
        self.variable_index(name).map(|index| ShaderVariable {
            layout: self,
            index,
        })
    }

    /// Variable by its index in the layout, counting across buckets in bucket order.
    pub fn variable_by_index(&self, index: u32) -> Option<ShaderVariable<'_>> {
        ((index as usize) < self.variable_count()).then_some(ShaderVariable {
            layout: self,
            index,
        })
    }

    pub fn variables(&self) -> impl Iterator<Item = ShaderVariable<'_>> {
        (0..self.variable_count() as u32).map(|index| ShaderVariable {
            layout: self,
            index,
        })
    }

    /// Binds `object` to element `array_index` of the named variable.  Setting a variable
    /// that does not exist does nothing beyond reporting it.
    pub fn set_variable(
        &self,
        cache: &mut ResourceCache,
        name: &str,
        array_index: u32,
        object: Option<&DeviceObject>,
    ) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();
        if let Some(variable) = self.find_variable(name, &mut diagnostics) {
            diagnostics.append(variable.set_element(cache, array_index, object));
        }
        diagnostics
    }

    pub(crate) fn debug_check_cache(&self, cache: &ResourceCache) {
        if let Some(id) = self.cache_id {
            debug_assert_eq!(
                id,
                cache.id(),
                "resource cache does not match the cache layout \"{}\" was created for",
                self.shader_name()
            );
        }
    }
}

fn resolve_slot(
    target: &mut LayoutTarget<'_>,
    shader_type: ShaderType,
    attribs: &ShaderResourceAttribs,
    range_type: DescriptorRangeType,
    static_table_sizes: &mut [u32; DescriptorRangeType::COUNT],
) -> RootSlot {
    match target {
        LayoutTarget::StaticCache(_) => {
            let size = &mut static_table_sizes[range_type.index()];
            *size = (*size).max(attribs.bind_point.saturating_add(attribs.bind_count));
            RootSlot {
                root_index: range_type.index() as u32,
                offset: attribs.bind_point,
            }
        }
        LayoutTarget::RootSignature(builder) => {
            let slot = builder.allocate_resource_slot(shader_type, attribs, range_type);
            debug_assert!(
                slot.root_index <= MAX_ROOT_INDEX,
                "root index {} of \"{}\" is out of range",
                slot.root_index,
                attribs.name
            );
            slot
        }
    }
}

fn build_name_index(arena: &LayoutArena, lookup: VariableLookup) -> Option<HashMap<Arc<str>, u32>> {
    match lookup {
        VariableLookup::HashMap => Some(
            arena
                .all_resources()
                .iter()
                .enumerate()
                .map(|(i, record)| (record.attribs().name.clone(), i as u32))
                .collect(),
        ),
        VariableLookup::LinearScan => None,
    }
}

/// A handle to one variable of a layout.
#[derive(Debug, Clone, Copy)]
pub struct ShaderVariable<'a> {
    layout: &'a ShaderResourceLayout,
    index: u32,
}

impl<'a> ShaderVariable<'a> {
    fn record(&self) -> &'a ResourceRecord {
        &self.layout.arena.all_resources()[self.index as usize]
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn name(&self) -> &'a str {
        self.record().name()
    }

    pub fn kind(&self) -> ResourceKind {
        self.record().kind()
    }

    pub fn variable_type(&self) -> ShaderVariableType {
        self.record().variable_type()
    }

    pub fn array_size(&self) -> u32 {
        self.record().bind_count()
    }

    pub fn set(&self, cache: &mut ResourceCache, object: Option<&DeviceObject>) -> Diagnostics {
        self.set_element(cache, 0, object)
    }

    pub fn set_element(
        &self,
        cache: &mut ResourceCache,
        array_index: u32,
        object: Option<&DeviceObject>,
    ) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();
        self.layout
            .bind_resource(cache, self.index, array_index, object, &mut diagnostics);
        diagnostics
    }

    /// Binds `objects` to consecutive elements starting at `first_element`.  Nothing is
    /// bound when the elements do not all fit in the array.
    pub fn set_array(
        &self,
        cache: &mut ResourceCache,
        first_element: u32,
        objects: &[DeviceObject],
    ) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();
        let end = u32::try_from(objects.len())
            .ok()
            .and_then(|len| first_element.checked_add(len));
        if end.is_none_or(|end| end > self.array_size()) {
            let last = first_element.saturating_add(objects.len().saturating_sub(1) as u32);
            diagnostics.report(self.layout.array_index_out_of_range(self.record(), last));
            return diagnostics;
        }
        for (i, object) in objects.iter().enumerate() {
            let array_index = first_element + i as u32;
            self.layout
                .bind_resource(cache, self.index, array_index, Some(object), &mut diagnostics);
        }
        diagnostics
    }

    pub fn is_bound(&self, cache: &ResourceCache, array_index: u32) -> bool {
        self.layout.is_bound(cache, self.index, array_index)
    }
}
