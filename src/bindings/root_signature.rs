// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
Root signature slot allocation.

Layouts built for a pipeline ask a [RootSignatureBuilder] where each resource goes.
[RootSignature] is the allocator the pipeline uses:

* A constant buffer that is not an array becomes a root view of its own, at offset 0.
* Everything else is appended to a descriptor table.  There is one table per shader
  type, heap type and "is dynamic", so dynamic resources never share a table with
  resources that are mirrored into shader-visible memory.
* Static samplers are recorded and take no cache space.
*/

use crate::DescriptorHeapError;
use crate::bindings::resource_cache::{CacheContentType, ResourceCache};
use crate::bindings::resource_kind::{DescriptorHeapType, DescriptorRangeType, ShaderType};
use crate::bindings::shader_resources::{SamplerAttribs, SamplerDesc, ShaderResourceAttribs};
use crate::bindings::variable_type::ShaderVariableType;
use crate::imp::DescriptorHeap;
use std::collections::HashMap;

pub use crate::bindings::layout_records::MAX_ROOT_INDEX;

/// Address assigned to a resource: root parameter and offset within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RootSlot {
    pub root_index: u32,
    pub offset: u32,
}

pub trait RootSignatureBuilder {
    fn allocate_resource_slot(
        &mut self,
        shader_type: ShaderType,
        attribs: &ShaderResourceAttribs,
        range_type: DescriptorRangeType,
    ) -> RootSlot;

    fn init_static_sampler(
        &mut self,
        shader_type: ShaderType,
        texture_name: &str,
        sampler: &SamplerAttribs,
    );
}

/// One range of registers inside a descriptor table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorRangeDesc {
    pub range_type: DescriptorRangeType,
    pub base_register: u32,
    pub count: u32,
    /// Offset of the range from the start of its table.
    pub offset: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RootParameter {
    ConstantBufferView {
        shader_type: ShaderType,
        variable_type: ShaderVariableType,
        register: u32,
    },
    DescriptorTable {
        shader_type: ShaderType,
        heap_type: DescriptorHeapType,
        dynamic: bool,
        ranges: Vec<DescriptorRangeDesc>,
        size: u32,
    },
}

impl RootParameter {
    /// Number of cache cells the parameter needs.
    pub fn size(&self) -> u32 {
        match self {
            RootParameter::ConstantBufferView { .. } => 1,
            RootParameter::DescriptorTable { size, .. } => *size,
        }
    }

    pub fn heap_type(&self) -> DescriptorHeapType {
        match self {
            RootParameter::ConstantBufferView { .. } => DescriptorHeapType::CbvSrvUav,
            RootParameter::DescriptorTable { heap_type, .. } => *heap_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticSampler {
    pub shader_type: ShaderType,
    pub name: String,
    pub texture_name: String,
    pub register: u32,
    pub desc: SamplerDesc,
}

#[derive(Debug, Clone, Default)]
pub struct RootSignature {
    parameters: Vec<RootParameter>,
    tables: HashMap<(ShaderType, DescriptorHeapType, bool), u32>,
    static_samplers: Vec<StaticSampler>,
}

impl RootSignature {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parameters(&self) -> &[RootParameter] {
        &self.parameters
    }

    pub fn static_samplers(&self) -> &[StaticSampler] {
        &self.static_samplers
    }

    /// Cache sizes, one per root parameter.
    pub fn table_sizes(&self) -> Vec<u32> {
        self.parameters.iter().map(RootParameter::size).collect()
    }

    /// Prepares a binding-instance cache: one table per root parameter, with
    /// shader-visible space for every non-empty, non-dynamic descriptor table.
    pub fn init_resource_cache(
        &self,
        cache: &mut ResourceCache,
        heap: &mut dyn DescriptorHeap,
    ) -> Result<(), DescriptorHeapError> {
        debug_assert_eq!(cache.content_type(), CacheContentType::SrbResources);
        cache.initialize(&self.table_sizes());
        for (root_index, parameter) in self.parameters.iter().enumerate() {
            let table = cache.root_table_mut(root_index as u32);
            table.set_heap_type(parameter.heap_type());
            if let RootParameter::DescriptorTable {
                heap_type,
                dynamic: false,
                size,
                ..
            } = parameter
                && *size > 0
            {
                table.set_shader_visible_range(heap.allocate(*heap_type, *size)?);
            }
        }
        Ok(())
    }
}

impl RootSignatureBuilder for RootSignature {
    fn allocate_resource_slot(
        &mut self,
        shader_type: ShaderType,
        attribs: &ShaderResourceAttribs,
        range_type: DescriptorRangeType,
    ) -> RootSlot {
        if range_type == DescriptorRangeType::Cbv && attribs.bind_count == 1 {
            self.parameters.push(RootParameter::ConstantBufferView {
                shader_type,
                variable_type: attribs.variable_type,
                register: attribs.bind_point,
            });
            return RootSlot {
                root_index: (self.parameters.len() - 1) as u32,
                offset: 0,
            };
        }

        let heap_type = range_type.heap_type();
        let dynamic = attribs.variable_type == ShaderVariableType::Dynamic;
        let parameters = &mut self.parameters;
        let root_index = *self
            .tables
            .entry((shader_type, heap_type, dynamic))
            .or_insert_with(|| {
                parameters.push(RootParameter::DescriptorTable {
                    shader_type,
                    heap_type,
                    dynamic,
                    ranges: Vec::new(),
                    size: 0,
                });
                (parameters.len() - 1) as u32
            });
        debug_assert!(root_index <= MAX_ROOT_INDEX, "root index {root_index} is out of range");

        match &mut self.parameters[root_index as usize] {
            RootParameter::DescriptorTable { ranges, size, .. } => {
                let offset = *size;
                ranges.push(DescriptorRangeDesc {
                    range_type,
                    base_register: attribs.bind_point,
                    count: attribs.bind_count,
                    offset,
                });
                *size += attribs.bind_count;
                RootSlot { root_index, offset }
            }
            RootParameter::ConstantBufferView { .. } => {
                unreachable!("table index {root_index} refers to a root view")
            }
        }
    }

    fn init_static_sampler(
        &mut self,
        shader_type: ShaderType,
        texture_name: &str,
        sampler: &SamplerAttribs,
    ) {
        debug_assert!(sampler.is_static(), "sampler \"{}\" is not static", sampler.attribs.name);
        self.static_samplers.push(StaticSampler {
            shader_type,
            name: sampler.attribs.name.to_string(),
            texture_name: texture_name.to_string(),
            register: sampler.attribs.bind_point,
            desc: sampler.static_desc.unwrap_or_default(),
        });
    }
}
