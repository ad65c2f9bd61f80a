// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Placement records stored in a layout.

use crate::bindings::resource_kind::{DescriptorRangeType, ResourceKind, descriptor_range_type};
use crate::bindings::root_signature::RootSlot;
use crate::bindings::shader_resources::ShaderResourceAttribs;
use crate::bindings::variable_type::ShaderVariableType;

/// Largest root index a record can hold.
pub const MAX_ROOT_INDEX: u32 = u16::MAX as u32 - 1;

/// Where one resource lives in its cache.
///
/// For a layout built against a static cache, `root_index` is the descriptor range type
/// and `offset` the bind point.  Otherwise they are the root parameter and the offset
/// within it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRecord {
    pub(crate) attribs: ShaderResourceAttribs,
    pub(crate) kind: ResourceKind,
    pub(crate) root_index: u16,
    pub(crate) offset: u32,
    pub(crate) sampler_index: Option<u32>,
}

impl ResourceRecord {
    pub(crate) fn new(
        attribs: ShaderResourceAttribs,
        kind: ResourceKind,
        slot: RootSlot,
        sampler_index: Option<u32>,
    ) -> Self {
        debug_assert!(slot.root_index <= MAX_ROOT_INDEX);
        debug_assert!(
            sampler_index.is_none() || kind == ResourceKind::TextureSrv,
            "only texture SRVs are paired with samplers"
        );
        ResourceRecord {
            attribs,
            kind,
            root_index: slot.root_index as u16,
            offset: slot.offset,
            sampler_index,
        }
    }

    pub fn attribs(&self) -> &ShaderResourceAttribs {
        &self.attribs
    }

    pub fn name(&self) -> &str {
        &self.attribs.name
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn range_type(&self) -> DescriptorRangeType {
        descriptor_range_type(self.kind)
    }

    pub fn variable_type(&self) -> ShaderVariableType {
        self.attribs.variable_type
    }

    pub fn bind_count(&self) -> u32 {
        self.attribs.bind_count
    }

    pub fn root_index(&self) -> u32 {
        self.root_index as u32
    }

    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// Index of the paired sampler among the samplers of the same variable type.
    pub fn sampler_index(&self) -> Option<u32> {
        self.sampler_index
    }

    pub fn is_dynamic(&self) -> bool {
        self.variable_type() == ShaderVariableType::Dynamic
    }
}

/// Where a sampler lives in its cache.  Static samplers have no record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplerRecord {
    pub(crate) attribs: ShaderResourceAttribs,
    pub(crate) root_index: u16,
    pub(crate) offset: u32,
}

impl SamplerRecord {
    pub(crate) fn new(attribs: ShaderResourceAttribs, slot: RootSlot) -> Self {
        debug_assert!(slot.root_index <= MAX_ROOT_INDEX);
        SamplerRecord {
            attribs,
            root_index: slot.root_index as u16,
            offset: slot.offset,
        }
    }

    pub fn attribs(&self) -> &ShaderResourceAttribs {
        &self.attribs
    }

    pub fn name(&self) -> &str {
        &self.attribs.name
    }

    pub fn variable_type(&self) -> ShaderVariableType {
        self.attribs.variable_type
    }

    pub fn bind_count(&self) -> u32 {
        self.attribs.bind_count
    }

    pub fn root_index(&self) -> u32 {
        self.root_index as u32
    }

    pub fn offset(&self) -> u32 {
        self.offset
    }
}
