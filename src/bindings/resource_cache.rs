// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
Runtime storage for bound resources.

A [ResourceCache] is an ordered list of root tables.  Each table is an array of
[CachedResource] cells; a cell owns a reference to the object bound to it, so objects
stay alive as long as they are bound.

Which table and offset a resource lands in is decided by the layout the cache is
used with:

* A static shader resource cache has exactly four tables, one per descriptor range type,
  indexed by bind point.  It is never shader-visible.
* A binding-instance cache has one table per root parameter of the root signature.
  Non-dynamic tables own a range of shader-visible descriptors that every bind is
  mirrored into.
*/

use crate::bindings::device_object::{CpuDescriptorHandle, DeviceObject};
use crate::bindings::resource_kind::{DescriptorHeapType, ResourceKind};
use crate::imp::DescriptorRange;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_CACHE_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheContentType {
    /// Resources of a shader's static variables, indexed by bind point.
    StaticShaderResources,
    /// Resources of one shader resource binding instance, indexed by root index.
    SrbResources,
}

/// One descriptor slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CachedResource {
    pub kind: Option<ResourceKind>,
    pub object: Option<DeviceObject>,
    pub cpu_handle: CpuDescriptorHandle,
}

impl CachedResource {
    pub fn is_empty(&self) -> bool {
        self.object.is_none()
    }

    pub(crate) fn clear(&mut self) {
        *self = CachedResource::default();
    }
}

#[derive(Debug, Default)]
pub struct RootTable {
    resources: Vec<CachedResource>,
    heap_type: Option<DescriptorHeapType>,
    shader_visible: Option<DescriptorRange>,
}

impl RootTable {
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn resources(&self) -> &[CachedResource] {
        &self.resources
    }

    pub fn resource(&self, offset: u32) -> &CachedResource {
        &self.resources[offset as usize]
    }

    pub(crate) fn resource_mut(&mut self, offset: u32) -> &mut CachedResource {
        &mut self.resources[offset as usize]
    }

    /// Heap type the table was set up for, if it was set up for one.
    pub fn heap_type(&self) -> Option<DescriptorHeapType> {
        self.heap_type
    }

    pub(crate) fn set_heap_type(&mut self, heap_type: DescriptorHeapType) {
        self.heap_type = Some(heap_type);
    }

    pub fn shader_visible_range(&self) -> Option<DescriptorRange> {
        self.shader_visible
    }

    pub(crate) fn set_shader_visible_range(&mut self, range: DescriptorRange) {
        debug_assert!(
            range.count as usize >= self.resources.len(),
            "shader-visible range of {} descriptors cannot mirror a table of {}",
            range.count,
            self.resources.len()
        );
        self.shader_visible = Some(range);
    }

    pub fn shader_visible_handle(&self, offset: u32) -> Option<CpuDescriptorHandle> {
        self.shader_visible.map(|range| range.handle(offset))
    }
}

#[derive(Debug)]
pub struct ResourceCache {
    id: u64,
    content: CacheContentType,
    tables: Vec<RootTable>,
}

impl ResourceCache {
    pub fn new(content: CacheContentType) -> Self {
        ResourceCache {
            id: NEXT_CACHE_ID.fetch_add(1, Ordering::Relaxed),
            content,
            tables: Vec::new(),
        }
    }

    pub fn content_type(&self) -> CacheContentType {
        self.content
    }

    /// Identity used by layouts to check they are handed the cache they were built for.
    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    /// Replaces all tables with empty tables of the given sizes.
    pub fn initialize(&mut self, table_sizes: &[u32]) {
        self.tables = table_sizes
            .iter()
            .map(|&size| RootTable {
                resources: vec![CachedResource::default(); size as usize],
                heap_type: None,
                shader_visible: None,
            })
            .collect();
    }

    pub fn num_root_tables(&self) -> usize {
        self.tables.len()
    }

    pub fn root_table(&self, root_index: u32) -> &RootTable {
        &self.tables[root_index as usize]
    }

    pub(crate) fn root_table_mut(&mut self, root_index: u32) -> &mut RootTable {
        &mut self.tables[root_index as usize]
    }

    pub fn root_tables(&self) -> &[RootTable] {
        &self.tables
    }

    pub fn resource(&self, root_index: u32, offset: u32) -> &CachedResource {
        self.root_table(root_index).resource(offset)
    }

    /// Handle of the shader-visible copy of a cell, if the table has shader-visible space.
    pub fn shader_visible_handle(
        &self,
        root_index: u32,
        offset: u32,
        heap_type: DescriptorHeapType,
    ) -> Option<CpuDescriptorHandle> {
        let table = self.root_table(root_index);
        debug_assert!(
            table.heap_type.is_none_or(|t| t == heap_type),
            "root table {root_index} holds {:?} descriptors, not {heap_type:?}",
            table.heap_type
        );
        table.shader_visible_handle(offset)
    }

    /// Number of cells holding an object.
    pub fn bound_count(&self) -> usize {
        self.tables
            .iter()
            .flat_map(|t| t.resources.iter())
            .filter(|r| !r.is_empty())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn initialize_creates_empty_tables() {
        let mut cache = ResourceCache::new(CacheContentType::StaticShaderResources);
        cache.initialize(&[2, 0, 1, 3]);
        assert_eq!(cache.num_root_tables(), 4);
        assert_eq!(cache.root_table(0).len(), 2);
        assert!(cache.root_table(1).is_empty());
        assert_eq!(cache.root_table(3).len(), 3);
        assert_eq!(cache.bound_count(), 0);
        assert_eq!(cache.shader_visible_handle(0, 1, DescriptorHeapType::CbvSrvUav), None);
    }

    #[test]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn shader_visible_handles_step_by_increment() {
        let mut cache = ResourceCache::new(CacheContentType::SrbResources);
        cache.initialize(&[4]);
        let table = cache.root_table_mut(0);
        table.set_heap_type(DescriptorHeapType::CbvSrvUav);
        table.set_shader_visible_range(DescriptorRange {
            first: CpuDescriptorHandle(0x8000),
            count: 4,
            increment: 32,
        });
        assert_eq!(
            cache.shader_visible_handle(0, 3, DescriptorHeapType::CbvSrvUav),
            Some(CpuDescriptorHandle(0x8000 + 96))
        );
    }

    #[test]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn caches_have_distinct_ids() {
        let a = ResourceCache::new(CacheContentType::SrbResources);
        let b = ResourceCache::new(CacheContentType::SrbResources);
        assert_ne!(a.id(), b.id());
    }
}
