// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
Contiguous storage for the records of one layout.

Records are counted before they are placed.  [ArenaBuilder] reserves exactly the
counted number of slots per variable type and refuses to grow past them, the same way a
fixed-capacity vector refuses to reallocate.  [ArenaBuilder::finish] packs the buckets
into one boxed slice per record type, so a bucket is a subslice and a record index is
stable for the life of the layout.
*/

use crate::bindings::layout_records::{ResourceRecord, SamplerRecord};
use crate::bindings::variable_type::ShaderVariableType;

const BUCKETS: usize = ShaderVariableType::COUNT;

/// Number of records per variable type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct LayoutCounts {
    pub resources: [u32; BUCKETS],
    pub samplers: [u32; BUCKETS],
}

pub(crate) struct ArenaBuilder {
    counts: LayoutCounts,
    resources: [Vec<ResourceRecord>; BUCKETS],
    samplers: [Vec<SamplerRecord>; BUCKETS],
}

impl ArenaBuilder {
    pub fn with_counts(counts: LayoutCounts) -> Self {
        ArenaBuilder {
            counts,
            resources: counts.resources.map(|n| Vec::with_capacity(n as usize)),
            samplers: counts.samplers.map(|n| Vec::with_capacity(n as usize)),
        }
    }

    /// Places a resource record and returns its index within its bucket.
    pub fn place_resource(&mut self, ty: ShaderVariableType, record: ResourceRecord) -> u32 {
        let bucket = &mut self.resources[ty.index()];
        assert!(
            bucket.len() < self.counts.resources[ty.index()] as usize,
            "placing more {ty} resources than were counted"
        );
        bucket.push(record);
        (bucket.len() - 1) as u32
    }

    /// Places a sampler record and returns its index within its bucket.
    pub fn place_sampler(&mut self, ty: ShaderVariableType, record: SamplerRecord) -> u32 {
        let bucket = &mut self.samplers[ty.index()];
        assert!(
            bucket.len() < self.counts.samplers[ty.index()] as usize,
            "placing more {ty} samplers than were counted"
        );
        bucket.push(record);
        (bucket.len() - 1) as u32
    }

    pub fn finish(self) -> LayoutArena {
        for ty in ShaderVariableType::ALL {
            debug_assert_eq!(
                self.resources[ty.index()].len(),
                self.counts.resources[ty.index()] as usize,
                "not all counted {ty} resources were placed"
            );
            debug_assert_eq!(
                self.samplers[ty.index()].len(),
                self.counts.samplers[ty.index()] as usize,
                "not all counted {ty} samplers were placed"
            );
        }
        let (resources, resource_starts) = pack(self.resources);
        let (samplers, sampler_starts) = pack(self.samplers);
        LayoutArena {
            resources,
            samplers,
            resource_starts,
            sampler_starts,
        }
    }
}

fn pack<T>(buckets: [Vec<T>; BUCKETS]) -> (Box<[T]>, [usize; BUCKETS + 1]) {
    let mut starts = [0; BUCKETS + 1];
    for (i, bucket) in buckets.iter().enumerate() {
        starts[i + 1] = starts[i] + bucket.len();
    }
    let mut packed = Vec::with_capacity(starts[BUCKETS]);
    for bucket in buckets {
        packed.extend(bucket);
    }
    (packed.into_boxed_slice(), starts)
}

#[derive(Debug, Clone)]
pub(crate) struct LayoutArena {
    resources: Box<[ResourceRecord]>,
    samplers: Box<[SamplerRecord]>,
    resource_starts: [usize; BUCKETS + 1],
    sampler_starts: [usize; BUCKETS + 1],
}

impl LayoutArena {
    pub fn resource_count(&self, ty: ShaderVariableType) -> usize {
        self.resource_starts[ty.index() + 1] - self.resource_starts[ty.index()]
    }

    pub fn sampler_count(&self, ty: ShaderVariableType) -> usize {
        self.sampler_starts[ty.index() + 1] - self.sampler_starts[ty.index()]
    }

    pub fn resources(&self, ty: ShaderVariableType) -> &[ResourceRecord] {
        &self.resources[self.resource_starts[ty.index()]..self.resource_starts[ty.index() + 1]]
    }

    pub fn samplers(&self, ty: ShaderVariableType) -> &[SamplerRecord] {
        &self.samplers[self.sampler_starts[ty.index()]..self.sampler_starts[ty.index() + 1]]
    }

    /// Every resource record, in bucket order.
    pub fn all_resources(&self) -> &[ResourceRecord] {
        &self.resources
    }

    /// Paired sampler of `record`.
    pub fn sampler_of(&self, record: &ResourceRecord) -> Option<&SamplerRecord> {
        let index = record.sampler_index?;
        Some(&self.samplers(record.variable_type())[index as usize])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings::ResourceKind;
    use crate::bindings::root_signature::RootSlot;
    use crate::bindings::shader_resources::ShaderResourceAttribs;

    fn record(name: &str, ty: ShaderVariableType, offset: u32) -> ResourceRecord {
        ResourceRecord::new(
            ShaderResourceAttribs::new(name, offset, 1, ty),
            ResourceKind::BufferSrv,
            RootSlot {
                root_index: 0,
                offset,
            },
            None,
        )
    }

    #[test]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn buckets_are_contiguous_subslices() {
        let counts = LayoutCounts {
            resources: [1, 0, 2],
            samplers: [0; BUCKETS],
        };
        let mut builder = ArenaBuilder::with_counts(counts);
        assert_eq!(builder.place_resource(ShaderVariableType::Dynamic, record("d0", ShaderVariableType::Dynamic, 0)), 0);
        assert_eq!(builder.place_resource(ShaderVariableType::Static, record("s0", ShaderVariableType::Static, 1)), 0);
        assert_eq!(builder.place_resource(ShaderVariableType::Dynamic, record("d1", ShaderVariableType::Dynamic, 2)), 1);
        let arena = builder.finish();

        assert_eq!(arena.resource_count(ShaderVariableType::Static), 1);
        assert_eq!(arena.resource_count(ShaderVariableType::Mutable), 0);
        assert_eq!(arena.resource_count(ShaderVariableType::Dynamic), 2);
        let names: Vec<_> = arena.all_resources().iter().map(|r| r.name()).collect();
        assert_eq!(names, ["s0", "d0", "d1"]);
        assert_eq!(arena.resources(ShaderVariableType::Dynamic)[1].name(), "d1");
        assert!(ShaderVariableType::ALL.iter().all(|ty| arena.sampler_count(*ty) == 0));
    }

    #[test]
    #[should_panic(expected = "placing more static resources than were counted")]
    fn placing_past_the_count_panics() {
        let mut builder = ArenaBuilder::with_counts(LayoutCounts::default());
        builder.place_resource(ShaderVariableType::Static, record("s0", ShaderVariableType::Static, 0));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "not all counted mutable resources were placed")]
    fn finishing_short_of_the_count_panics() {
        let counts = LayoutCounts {
            resources: [0, 1, 0],
            samplers: [0; BUCKETS],
        };
        let _ = ArenaBuilder::with_counts(counts).finish();
    }
}
