// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Name-keyed lookup of device objects.

use crate::bindings::device_object::DeviceObject;
use std::collections::HashMap;

/// Resolves shader variable names to the objects that should be bound to them.
pub trait ResourceMapping {
    fn resolve(&self, name: &str, array_index: u32) -> Option<DeviceObject>;
}

impl<F> ResourceMapping for F
where
    F: Fn(&str, u32) -> Option<DeviceObject>,
{
    fn resolve(&self, name: &str, array_index: u32) -> Option<DeviceObject> {
        self(name, array_index)
    }
}

/// A [ResourceMapping] backed by a hash map.
#[derive(Debug, Clone, Default)]
pub struct ResourceMappingTable {
    entries: HashMap<String, Vec<Option<DeviceObject>>>,
}

impl ResourceMappingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps element 0 of `name`.
    pub fn add_resource(&mut self, name: impl Into<String>, object: DeviceObject) -> &mut Self {
        self.add_resource_array(name, 0, [object])
    }

    /// Maps consecutive elements of `name` starting at `first_element`.
    pub fn add_resource_array(
        &mut self,
        name: impl Into<String>,
        first_element: u32,
        objects: impl IntoIterator<Item = DeviceObject>,
    ) -> &mut Self {
        let elements = self.entries.entry(name.into()).or_default();
        for (i, object) in objects.into_iter().enumerate() {
            let index = first_element as usize + i;
            if elements.len() <= index {
                elements.resize(index + 1, None);
            }
            elements[index] = Some(object);
        }
        self
    }

    pub fn remove(&mut self, name: &str, array_index: u32) -> Option<DeviceObject> {
        self.entries
            .get_mut(name)?
            .get_mut(array_index as usize)?
            .take()
    }

    /// Number of mapped elements.
    pub fn len(&self) -> usize {
        self.entries
            .values()
            .map(|elements| elements.iter().filter(|e| e.is_some()).count())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ResourceMapping for ResourceMappingTable {
    fn resolve(&self, name: &str, array_index: u32) -> Option<DeviceObject> {
        self.entries
            .get(name)?
            .get(array_index as usize)?
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings::Sampler;
    use crate::imp::software::SoftwareDevice;

    #[test]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn array_elements_resolve_independently() {
        let device = SoftwareDevice::new();
        let a = DeviceObject::Sampler(device.create_sampler("a"));
        let b = DeviceObject::Sampler(device.create_sampler("b"));

        let mut mapping = ResourceMappingTable::new();
        mapping.add_resource_array("Samplers", 1, [a.clone(), b.clone()]);
        assert_eq!(mapping.resolve("Samplers", 0), None);
        assert_eq!(mapping.resolve("Samplers", 1), Some(a));
        assert_eq!(mapping.resolve("Samplers", 2), Some(b.clone()));
        assert_eq!(mapping.resolve("Samplers", 3), None);
        assert_eq!(mapping.len(), 2);

        assert_eq!(mapping.remove("Samplers", 2), Some(b));
        assert_eq!(mapping.resolve("Samplers", 2), None);
        assert_eq!(mapping.len(), 1);
    }

    #[test]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn closures_are_mappings() {
        let device = SoftwareDevice::new();
        let sampler = device.create_sampler("linear");
        let name = sampler.name().to_string();
        let mapping = move |n: &str, _: u32| {
            (n == name).then(|| DeviceObject::Sampler(sampler.clone()))
        };
        assert!(mapping.resolve("linear", 0).is_some());
        assert!(mapping.resolve("point", 0).is_none());
    }
}
