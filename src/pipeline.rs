// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
use crate::PipelineError;
use crate::Shader;
use crate::ShaderResourceBinding;
use crate::bindings::{
    AllowedVariableTypes, BindShaderResourcesFlags, Diagnostics, LayoutConfig, LayoutTarget,
    ResourceMapping, RootSignature, ShaderResourceLayout, ShaderType,
};
use crate::imp::{DescriptorHeap, Device};
use std::collections::HashSet;
use std::sync::Arc;

/// A set of shaders bound together, with the root signature their resources are laid out in.
///
/// The pipeline keeps one reference layout per shader, covering every variable type.
/// Binding instances clone them onto their own caches.
#[derive(Debug)]
pub struct PipelineState {
    name: String,
    shaders: Vec<Arc<Shader>>,
    root_signature: RootSignature,
    layouts: Vec<ShaderResourceLayout>,
}

impl PipelineState {
    pub fn new(
        device: Arc<dyn Device>,
        name: impl Into<String>,
        shaders: Vec<Arc<Shader>>,
        config: &LayoutConfig,
    ) -> Result<Self, PipelineError> {
        let name = name.into();
        validate_shaders(&name, &shaders)?;

        let mut root_signature = RootSignature::new();
        let layouts = shaders
            .iter()
            .map(|shader| {
                ShaderResourceLayout::new(
                    device.clone(),
                    shader.resources().clone(),
                    AllowedVariableTypes::ALL,
                    LayoutTarget::RootSignature(&mut root_signature),
                    config,
                )
            })
            .collect();

        logwise::info_sync!(
            "Created pipeline {name} with {parameters} root parameters",
            name = logwise::privacy::LogIt(&name),
            parameters = root_signature.parameters().len()
        );
        Ok(PipelineState {
            name,
            shaders,
            root_signature,
            layouts,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shaders(&self) -> &[Arc<Shader>] {
        &self.shaders
    }

    pub fn root_signature(&self) -> &RootSignature {
        &self.root_signature
    }

    /// Reference layouts, in the same order as [Self::shaders].
    pub fn layouts(&self) -> &[ShaderResourceLayout] {
        &self.layouts
    }

    pub fn layout(&self, shader_type: ShaderType) -> Option<&ShaderResourceLayout> {
        self.layouts.iter().find(|l| l.shader_type() == shader_type)
    }

    /// Binds the static variables of every shader in the pipeline.
    pub fn bind_shader_resources(
        &self,
        mapping: Option<&dyn ResourceMapping>,
        flags: BindShaderResourcesFlags,
    ) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();
        for shader in &self.shaders {
            diagnostics.append(shader.bind_resources(mapping, flags));
        }
        diagnostics
    }

    /// Creates a binding instance with shader-visible space taken from `heap`.
    ///
    /// When `init_static_resources` is set, the shaders' static resources are copied in
    /// right away; otherwise call [ShaderResourceBinding::initialize_static_resources]
    /// once they are bound.
    pub fn create_shader_resource_binding(
        self: &Arc<Self>,
        heap: &mut dyn DescriptorHeap,
        init_static_resources: bool,
    ) -> Result<ShaderResourceBinding, PipelineError> {
        let mut binding = ShaderResourceBinding::new(self.clone(), heap)?;
        if init_static_resources {
            // Problems were logged as they were found.
            let _ = binding.initialize_static_resources();
        }
        Ok(binding)
    }
}

fn validate_shaders(name: &str, shaders: &[Arc<Shader>]) -> Result<(), PipelineError> {
    if shaders.is_empty() {
        return Err(PipelineError::NoShaders {
            pipeline: name.to_string(),
        });
    }
    let mut seen = HashSet::new();
    for shader in shaders {
        if !seen.insert(shader.shader_type()) {
            return Err(PipelineError::DuplicateShaderType {
                pipeline: name.to_string(),
                shader_type: shader.shader_type(),
            });
        }
    }
    if seen.contains(&ShaderType::Compute) && seen.len() > 1 {
        return Err(PipelineError::MixedComputeAndGraphics {
            pipeline: name.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings::test_support;
    use crate::bindings::{ShaderResources, ShaderVariableType};

    fn shader(resources: ShaderResources) -> Arc<Shader> {
        Arc::new(Shader::new(
            test_support::device(),
            Arc::new(resources),
            &LayoutConfig::default(),
        ))
    }

    fn empty(name: &str, shader_type: ShaderType) -> Arc<Shader> {
        shader(ShaderResources::builder(name, shader_type).build().unwrap())
    }

    #[test]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn rejects_invalid_shader_sets() {
        let device = test_support::device();
        let config = LayoutConfig::default();
        assert!(matches!(
            PipelineState::new(device.clone(), "none", Vec::new(), &config),
            Err(PipelineError::NoShaders { .. })
        ));
        assert!(matches!(
            PipelineState::new(
                device.clone(),
                "two pixel shaders",
                vec![empty("A", ShaderType::Pixel), empty("B", ShaderType::Pixel)],
                &config
            ),
            Err(PipelineError::DuplicateShaderType { shader_type: ShaderType::Pixel, .. })
        ));
        assert!(matches!(
            PipelineState::new(
                device,
                "mixed",
                vec![empty("VS", ShaderType::Vertex), empty("CS", ShaderType::Compute)],
                &config
            ),
            Err(PipelineError::MixedComputeAndGraphics { .. })
        ));
    }

    #[test]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn shaders_share_one_root_signature() {
        let vertex = shader(
            ShaderResources::builder("VS", ShaderType::Vertex)
                .constant_buffer(test_support::attribs("g_Transforms", 0, 1, ShaderVariableType::Mutable))
                .buffer_srv(test_support::attribs("g_Instances", 0, 1, ShaderVariableType::Mutable))
                .build()
                .unwrap(),
        );
        let pixel = Arc::new(Shader::new(
            test_support::device(),
            test_support::pixel_shader_resources(),
            &LayoutConfig::default(),
        ));
        let pipeline = PipelineState::new(
            test_support::device(),
            "forward",
            vec![vertex, pixel],
            &LayoutConfig::default(),
        )
        .unwrap();

        let vs = pipeline.layout(ShaderType::Vertex).unwrap();
        let ps = pipeline.layout(ShaderType::Pixel).unwrap();
        assert_eq!(vs.variable_count(), 2);
        assert_eq!(ps.variable_count(), 8);
        let transforms = vs.resource(ShaderVariableType::Mutable, 0);
        let camera = ps.resource(ShaderVariableType::Static, 0);
        assert_eq!(transforms.root_index(), 0);
        assert_ne!(camera.root_index(), transforms.root_index());
        assert_eq!(pipeline.root_signature().parameters().len(), pipeline.root_signature().table_sizes().len());
    }
}
