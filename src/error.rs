// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Errors for the operations that can genuinely fail.
//!
//! Binding-time problems are not here; they are reported as
//! [crate::bindings::BindingError] diagnostics and never abort a bind.

use crate::bindings::{DescriptorHeapType, ShaderType, ShaderVariableType};

/// Invalid reflection input handed to [crate::bindings::ShaderResources].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShaderResourcesError {
    #[error(
        "sampler \"{sampler}\" is {sampler_type} but texture \"{texture}\" is {texture_type}; texture and sampler variable types must match"
    )]
    InconsistentSamplerType {
        texture: String,
        sampler: String,
        texture_type: ShaderVariableType,
        sampler_type: ShaderVariableType,
    },
    #[error(
        "sampler \"{sampler}\" has {sampler_count} elements but texture \"{texture}\" has {texture_count}; a sampler must be a single element or match the texture"
    )]
    SamplerBindCount {
        texture: String,
        sampler: String,
        texture_count: u32,
        sampler_count: u32,
    },
    #[error("sampler \"{sampler}\" paired with texture \"{texture}\" must be named after the texture")]
    SamplerName { texture: String, sampler: String },
    #[error("resource \"{name}\" has a bind count of zero")]
    ZeroBindCount { name: String },
    #[error("resource name \"{name}\" is declared more than once")]
    DuplicateName { name: String },
    #[error("resource \"{name}\" at bind point {bind_point} with {bind_count} elements overflows the register space")]
    BindRangeOverflow {
        name: String,
        bind_point: u32,
        bind_count: u32,
    },
}

/// A shader-visible descriptor heap could not satisfy an allocation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DescriptorHeapError {
    #[error("{heap_type:?} heap is exhausted: requested {requested} descriptors, {available} available")]
    OutOfDescriptors {
        heap_type: DescriptorHeapType,
        requested: u32,
        available: u32,
    },
}

/// A pipeline state could not be assembled from the given shaders.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("pipeline \"{pipeline}\" has no shaders")]
    NoShaders { pipeline: String },
    #[error("pipeline \"{pipeline}\" has more than one {shader_type} shader")]
    DuplicateShaderType {
        pipeline: String,
        shader_type: ShaderType,
    },
    #[error("compute shader cannot be combined with other stages in pipeline \"{pipeline}\"")]
    MixedComputeAndGraphics { pipeline: String },
    #[error(transparent)]
    DescriptorHeap(#[from] DescriptorHeapError),
}
