// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Binding-time diagnostics.
//!
//! Binding never fails as a whole.  Every problem found while binding is logged the
//! moment it is found and collected into a [Diagnostics] value the caller can
//! inspect or drop.

use crate::bindings::resource_kind::ShaderType;
use crate::bindings::variable_type::ShaderVariableType;

/// A problem found while binding resources.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindingError {
    #[error(
        "Failed to bind {object_type} \"{object}\" to variable \"{variable}\" in shader \"{shader}\". Incorrect resource type: {expected} is expected."
    )]
    WrongObjectType {
        object_type: &'static str,
        object: String,
        variable: String,
        shader: String,
        expected: &'static str,
    },
    #[error(
        "Failed to bind {object_type} \"{object}\" to variable \"{variable}\" in shader \"{shader}\". Incorrect view type: {expected} is expected, {actual} provided."
    )]
    IncorrectViewType {
        object_type: &'static str,
        object: String,
        variable: String,
        shader: String,
        expected: &'static str,
        actual: &'static str,
    },
    #[error(
        "Failed to bind buffer \"{buffer}\" to variable \"{variable}\" in shader \"{shader}\". Buffer was not created with the uniform buffer bind flag."
    )]
    MissingUniformBufferFlag {
        buffer: String,
        variable: String,
        shader: String,
    },
    #[error(
        "Non-null {object_type} is already bound to {variable_type} shader variable \"{variable}\" in shader \"{shader}\". Binding another object may cause undefined behavior; use another shader resource binding instance or mark the variable as dynamic."
    )]
    NonDynamicRebind {
        object_type: &'static str,
        variable_type: ShaderVariableType,
        variable: String,
        shader: String,
    },
    #[error(
        "Shader variable \"{variable}\" in shader \"{shader}\" is not dynamic but is being unbound. Use another shader resource binding instance or mark the variable as dynamic."
    )]
    NonDynamicUnbind { variable: String, shader: String },
    #[error(
        "Array index {index} is out of range for shader variable \"{variable}\" in shader \"{shader}\": the array has {array_size} elements."
    )]
    ArrayIndexOutOfRange {
        variable: String,
        index: u32,
        array_size: u32,
        shader: String,
    },
    #[error("Failed to bind sampler to variable \"{variable}\". Sampler is not set in the texture view \"{view}\".")]
    SamplerNotSetInView { variable: String, view: String },
    #[error(
        "Cannot bind resource to shader variable \"{variable}\" in shader \"{shader}\": resource view not found in the resource mapping."
    )]
    UnresolvedVariable { variable: String, shader: String },
    #[error("Failed to bind resources in shader \"{shader}\": resource mapping is null.")]
    MissingResourceMapping { shader: String },
    #[error(
        "Shader variable \"{name}\" is not found in shader \"{shader}\" ({shader_type}). Attempts to set the variable will be ignored."
    )]
    VariableNotFound {
        name: String,
        shader: String,
        shader_type: ShaderType,
    },
    #[error("No resource assigned to static shader variable \"{variable}\" in shader \"{shader}\".")]
    StaticResourceNotAssigned { variable: String, shader: String },
    #[error("No sampler assigned to static shader variable \"{variable}\" in shader \"{shader}\".")]
    StaticSamplerNotAssigned { variable: String, shader: String },
    #[error("No resource is bound to {variable_type} variable \"{variable}\" in shader \"{shader}\".")]
    NoResourceBound {
        variable_type: ShaderVariableType,
        variable: String,
        shader: String,
    },
    #[error("No sampler is bound to sampler variable \"{variable}\" in shader \"{shader}\".")]
    NoSamplerBound { variable: String, shader: String },
    #[error(
        "All elements of texture array \"{texture}\" in shader \"{shader}\" share the same sampler, but the sampler set in the view for element {element} does not match the bound sampler."
    )]
    InconsistentArraySampler {
        texture: String,
        shader: String,
        element: u32,
    },
}

impl BindingError {
    /// Advisories describe a hazard, but the bind they were raised for still happened.
    pub fn is_advisory(&self) -> bool {
        matches!(
            self,
            BindingError::NonDynamicRebind { .. } | BindingError::NonDynamicUnbind { .. }
        )
    }
}

/// Everything reported during one binding operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    errors: Vec<BindingError>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Logs `error` and records it.
    pub fn report(&mut self, error: BindingError) {
        let message = error.to_string();
        if error.is_advisory() {
            logwise::warn_sync!("{message}", message = logwise::privacy::LogIt(&message));
        } else {
            logwise::error_sync!("{message}", message = logwise::privacy::LogIt(&message));
        }
        self.errors.push(error);
    }

    /// Takes over diagnostics that were already logged elsewhere.
    pub fn append(&mut self, mut other: Diagnostics) {
        self.errors.append(&mut other.errors);
    }

    pub fn errors(&self) -> &[BindingError] {
        &self.errors
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Whether anything other than an advisory was reported.
    pub fn has_errors(&self) -> bool {
        self.errors.iter().any(|e| !e.is_advisory())
    }

    pub fn count(&self, predicate: impl Fn(&BindingError) -> bool) -> usize {
        self.errors.iter().filter(|e| predicate(e)).count()
    }

    pub fn into_errors(self) -> Vec<BindingError> {
        self.errors
    }
}

impl IntoIterator for Diagnostics {
    type Item = BindingError;
    type IntoIter = std::vec::IntoIter<BindingError>;
    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}
