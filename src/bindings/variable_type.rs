// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Shader variable types and the allow-lists layouts are filtered by.

use std::fmt::Display;

/// How often a shader variable is expected to change.
///
/// The discriminants are the bucket indices used throughout the layout arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShaderVariableType {
    /// Shared by every use of a shader.  Lives in the shader's static cache.
    Static = 0,
    /// Set once per binding instance.
    Mutable = 1,
    /// May change between draws.
    Dynamic = 2,
}

impl ShaderVariableType {
    /// Number of variable types, and therefore of buckets in every layout.
    pub const COUNT: usize = 3;

    /// All variable types in bucket order.
    pub const ALL: [ShaderVariableType; Self::COUNT] = [
        ShaderVariableType::Static,
        ShaderVariableType::Mutable,
        ShaderVariableType::Dynamic,
    ];

    /// Bucket index of this variable type.
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn literal_name(self) -> &'static str {
        match self {
            ShaderVariableType::Static => "static",
            ShaderVariableType::Mutable => "mutable",
            ShaderVariableType::Dynamic => "dynamic",
        }
    }
}

impl Display for ShaderVariableType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.literal_name())
    }
}

/// A set of variable types a layout is built for.
///
/// The default set allows every type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AllowedVariableTypes(u8);

impl AllowedVariableTypes {
    pub const ALL: AllowedVariableTypes = AllowedVariableTypes(0b111);
    pub const NONE: AllowedVariableTypes = AllowedVariableTypes(0);

    /// Builds the set containing exactly `types`.
    pub fn from_types(types: &[ShaderVariableType]) -> Self {
        types
            .iter()
            .fold(Self::NONE, |set, ty| set.with(*ty))
    }

    /// Returns a copy of the set that also contains `ty`.
    pub const fn with(self, ty: ShaderVariableType) -> Self {
        AllowedVariableTypes(self.0 | (1 << ty as u8))
    }

    pub const fn contains(self, ty: ShaderVariableType) -> bool {
        self.0 & (1 << ty as u8) != 0
    }

    /// Iterates the allowed types in bucket order.
    pub fn iter(self) -> impl Iterator<Item = ShaderVariableType> {
        ShaderVariableType::ALL
            .into_iter()
            .filter(move |ty| self.contains(*ty))
    }
}

impl Default for AllowedVariableTypes {
    fn default() -> Self {
        Self::ALL
    }
}

impl From<ShaderVariableType> for AllowedVariableTypes {
    fn from(ty: ShaderVariableType) -> Self {
        Self::NONE.with(ty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn from_types_only_contains_listed() {
        let allowed =
            AllowedVariableTypes::from_types(&[ShaderVariableType::Mutable, ShaderVariableType::Dynamic]);
        assert!(!allowed.contains(ShaderVariableType::Static));
        assert!(allowed.contains(ShaderVariableType::Mutable));
        assert!(allowed.contains(ShaderVariableType::Dynamic));
        assert_eq!(
            allowed.iter().collect::<Vec<_>>(),
            vec![ShaderVariableType::Mutable, ShaderVariableType::Dynamic]
        );
    }

    #[test]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn empty_list_allows_nothing() {
        let allowed = AllowedVariableTypes::from_types(&[]);
        assert_eq!(allowed, AllowedVariableTypes::NONE);
        assert_eq!(allowed.iter().count(), 0);
        assert_eq!(AllowedVariableTypes::default(), AllowedVariableTypes::ALL);
    }
}
