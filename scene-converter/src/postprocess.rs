//! Post-processing steps requested from the engine
//!
//! Bit values match Assimp's `aiPostProcessSteps`, so the raw value can be
//! handed straight to an Assimp-backed engine. The same type carries the
//! import-phase steps (applied after the root transform is patched) and the
//! export-phase preprocessing steps.

use bitflags::bitflags;

bitflags! {
    /// Post-processing steps applied by the engine
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PostProcessSteps: u32 {
        /// Calculates tangents and bitangents.
        const CALC_TANGENT_SPACE = 0x1;
        /// Joins identical vertex data sets within meshes.
        const JOIN_IDENTICAL_VERTICES = 0x2;
        /// Converts to a left-handed coordinate space.
        const MAKE_LEFT_HANDED = 0x4;
        /// Triangulates all faces.
        const TRIANGULATE = 0x8;
        /// Removes components listed in `AI_CONFIG_PP_RVC_FLAGS`.
        const REMOVE_COMPONENT = 0x10;
        /// Generates flat normals.
        const GEN_NORMALS = 0x20;
        /// Generates smooth normals.
        const GEN_SMOOTH_NORMALS = 0x40;
        /// Splits meshes over the configured vertex/triangle limits.
        const SPLIT_LARGE_MESHES = 0x80;
        /// Bakes node transforms into vertices and drops the hierarchy.
        const PRE_TRANSFORM_VERTICES = 0x100;
        /// Limits bone influences per vertex.
        const LIMIT_BONE_WEIGHTS = 0x200;
        /// Validates the imported data structure.
        const VALIDATE_DATA_STRUCTURE = 0x400;
        /// Reorders triangles for vertex cache locality.
        const IMPROVE_CACHE_LOCALITY = 0x800;
        /// Removes redundant or unreferenced materials.
        const REMOVE_REDUNDANT_MATERIALS = 0x1000;
        /// Inverts normals facing inwards.
        const FIX_INFACING_NORMALS = 0x2000;
        /// Populates bone armature data.
        const POPULATE_ARMATURE_DATA = 0x4000;
        /// Splits meshes by primitive type.
        const SORT_BY_PTYPE = 0x8000;
        /// Detects degenerate primitives.
        const FIND_DEGENERATES = 0x10000;
        /// Removes or fixes invalid data such as zeroed normals.
        const FIND_INVALID_DATA = 0x20000;
        /// Converts non-UV mappings into UV channels.
        const GEN_UV_COORDS = 0x40000;
        /// Bakes UV transforms into the coordinates.
        const TRANSFORM_UV_COORDS = 0x80000;
        /// Replaces duplicate meshes by references.
        const FIND_INSTANCES = 0x100000;
        /// Reduces the number of meshes.
        const OPTIMIZE_MESHES = 0x200000;
        /// Collapses the node graph.
        const OPTIMIZE_GRAPH = 0x400000;
        /// Flips UV coordinates along the y-axis.
        const FLIP_UVS = 0x800000;
        /// Flips face winding order.
        const FLIP_WINDING_ORDER = 0x1000000;
        /// Splits meshes over the bone count limit.
        const SPLIT_BY_BONE_COUNT = 0x2000000;
        /// Removes bones losslessly or by threshold.
        const DEBONE = 0x4000000;
        /// Applies `AI_CONFIG_GLOBAL_SCALE_FACTOR_KEY`.
        const GLOBAL_SCALE = 0x8000000;
        /// Embeds external textures into the scene.
        const EMBED_TEXTURES = 0x10000000;
        /// Regenerates normals even when present.
        const FORCE_GEN_NORMALS = 0x20000000;
        /// Drops all normals.
        const DROP_NORMALS = 0x40000000;
        /// Computes per-mesh bounding boxes.
        const GEN_BOUNDING_BOXES = 0x80000000;
    }
}

impl PostProcessSteps {
    /// Raw value for the engine
    pub fn as_raw(self) -> u32 {
        self.bits()
    }

    /// Create from a raw engine value, dropping unknown bits
    pub fn from_raw(value: u32) -> Self {
        Self::from_bits_truncate(value)
    }

    /// Check for step combinations the engine rejects
    pub fn validate(&self) -> Result<(), String> {
        if self.contains(Self::GEN_SMOOTH_NORMALS) && self.contains(Self::GEN_NORMALS) {
            return Err("GEN_SMOOTH_NORMALS and GEN_NORMALS are incompatible".to_string());
        }

        if self.contains(Self::OPTIMIZE_GRAPH) && self.contains(Self::PRE_TRANSFORM_VERTICES) {
            return Err("OPTIMIZE_GRAPH and PRE_TRANSFORM_VERTICES are incompatible".to_string());
        }

        Ok(())
    }

    /// Same as [`validate`](Self::validate) but returns bool
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

/// Presets equivalent to Assimp's `aiProcessPreset_*` macros
impl PostProcessSteps {
    /// `aiProcess_ConvertToLeftHanded`
    pub const CONVERT_TO_LEFT_HANDED: Self = Self::from_bits_truncate(
        Self::MAKE_LEFT_HANDED.bits() | Self::FLIP_UVS.bits() | Self::FLIP_WINDING_ORDER.bits(),
    );

    /// `aiProcessPreset_TargetRealtime_Fast`
    pub const TARGET_REALTIME_FAST: Self = Self::from_bits_truncate(
        Self::CALC_TANGENT_SPACE.bits()
            | Self::GEN_NORMALS.bits()
            | Self::JOIN_IDENTICAL_VERTICES.bits()
            | Self::TRIANGULATE.bits()
            | Self::GEN_UV_COORDS.bits()
            | Self::SORT_BY_PTYPE.bits(),
    );

    /// `aiProcessPreset_TargetRealtime_Quality`
    pub const TARGET_REALTIME_QUALITY: Self = Self::from_bits_truncate(
        Self::CALC_TANGENT_SPACE.bits()
            | Self::GEN_SMOOTH_NORMALS.bits()
            | Self::JOIN_IDENTICAL_VERTICES.bits()
            | Self::IMPROVE_CACHE_LOCALITY.bits()
            | Self::LIMIT_BONE_WEIGHTS.bits()
            | Self::REMOVE_REDUNDANT_MATERIALS.bits()
            | Self::SPLIT_LARGE_MESHES.bits()
            | Self::TRIANGULATE.bits()
            | Self::GEN_UV_COORDS.bits()
            | Self::SORT_BY_PTYPE.bits()
            | Self::FIND_DEGENERATES.bits()
            | Self::FIND_INVALID_DATA.bits(),
    );

    /// `aiProcessPreset_TargetRealtime_MaxQuality`
    pub const TARGET_REALTIME_MAX_QUALITY: Self = Self::from_bits_truncate(
        Self::TARGET_REALTIME_QUALITY.bits()
            | Self::FIND_INSTANCES.bits()
            | Self::VALIDATE_DATA_STRUCTURE.bits()
            | Self::OPTIMIZE_MESHES.bits(),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_empty() {
        assert!(PostProcessSteps::default().is_empty());
        assert_eq!(PostProcessSteps::default().as_raw(), 0);
    }

    #[test]
    fn test_presets() {
        let fast = PostProcessSteps::TARGET_REALTIME_FAST;
        assert!(fast.contains(PostProcessSteps::TRIANGULATE));
        assert!(!fast.contains(PostProcessSteps::GEN_SMOOTH_NORMALS));

        let max = PostProcessSteps::TARGET_REALTIME_MAX_QUALITY;
        assert!(max.contains(PostProcessSteps::TARGET_REALTIME_QUALITY));
        assert!(max.contains(PostProcessSteps::VALIDATE_DATA_STRUCTURE));
        assert!(max.is_valid());

        assert_eq!(PostProcessSteps::CONVERT_TO_LEFT_HANDED.as_raw(), 0x1800004);
    }

    #[test]
    fn test_raw_values_match_assimp() {
        assert_eq!(PostProcessSteps::TRIANGULATE.as_raw(), 0x8);
        assert_eq!(PostProcessSteps::FLIP_UVS.as_raw(), 0x800000);
        assert_eq!(PostProcessSteps::GEN_BOUNDING_BOXES.as_raw(), 0x80000000);
        assert_eq!(
            PostProcessSteps::from_raw(0x8 | 0x2),
            PostProcessSteps::TRIANGULATE | PostProcessSteps::JOIN_IDENTICAL_VERTICES
        );
    }

    #[test]
    fn test_flag_validation() {
        let invalid = PostProcessSteps::GEN_SMOOTH_NORMALS | PostProcessSteps::GEN_NORMALS;
        assert!(!invalid.is_valid());

        let invalid = PostProcessSteps::OPTIMIZE_GRAPH | PostProcessSteps::PRE_TRANSFORM_VERTICES;
        assert!(invalid.validate().is_err());
    }
}
