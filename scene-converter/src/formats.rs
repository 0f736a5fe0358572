//! Supported formats, queried once from the engine and cached

use std::sync::OnceLock;

use crate::engine::SceneEngine;

/// Description of an export format
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFormatDesc {
    /// Format identifier passed to export calls
    pub id: String,
    /// Human-readable description
    pub description: String,
    /// File extension, without the dot
    pub file_extension: String,
}

impl ExportFormatDesc {
    /// Create a format description
    pub fn new<I, D, X>(id: I, description: D, file_extension: X) -> Self
    where
        I: Into<String>,
        D: Into<String>,
        X: Into<String>,
    {
        Self {
            id: id.into(),
            description: description.into(),
            file_extension: file_extension.into(),
        }
    }
}

/// Import extensions and export formats of an engine, fetched on first use.
#[derive(Debug, Default)]
pub struct FormatCapabilities {
    export_formats: OnceLock<Vec<ExportFormatDesc>>,
    import_extensions: OnceLock<Vec<String>>,
}

impl FormatCapabilities {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Export formats (a copy of the cached list)
    pub fn export_formats<E: SceneEngine + ?Sized>(&self, engine: &E) -> Vec<ExportFormatDesc> {
        self.cached_export_formats(engine).to_vec()
    }

    /// Import extensions, with leading dot (a copy of the cached list)
    pub fn import_extensions<E: SceneEngine + ?Sized>(&self, engine: &E) -> Vec<String> {
        self.cached_import_extensions(engine).to_vec()
    }

    /// Whether some export format has this file extension (`"obj"` or `".obj"`)
    pub fn is_export_format_supported<E: SceneEngine + ?Sized>(
        &self,
        engine: &E,
        extension: &str,
    ) -> bool {
        let Some(extension) = normalize_extension(extension) else {
            return false;
        };
        self.cached_export_formats(engine)
            .iter()
            .any(|desc| normalize_extension(&desc.file_extension) == Some(extension))
    }

    /// Whether files with this extension can be imported (`"obj"` or `".obj"`)
    pub fn is_import_format_supported<E: SceneEngine + ?Sized>(
        &self,
        engine: &E,
        extension: &str,
    ) -> bool {
        let Some(extension) = normalize_extension(extension) else {
            return false;
        };
        self.cached_import_extensions(engine)
            .iter()
            .any(|ext| normalize_extension(ext) == Some(extension))
    }

    fn cached_export_formats<E: SceneEngine + ?Sized>(&self, engine: &E) -> &[ExportFormatDesc] {
        self.export_formats.get_or_init(|| {
            let formats = engine.export_formats();
            tracing::debug!(count = formats.len(), "cached export formats");
            formats
        })
    }

    fn cached_import_extensions<E: SceneEngine + ?Sized>(&self, engine: &E) -> &[String] {
        self.import_extensions.get_or_init(|| {
            let extensions = engine.import_extensions();
            tracing::debug!(count = extensions.len(), "cached import extensions");
            extensions
        })
    }
}

/// Strip one leading `.`; `None` for empty input
pub(crate) fn normalize_extension(extension: &str) -> Option<&str> {
    let trimmed = extension.strip_prefix('.').unwrap_or(extension);
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Parse an extension list such as `"*.3ds;*.obj;*.dae"` into `[".3ds", ".obj", ".dae"]`
pub fn parse_extension_list(list: &str) -> Vec<String> {
    list.split(';')
        .filter_map(|ext| ext.trim().strip_prefix('*'))
        .filter(|ext| ext.starts_with('.') && ext.len() > 1)
        .map(str::to_string)
        .collect()
}

/// Common export format identifiers
pub mod format_ids {
    /// Wavefront OBJ format
    pub const OBJ: &str = "obj";
    /// COLLADA format
    pub const COLLADA: &str = "collada";
    /// Stanford PLY format
    pub const PLY: &str = "ply";
    /// STL format
    pub const STL: &str = "stl";
    /// Binary STL format
    pub const STL_BINARY: &str = "stlb";
    /// glTF 2.0 format
    pub const GLTF2: &str = "gltf2";
    /// glTF 2.0 binary format
    pub const GLB2: &str = "glb2";
    /// Autodesk FBX format
    pub const FBX: &str = "fbx";
    /// 3D Studio Max 3DS format
    pub const _3DS: &str = "3ds";
    /// X3D format
    pub const X3D: &str = "x3d";
    /// Assimp binary dump
    pub const ASSBIN: &str = "assbin";
}
