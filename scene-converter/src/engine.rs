//! Boundary to the external scene import/export engine
//!
//! The orchestrator drives everything through [`SceneEngine`]; it never talks
//! to a global engine instance. Sessions share an engine by holding the same
//! `Arc<E>`. Verbose logging and log sink attachment are engine-wide state in
//! Assimp, so sessions sharing one engine observe each other's settings while
//! a conversion runs.

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use crate::{
    config::PropertyStore,
    error::EngineFailure,
    exporter::ExportBlob,
    formats::ExportFormatDesc,
    layout::{SceneBuffer, SceneLayout},
    logging::LogSink,
    postprocess::PostProcessSteps,
};

/// Result of an engine call
pub type EngineResult<T> = std::result::Result<T, EngineFailure>;

/// An engine that parses and writes scene files.
///
/// Scenes are owned by the engine: every scene returned from an import is
/// handed back exactly once through [`release_scene`](Self::release_scene).
pub trait SceneEngine: Send + Sync {
    /// Engine-owned scene handle
    type Scene: SceneBuffer + Send;

    /// Layout of the scene memory behind [`Self::Scene`]
    fn scene_layout(&self) -> SceneLayout {
        SceneLayout::NATIVE
    }

    /// Import a scene from a file
    fn import_file(
        &self,
        path: &Path,
        steps: PostProcessSteps,
        properties: &PropertyStore,
    ) -> EngineResult<Self::Scene>;

    /// Import a scene from a stream; `format_hint` is an extension without the dot
    fn import_stream(
        &self,
        stream: &mut dyn Read,
        format_hint: &str,
        steps: PostProcessSteps,
        properties: &PropertyStore,
    ) -> EngineResult<Self::Scene>;

    /// Run post-processing steps on an imported scene, in place
    fn apply_post_processing(
        &self,
        scene: &mut Self::Scene,
        steps: PostProcessSteps,
    ) -> EngineResult<()>;

    /// Write a scene to a file
    fn export_file(
        &self,
        scene: &Self::Scene,
        format_id: &str,
        path: &Path,
        steps: PostProcessSteps,
        properties: &PropertyStore,
    ) -> EngineResult<()>;

    /// Write a scene to memory
    fn export_blob(
        &self,
        scene: &Self::Scene,
        format_id: &str,
        steps: PostProcessSteps,
        properties: &PropertyStore,
    ) -> EngineResult<ExportBlob>;

    /// Hand a scene back to the engine
    fn release_scene(&self, scene: Self::Scene);

    /// Most recent diagnostic text of the engine (`aiGetErrorString`)
    fn error_string(&self) -> String;

    /// Toggle verbose engine logging (engine-wide)
    fn enable_verbose_logging(&self, enable: bool);

    /// Route engine log output to `sink` (engine-wide)
    fn attach_log_sink(&self, sink: &Arc<dyn LogSink>);

    /// Stop routing engine log output to `sink`
    fn detach_log_sink(&self, sink: &Arc<dyn LogSink>);

    /// Formats the engine can export
    fn export_formats(&self) -> Vec<ExportFormatDesc>;

    /// File extensions the engine can import, with a leading dot
    fn import_extensions(&self) -> Vec<String>;
}

/// Scene handle that is released back to its engine exactly once, on drop.
pub struct ImportedScene<E: SceneEngine> {
    engine: Arc<E>,
    scene: Option<E::Scene>,
}

impl<E: SceneEngine> ImportedScene<E> {
    pub(crate) fn new(engine: Arc<E>, scene: E::Scene) -> Self {
        Self {
            engine,
            scene: Some(scene),
        }
    }

    /// Borrow the engine scene
    pub fn scene(&self) -> &E::Scene {
        self.scene
            .as_ref()
            .unwrap_or_else(|| unreachable!("scene is only taken on drop"))
    }

    /// Mutably borrow the engine scene
    pub fn scene_mut(&mut self) -> &mut E::Scene {
        self.scene
            .as_mut()
            .unwrap_or_else(|| unreachable!("scene is only taken on drop"))
    }

    /// Engine that owns the scene
    pub fn engine(&self) -> &Arc<E> {
        &self.engine
    }
}

impl<E: SceneEngine> std::fmt::Debug for ImportedScene<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImportedScene")
            .field("released", &self.scene.is_none())
            .finish()
    }
}

impl<E: SceneEngine> Drop for ImportedScene<E> {
    fn drop(&mut self) {
        if let Some(scene) = self.scene.take() {
            self.engine.release_scene(scene);
            tracing::trace!("released scene");
        }
    }
}
