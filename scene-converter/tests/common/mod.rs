//! Shared helpers for integration tests: a recording in-memory engine
//!
//! The fake format is `FAKE` + 16 native-endian row-major `f32`s (the root
//! transform) + an opaque payload. Exports write the same layout, so the
//! transform the session patched into scene memory is visible in the output.

#![allow(dead_code)]

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use scene_converter::{
    EngineFailure, EngineResult, ExportBlob, ExportFormatDesc, LayoutError, LogSink, Matrix4x4,
    PostProcessSteps, PropertyStore, PropertyValue, SceneArena, SceneBuffer, SceneEngine,
    SceneFlags, SceneLayout,
};

pub const MAGIC: &[u8; 4] = b"FAKE";

/// Everything the engine was asked to do, in order
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Verbose(bool),
    AttachSink,
    DetachSink,
    Import {
        hint: Option<String>,
        steps: PostProcessSteps,
        properties: Vec<(String, PropertyValue)>,
    },
    PostProcess {
        scene: usize,
        steps: PostProcessSteps,
    },
    Export {
        scene: usize,
        format_id: String,
        steps: PostProcessSteps,
        properties: Vec<(String, PropertyValue)>,
    },
    Release {
        scene: usize,
    },
    QueryExportFormats,
    QueryImportExtensions,
}

/// Failure knobs
#[derive(Debug, Clone, Default)]
pub struct Knobs {
    pub fail_import: bool,
    pub incomplete: bool,
    pub fail_post_processing: bool,
    pub fail_export: bool,
    pub null_root: bool,
    pub import_delay: Option<Duration>,
}

#[derive(Debug)]
pub struct FakeScene {
    pub id: usize,
    pub arena: SceneArena,
    pub payload: Vec<u8>,
}

impl SceneBuffer for FakeScene {
    fn base_address(&self) -> usize {
        self.arena.base_address()
    }

    fn read_bytes(&self, address: usize, out: &mut [u8]) -> Result<(), LayoutError> {
        self.arena.read_bytes(address, out)
    }

    fn write_bytes(&mut self, address: usize, bytes: &[u8]) -> Result<(), LayoutError> {
        self.arena.write_bytes(address, bytes)
    }
}

#[derive(Default)]
pub struct FakeEngine {
    events: Mutex<Vec<Event>>,
    knobs: Mutex<Knobs>,
    sinks: Mutex<Vec<Arc<dyn LogSink>>>,
    next_id: AtomicUsize,
    live: AtomicUsize,
}

impl FakeEngine {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_knobs(knobs: Knobs) -> Arc<Self> {
        let engine = Self::default();
        *engine.knobs.lock().unwrap() = knobs;
        Arc::new(engine)
    }

    pub fn set_knobs(&self, knobs: Knobs) {
        *self.knobs.lock().unwrap() = knobs;
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn clear_events(&self) {
        self.events.lock().unwrap().clear();
    }

    /// Scenes imported and not yet released
    pub fn live_scenes(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    pub fn attached_sinks(&self) -> usize {
        self.sinks.lock().unwrap().len()
    }

    fn record(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }

    fn log(&self, message: &str) {
        for sink in self.sinks.lock().unwrap().iter() {
            sink.log(message);
        }
    }

    fn import_bytes(
        &self,
        bytes: &[u8],
        hint: Option<String>,
        steps: PostProcessSteps,
        properties: &PropertyStore,
    ) -> EngineResult<FakeScene> {
        let knobs = self.knobs.lock().unwrap().clone();
        self.record(Event::Import {
            hint,
            steps,
            properties: properties.properties().to_vec(),
        });
        self.log("Info,  T0: Load scene");
        if let Some(delay) = knobs.import_delay {
            std::thread::sleep(delay);
        }
        if knobs.fail_import {
            self.log("Error, T0: import failed");
            return Err(EngineFailure::new("fake import failure"));
        }
        let (transform, payload) =
            decode(bytes).ok_or_else(|| EngineFailure::new("not a FAKE scene"))?;

        let mut arena = SceneArena::new(SceneLayout::NATIVE, "root", transform)
            .map_err(|e| EngineFailure::new(e.to_string()))?;
        if knobs.incomplete {
            arena.set_flags(SceneFlags::INCOMPLETE);
        }
        if knobs.null_root {
            arena.clear_root();
        }
        self.live.fetch_add(1, Ordering::SeqCst);
        Ok(FakeScene {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            arena,
            payload,
        })
    }

    fn check_format(format_id: &str) -> EngineResult<()> {
        match format_id {
            "fake" | "obj" => Ok(()),
            other => Err(EngineFailure::new(format!("no exporter for {other}"))),
        }
    }
}

impl SceneEngine for FakeEngine {
    type Scene = FakeScene;

    fn import_file(
        &self,
        path: &Path,
        steps: PostProcessSteps,
        properties: &PropertyStore,
    ) -> EngineResult<FakeScene> {
        let bytes = std::fs::read(path).map_err(|e| EngineFailure::new(e.to_string()))?;
        self.import_bytes(&bytes, None, steps, properties)
    }

    fn import_stream(
        &self,
        stream: &mut dyn Read,
        format_hint: &str,
        steps: PostProcessSteps,
        properties: &PropertyStore,
    ) -> EngineResult<FakeScene> {
        let mut bytes = Vec::new();
        stream
            .read_to_end(&mut bytes)
            .map_err(|e| EngineFailure::new(e.to_string()))?;
        self.import_bytes(&bytes, Some(format_hint.to_string()), steps, properties)
    }

    fn apply_post_processing(
        &self,
        scene: &mut FakeScene,
        steps: PostProcessSteps,
    ) -> EngineResult<()> {
        self.record(Event::PostProcess {
            scene: scene.id,
            steps,
        });
        if self.knobs.lock().unwrap().fail_post_processing {
            return Err(EngineFailure::new("fake post-processing failure"));
        }
        Ok(())
    }

    fn export_file(
        &self,
        scene: &FakeScene,
        format_id: &str,
        path: &Path,
        steps: PostProcessSteps,
        properties: &PropertyStore,
    ) -> EngineResult<()> {
        let blob = self.export_blob(scene, format_id, steps, properties)?;
        std::fs::write(path, blob.data()).map_err(|e| EngineFailure::new(e.to_string()))
    }

    fn export_blob(
        &self,
        scene: &FakeScene,
        format_id: &str,
        steps: PostProcessSteps,
        properties: &PropertyStore,
    ) -> EngineResult<ExportBlob> {
        self.record(Event::Export {
            scene: scene.id,
            format_id: format_id.to_string(),
            steps,
            properties: properties.properties().to_vec(),
        });
        if self.knobs.lock().unwrap().fail_export {
            return Err(EngineFailure::new("fake export failure"));
        }
        Self::check_format(format_id)?;

        let mut data = MAGIC.to_vec();
        data.extend_from_slice(scene.arena.transform_bytes());
        data.extend_from_slice(&scene.payload);
        let mut blob = ExportBlob::new("", data);
        if format_id == "obj" {
            blob.push(ExportBlob::new("mtl", b"newmtl default".to_vec()));
        }
        Ok(blob)
    }

    fn release_scene(&self, scene: FakeScene) {
        self.record(Event::Release { scene: scene.id });
        self.live.fetch_sub(1, Ordering::SeqCst);
    }

    fn error_string(&self) -> String {
        "fake scene is incomplete".to_string()
    }

    fn enable_verbose_logging(&self, enable: bool) {
        self.record(Event::Verbose(enable));
    }

    fn attach_log_sink(&self, sink: &Arc<dyn LogSink>) {
        self.record(Event::AttachSink);
        self.sinks.lock().unwrap().push(Arc::clone(sink));
    }

    fn detach_log_sink(&self, sink: &Arc<dyn LogSink>) {
        self.record(Event::DetachSink);
        self.sinks.lock().unwrap().retain(|s| !Arc::ptr_eq(s, sink));
    }

    fn export_formats(&self) -> Vec<ExportFormatDesc> {
        self.record(Event::QueryExportFormats);
        vec![
            ExportFormatDesc::new("fake", "Fake scene", "fake"),
            ExportFormatDesc::new("obj", "Wavefront OBJ format", "obj"),
        ]
    }

    fn import_extensions(&self) -> Vec<String> {
        self.record(Event::QueryImportExtensions);
        vec![".fake".to_string(), ".obj".to_string()]
    }
}

/// Encode a fake scene
pub fn encode(transform: &Matrix4x4, payload: &[u8]) -> Vec<u8> {
    let mut bytes = MAGIC.to_vec();
    let rows = transform.transpose().to_cols_array();
    for value in rows {
        bytes.extend_from_slice(&value.to_ne_bytes());
    }
    bytes.extend_from_slice(payload);
    bytes
}

/// Decode a fake scene into its root transform and payload
pub fn decode(bytes: &[u8]) -> Option<(Matrix4x4, Vec<u8>)> {
    let rest = bytes.strip_prefix(MAGIC.as_slice())?;
    if rest.len() < 64 {
        return None;
    }
    let (matrix, payload) = rest.split_at(64);
    let mut rows = [0f32; 16];
    for (value, chunk) in rows.iter_mut().zip(matrix.chunks_exact(4)) {
        *value = f32::from_ne_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
    Some((Matrix4x4::from_cols_array(&rows).transpose(), payload.to_vec()))
}

/// Write a fake scene file and return its path
pub fn write_scene(dir: &Path, name: &str, transform: &Matrix4x4, payload: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, encode(transform, payload)).unwrap();
    path
}

/// Route `tracing` output to the test harness; honours `RUST_LOG`
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Assert two matrices match element-wise
pub fn assert_matrix_eq(actual: &Matrix4x4, expected: &Matrix4x4) {
    for (a, e) in actual
        .to_cols_array()
        .iter()
        .zip(expected.to_cols_array().iter())
    {
        approx::assert_relative_eq!(*a, *e, epsilon = 1e-5, max_relative = 1e-4);
    }
}
