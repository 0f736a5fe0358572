//! Conversion sessions
//!
//! A [`ConverterSession`] runs the conversion pipeline against a
//! [`SceneEngine`]:
//!
//! ```text
//! Idle -> Importing -> Transforming -> PostProcessing -> Validating
//!      -> ExportPreparing -> Exporting -> CleaningUp -> Idle
//! ```
//!
//! The whole pipeline, from source validation to the last release, runs under
//! the session lock, so conversions on one session never interleave. A failure
//! in any phase jumps straight to cleanup, which releases the export options,
//! detaches the log sinks and releases the scene, in that order.

use std::fmt;
use std::io::Read;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::{
    config::{ConfigPhase, ConfigSet, PropertyConfig},
    engine::{ImportedScene, SceneEngine},
    error::{Error, Result},
    exporter::ExportBlob,
    formats::{normalize_extension, ExportFormatDesc, FormatCapabilities},
    layout::SceneFlags,
    logging::{LogSink, LogSinkSet},
    patch::apply_root_transform,
    postprocess::PostProcessSteps,
    transform::TransformParameters,
};

/// Pipeline phase, reported in `tracing` events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConversionPhase {
    /// No conversion running
    Idle,
    /// Options materialized, engine importing without post-processing
    Importing,
    /// Composite transform patched into the root node
    Transforming,
    /// Engine post-processing with the caller's import steps
    PostProcessing,
    /// Scene completeness check
    Validating,
    /// Export options materialized
    ExportPreparing,
    /// Engine writing the destination
    Exporting,
    /// Releasing options, sinks and the scene
    CleaningUp,
}

impl ConversionPhase {
    fn advance(&mut self, next: ConversionPhase) {
        tracing::debug!(from = %self, to = %next, "conversion phase");
        *self = next;
    }
}

impl fmt::Display for ConversionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Importing => "importing",
            Self::Transforming => "transforming",
            Self::PostProcessing => "post-processing",
            Self::Validating => "validating",
            Self::ExportPreparing => "export-preparing",
            Self::Exporting => "exporting",
            Self::CleaningUp => "cleaning-up",
        };
        f.write_str(name)
    }
}

/// Where a scene is imported from
pub(crate) enum ImportSource<'a> {
    /// An existing file; the engine picks the importer from the extension
    File(&'a Path),
    /// A readable stream plus the extension of its format (`"obj"` or `".obj"`)
    Stream {
        /// Scene data
        reader: &'a mut dyn Read,
        /// Format extension
        format_hint: &'a str,
    },
}

impl<'a> ImportSource<'a> {
    /// Check the source before any resource is acquired; normalizes the hint
    fn resolve(self) -> Result<Self> {
        match self {
            Self::File(path) => {
                if path.as_os_str().is_empty() {
                    return Err(Error::invalid_input("source path is empty"));
                }
                if !path.is_file() {
                    return Err(Error::FileNotFound {
                        path: path.to_path_buf(),
                    });
                }
                Ok(Self::File(path))
            }
            Self::Stream {
                reader,
                format_hint,
            } => {
                let format_hint = normalize_extension(format_hint)
                    .ok_or_else(|| Error::invalid_input("stream format hint is empty"))?;
                Ok(Self::Stream {
                    reader,
                    format_hint,
                })
            }
        }
    }
}

impl fmt::Debug for ImportSource<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => f.debug_tuple("File").field(path).finish(),
            Self::Stream { format_hint, .. } => f
                .debug_struct("Stream")
                .field("format_hint", format_hint)
                .finish_non_exhaustive(),
        }
    }
}

/// Where an exported scene goes
#[derive(Debug, Clone, Copy)]
enum ExportTarget<'a> {
    File(&'a Path),
    Blob,
}

/// Transform and logging settings of a session
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SessionSettings {
    /// Uniform scale applied to the root node
    pub scale: f32,
    /// Rotation about X, in degrees
    pub rotation_x: f32,
    /// Rotation about Y, in degrees
    pub rotation_y: f32,
    /// Rotation about Z, in degrees
    pub rotation_z: f32,
    /// Verbose engine logging while converting
    pub verbose_logging: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            scale: 1.0,
            rotation_x: 0.0,
            rotation_y: 0.0,
            rotation_z: 0.0,
            verbose_logging: false,
        }
    }
}

#[derive(Debug, Default)]
struct SessionState {
    transform: TransformParameters,
    import_configs: ConfigSet,
    export_configs: ConfigSet,
    log_sinks: LogSinkSet,
    verbose_logging: bool,
}

impl SessionState {
    fn configs(&self, phase: ConfigPhase) -> &ConfigSet {
        match phase {
            ConfigPhase::Import => &self.import_configs,
            ConfigPhase::Export => &self.export_configs,
        }
    }

    fn configs_mut(&mut self, phase: ConfigPhase) -> &mut ConfigSet {
        match phase {
            ConfigPhase::Import => &mut self.import_configs,
            ConfigPhase::Export => &mut self.export_configs,
        }
    }
}

/// One request flowing through the pipeline
struct Request<'a> {
    source: ImportSource<'a>,
    import_steps: PostProcessSteps,
    target: ExportTarget<'a>,
    format_id: &'a str,
    export_steps: PostProcessSteps,
}

/// Serialized conversion pipeline over a shared engine.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use scene_converter::{ConverterSession, PostProcessSteps};
///
/// let session = ConverterSession::new(Arc::new(engine));
/// session.set_scale(0.01)?;
/// session.convert_file_to_file(
///     "model.fbx",
///     PostProcessSteps::TRIANGULATE,
///     "model.obj",
///     "obj",
///     PostProcessSteps::empty(),
/// )?;
/// ```
pub struct ConverterSession<E: SceneEngine> {
    engine: Arc<E>,
    state: Mutex<SessionState>,
    capabilities: FormatCapabilities,
    disposed: AtomicBool,
}

impl<E: SceneEngine> ConverterSession<E> {
    /// Create a session with unit scale, no rotation and quiet logging
    pub fn new(engine: Arc<E>) -> Self {
        Self::with_settings(engine, SessionSettings::default())
    }

    /// Create a session with the given settings
    pub fn with_settings(engine: Arc<E>, settings: SessionSettings) -> Self {
        let mut state = SessionState::default();
        Self::store_settings(&mut state, &settings);
        Self {
            engine,
            state: Mutex::new(state),
            capabilities: FormatCapabilities::new(),
            disposed: AtomicBool::new(false),
        }
    }

    /// The engine this session drives
    pub fn engine(&self) -> &Arc<E> {
        &self.engine
    }

    /// Tear the session down; every later call fails with [`Error::Disposed`]
    pub fn dispose(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if self.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        state.import_configs.remove_all();
        state.export_configs.remove_all();
        state.log_sinks.detach_all();
        tracing::debug!("converter session disposed");
    }

    /// Whether [`dispose`](Self::dispose) was called
    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    // ---- settings -------------------------------------------------------

    /// Current settings
    pub fn settings(&self) -> Result<SessionSettings> {
        let state = self.lock()?;
        Ok(SessionSettings {
            scale: state.transform.scale(),
            rotation_x: state.transform.rotation_x(),
            rotation_y: state.transform.rotation_y(),
            rotation_z: state.transform.rotation_z(),
            verbose_logging: state.verbose_logging,
        })
    }

    /// Replace all settings
    pub fn apply_settings(&self, settings: &SessionSettings) -> Result<()> {
        let mut state = self.lock()?;
        Self::store_settings(&mut state, settings);
        Ok(())
    }

    /// Uniform scale
    pub fn scale(&self) -> Result<f32> {
        Ok(self.lock()?.transform.scale())
    }

    /// Set the uniform scale.
    ///
    /// A scale within [`IDENTITY_EPSILON`](crate::transform::IDENTITY_EPSILON)
    /// of 1 with no rotation leaves the scene untouched.
    pub fn set_scale(&self, scale: f32) -> Result<()> {
        self.lock()?.transform.set_scale(scale);
        Ok(())
    }

    /// Rotation about X, in degrees
    pub fn rotation_x(&self) -> Result<f32> {
        Ok(self.lock()?.transform.rotation_x())
    }

    /// Set the rotation about X, in degrees
    pub fn set_rotation_x(&self, degrees: f32) -> Result<()> {
        self.lock()?.transform.set_rotation_x(degrees);
        Ok(())
    }

    /// Rotation about Y, in degrees
    pub fn rotation_y(&self) -> Result<f32> {
        Ok(self.lock()?.transform.rotation_y())
    }

    /// Set the rotation about Y, in degrees
    pub fn set_rotation_y(&self, degrees: f32) -> Result<()> {
        self.lock()?.transform.set_rotation_y(degrees);
        Ok(())
    }

    /// Rotation about Z, in degrees
    pub fn rotation_z(&self) -> Result<f32> {
        Ok(self.lock()?.transform.rotation_z())
    }

    /// Set the rotation about Z, in degrees
    pub fn set_rotation_z(&self, degrees: f32) -> Result<()> {
        self.lock()?.transform.set_rotation_z(degrees);
        Ok(())
    }

    /// Whether verbose engine logging is enabled during conversions
    pub fn verbose_logging(&self) -> Result<bool> {
        Ok(self.lock()?.verbose_logging)
    }

    /// Enable or disable verbose engine logging during conversions
    pub fn set_verbose_logging(&self, enable: bool) -> Result<()> {
        self.lock()?.verbose_logging = enable;
        Ok(())
    }

    // ---- configuration --------------------------------------------------

    /// Add or replace an option of `phase`
    pub fn set_property(&self, phase: ConfigPhase, config: Arc<dyn PropertyConfig>) -> Result<()> {
        self.lock()?.configs_mut(phase).set(config);
        Ok(())
    }

    /// Remove an option of `phase`; returns whether it was present
    pub fn remove_property(&self, phase: ConfigPhase, name: &str) -> Result<bool> {
        Ok(self.lock()?.configs_mut(phase).remove(name))
    }

    /// Remove every option of `phase`
    pub fn remove_all_properties(&self, phase: ConfigPhase) -> Result<()> {
        self.lock()?.configs_mut(phase).remove_all();
        Ok(())
    }

    /// Whether `phase` has an option with this name
    pub fn contains_property(&self, phase: ConfigPhase, name: &str) -> Result<bool> {
        Ok(self.lock()?.configs(phase).contains(name))
    }

    /// Option names of `phase`
    pub fn property_names(&self, phase: ConfigPhase) -> Result<Vec<String>> {
        Ok(self.lock()?.configs(phase).names())
    }

    // ---- log sinks ------------------------------------------------------

    /// Add a log sink; returns false if it is already attached
    pub fn attach_log_sink(&self, sink: Arc<dyn LogSink>) -> Result<bool> {
        Ok(self.lock()?.log_sinks.attach(sink))
    }

    /// Remove a log sink; returns false if it was not attached
    pub fn detach_log_sink(&self, sink: &Arc<dyn LogSink>) -> Result<bool> {
        Ok(self.lock()?.log_sinks.detach(sink))
    }

    /// Remove every log sink
    pub fn detach_all_log_sinks(&self) -> Result<()> {
        self.lock()?.log_sinks.detach_all();
        Ok(())
    }

    /// Attached log sinks
    pub fn log_sinks(&self) -> Result<Vec<Arc<dyn LogSink>>> {
        Ok(self.lock()?.log_sinks.sinks().to_vec())
    }

    // ---- format capabilities --------------------------------------------

    /// Export formats supported by the engine
    pub fn supported_export_formats(&self) -> Result<Vec<ExportFormatDesc>> {
        self.ensure_alive()?;
        Ok(self.capabilities.export_formats(&*self.engine))
    }

    /// Import extensions supported by the engine, with leading dot
    pub fn supported_import_extensions(&self) -> Result<Vec<String>> {
        self.ensure_alive()?;
        Ok(self.capabilities.import_extensions(&*self.engine))
    }

    /// Whether an export format exists for this extension (`"obj"` or `".obj"`)
    pub fn is_export_format_supported(&self, extension: &str) -> Result<bool> {
        self.ensure_alive()?;
        Ok(self
            .capabilities
            .is_export_format_supported(&*self.engine, extension))
    }

    /// Whether files with this extension can be imported (`"obj"` or `".obj"`)
    pub fn is_import_format_supported(&self, extension: &str) -> Result<bool> {
        self.ensure_alive()?;
        Ok(self
            .capabilities
            .is_import_format_supported(&*self.engine, extension))
    }

    // ---- conversions ----------------------------------------------------

    /// Convert a file into another file
    pub fn convert_file_to_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input: P,
        import_steps: PostProcessSteps,
        output: Q,
        format_id: &str,
        export_steps: PostProcessSteps,
    ) -> Result<()> {
        self.convert(Request {
            source: ImportSource::File(input.as_ref()),
            import_steps,
            target: ExportTarget::File(output.as_ref()),
            format_id,
            export_steps,
        })
        .map(drop)
    }

    /// Convert a file into an in-memory blob
    pub fn convert_file_to_blob<P: AsRef<Path>>(
        &self,
        input: P,
        import_steps: PostProcessSteps,
        format_id: &str,
        export_steps: PostProcessSteps,
    ) -> Result<ExportBlob> {
        self.convert(Request {
            source: ImportSource::File(input.as_ref()),
            import_steps,
            target: ExportTarget::Blob,
            format_id,
            export_steps,
        })?
        .ok_or_else(|| Error::export_failed("engine produced no blob"))
    }

    /// Convert a stream into a file
    pub fn convert_stream_to_file<Q: AsRef<Path>>(
        &self,
        input: &mut dyn Read,
        format_hint: &str,
        import_steps: PostProcessSteps,
        output: Q,
        format_id: &str,
        export_steps: PostProcessSteps,
    ) -> Result<()> {
        self.convert(Request {
            source: ImportSource::Stream {
                reader: input,
                format_hint,
            },
            import_steps,
            target: ExportTarget::File(output.as_ref()),
            format_id,
            export_steps,
        })
        .map(drop)
    }

    /// Convert a stream into an in-memory blob
    pub fn convert_stream_to_blob(
        &self,
        input: &mut dyn Read,
        format_hint: &str,
        import_steps: PostProcessSteps,
        format_id: &str,
        export_steps: PostProcessSteps,
    ) -> Result<ExportBlob> {
        self.convert(Request {
            source: ImportSource::Stream {
                reader: input,
                format_hint,
            },
            import_steps,
            target: ExportTarget::Blob,
            format_id,
            export_steps,
        })?
        .ok_or_else(|| Error::export_failed("engine produced no blob"))
    }

    /// Import, transform, post-process and validate a file, keeping the scene
    pub fn import_file<P: AsRef<Path>>(
        &self,
        path: P,
        steps: PostProcessSteps,
    ) -> Result<ImportedScene<E>> {
        self.import(ImportSource::File(path.as_ref()), steps)
    }

    /// Import, transform, post-process and validate a stream, keeping the scene
    pub fn import_stream(
        &self,
        reader: &mut dyn Read,
        format_hint: &str,
        steps: PostProcessSteps,
    ) -> Result<ImportedScene<E>> {
        self.import(
            ImportSource::Stream {
                reader,
                format_hint,
            },
            steps,
        )
    }

    /// Export a previously imported scene to a file
    pub fn export_file<P: AsRef<Path>>(
        &self,
        scene: &ImportedScene<E>,
        format_id: &str,
        path: P,
        steps: PostProcessSteps,
    ) -> Result<()> {
        self.export(scene, ExportTarget::File(path.as_ref()), format_id, steps)
            .map(drop)
    }

    /// Export a previously imported scene to memory
    pub fn export_to_blob(
        &self,
        scene: &ImportedScene<E>,
        format_id: &str,
        steps: PostProcessSteps,
    ) -> Result<ExportBlob> {
        self.export(scene, ExportTarget::Blob, format_id, steps)?
            .ok_or_else(|| Error::export_failed("engine produced no blob"))
    }

    // ---- pipeline -------------------------------------------------------

    fn convert(&self, request: Request<'_>) -> Result<Option<ExportBlob>> {
        let mut state = self.lock()?;
        let source = request.source.resolve()?;
        check_steps(request.import_steps)?;
        check_steps(request.export_steps)?;

        let _span = tracing::debug_span!("convert", format_id = request.format_id).entered();
        let mut phase = ConversionPhase::Idle;
        // Declared before the sink guard so the scene is released after the sinks detach.
        let mut scene: Option<ImportedScene<E>> = None;

        let outcome = {
            phase.advance(ConversionPhase::Importing);
            self.engine.enable_verbose_logging(state.verbose_logging);
            let _sinks = state.log_sinks.attach_to(&*self.engine);

            let outcome = self
                .import_phases(&mut state, source, request.import_steps, &mut scene, &mut phase)
                .and_then(|()| {
                    let imported = scene
                        .as_ref()
                        .ok_or_else(|| Error::import_failed("engine returned no scene"))?;
                    self.export_phases(
                        &state,
                        imported,
                        request.target,
                        request.format_id,
                        request.export_steps,
                        &mut phase,
                    )
                });
            if let Err(err) = &outcome {
                tracing::warn!(%phase, error = %err, "conversion failed");
            }
            phase.advance(ConversionPhase::CleaningUp);
            outcome
        };
        drop(scene);
        phase.advance(ConversionPhase::Idle);
        outcome
    }

    fn import(&self, source: ImportSource<'_>, steps: PostProcessSteps) -> Result<ImportedScene<E>> {
        let mut state = self.lock()?;
        let source = source.resolve()?;
        check_steps(steps)?;

        let _span = tracing::debug_span!("import").entered();
        let mut phase = ConversionPhase::Idle;
        let mut scene: Option<ImportedScene<E>> = None;

        let outcome = {
            phase.advance(ConversionPhase::Importing);
            self.engine.enable_verbose_logging(state.verbose_logging);
            let _sinks = state.log_sinks.attach_to(&*self.engine);

            let outcome = self.import_phases(&mut state, source, steps, &mut scene, &mut phase);
            if let Err(err) = &outcome {
                tracing::warn!(%phase, error = %err, "import failed");
            }
            phase.advance(ConversionPhase::CleaningUp);
            outcome
        };
        outcome?;
        phase.advance(ConversionPhase::Idle);
        scene.ok_or_else(|| Error::import_failed("engine returned no scene"))
    }

    fn export(
        &self,
        scene: &ImportedScene<E>,
        target: ExportTarget<'_>,
        format_id: &str,
        steps: PostProcessSteps,
    ) -> Result<Option<ExportBlob>> {
        let state = self.lock()?;
        if !Arc::ptr_eq(scene.engine(), &self.engine) {
            return Err(Error::invalid_input(
                "scene was imported by a different engine",
            ));
        }
        check_steps(steps)?;

        let _span = tracing::debug_span!("export", format_id).entered();
        let mut phase = ConversionPhase::Idle;
        self.engine.enable_verbose_logging(state.verbose_logging);
        let _sinks = state.log_sinks.attach_to(&*self.engine);

        let outcome = self.export_phases(&state, scene, target, format_id, steps, &mut phase);
        if let Err(err) = &outcome {
            tracing::warn!(%phase, error = %err, "export failed");
        }
        phase.advance(ConversionPhase::CleaningUp);
        outcome
    }

    /// Importing through Validating. The import options are released on
    /// return, whatever the outcome; the scene stays in `slot`.
    fn import_phases(
        &self,
        state: &mut SessionState,
        source: ImportSource<'_>,
        steps: PostProcessSteps,
        slot: &mut Option<ImportedScene<E>>,
        phase: &mut ConversionPhase,
    ) -> Result<()> {
        let mut import_configs = state.import_configs.materialize(ConfigPhase::Import)?;

        // Post-processing is deferred until the root transform is patched.
        let raw = match source {
            ImportSource::File(path) => {
                self.engine
                    .import_file(path, PostProcessSteps::empty(), import_configs.store())
            }
            ImportSource::Stream {
                reader,
                format_hint,
            } => self.engine.import_stream(
                reader,
                format_hint,
                PostProcessSteps::empty(),
                import_configs.store(),
            ),
        }
        .map_err(|failure| Error::import_failed(failure.message))?;
        let imported = slot.insert(ImportedScene::new(Arc::clone(&self.engine), raw));

        phase.advance(ConversionPhase::Transforming);
        let layout = self.engine.scene_layout();
        let composite = state.transform.composite();
        let outcome = apply_root_transform(imported.scene_mut(), &layout, &composite);
        tracing::debug!(?outcome, "root transform");

        phase.advance(ConversionPhase::PostProcessing);
        self.engine
            .apply_post_processing(imported.scene_mut(), steps)
            .map_err(|failure| Error::import_failed(failure.message))?;

        phase.advance(ConversionPhase::Validating);
        let flags = layout
            .read_flags(imported.scene())
            .map_err(|err| Error::import_failed(format!("scene flags unreadable: {err}")))?;
        if flags.contains(SceneFlags::INCOMPLETE) {
            return Err(Error::import_failed(format!(
                "scene is incomplete: {}",
                self.engine.error_string()
            )));
        }

        import_configs.release();
        Ok(())
    }

    /// ExportPreparing and Exporting. The export options are released on return.
    fn export_phases(
        &self,
        state: &SessionState,
        scene: &ImportedScene<E>,
        target: ExportTarget<'_>,
        format_id: &str,
        steps: PostProcessSteps,
        phase: &mut ConversionPhase,
    ) -> Result<Option<ExportBlob>> {
        phase.advance(ConversionPhase::ExportPreparing);
        let mut export_configs = state.export_configs.materialize(ConfigPhase::Export)?;

        phase.advance(ConversionPhase::Exporting);
        let exported = match target {
            ExportTarget::File(path) => self
                .engine
                .export_file(scene.scene(), format_id, path, steps, export_configs.store())
                .map(|()| None),
            ExportTarget::Blob => self
                .engine
                .export_blob(scene.scene(), format_id, steps, export_configs.store())
                .map(Some),
        }
        .map_err(|failure| Error::export_failed(failure.message));

        export_configs.release();
        exported
    }

    // ---- helpers --------------------------------------------------------

    fn lock(&self) -> Result<MutexGuard<'_, SessionState>> {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if self.is_disposed() {
            return Err(Error::Disposed);
        }
        Ok(state)
    }

    fn ensure_alive(&self) -> Result<()> {
        if self.is_disposed() {
            Err(Error::Disposed)
        } else {
            Ok(())
        }
    }

    fn store_settings(state: &mut SessionState, settings: &SessionSettings) {
        state.transform.set_scale(settings.scale);
        state.transform.set_rotation_x(settings.rotation_x);
        state.transform.set_rotation_y(settings.rotation_y);
        state.transform.set_rotation_z(settings.rotation_z);
        state.verbose_logging = settings.verbose_logging;
    }
}

impl<E: SceneEngine> fmt::Debug for ConverterSession<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConverterSession")
            .field("disposed", &self.is_disposed())
            .finish_non_exhaustive()
    }
}

fn check_steps(steps: PostProcessSteps) -> Result<()> {
    steps.validate().map_err(Error::invalid_input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_display() {
        assert_eq!(ConversionPhase::PostProcessing.to_string(), "post-processing");
        assert_eq!(ConversionPhase::CleaningUp.to_string(), "cleaning-up");
    }

    #[test]
    fn test_missing_file_is_rejected() {
        let err = ImportSource::File(Path::new("definitely/not/here.obj"))
            .resolve()
            .unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }

    #[test]
    fn test_empty_path_is_rejected() {
        let err = ImportSource::File(Path::new("")).resolve().unwrap_err();
        assert!(matches!(err, Error::InvalidInput { .. }));
    }

    #[test]
    fn test_stream_hint_is_normalized() {
        let mut data: &[u8] = b"v 0 0 0";
        let source = ImportSource::Stream {
            reader: &mut data,
            format_hint: ".obj",
        }
        .resolve()
        .unwrap();
        match source {
            ImportSource::Stream { format_hint, .. } => assert_eq!(format_hint, "obj"),
            ImportSource::File(_) => panic!("expected a stream source"),
        }

        let mut data: &[u8] = b"";
        for hint in ["", "."] {
            let err = ImportSource::Stream {
                reader: &mut data,
                format_hint: hint,
            }
            .resolve()
            .unwrap_err();
            assert!(err.is_invalid_input());
        }
    }

    #[test]
    fn test_default_settings() {
        let settings = SessionSettings::default();
        assert_eq!(settings.scale, 1.0);
        assert!(!settings.verbose_logging);
    }

    #[test]
    fn test_incompatible_steps_are_invalid_input() {
        let err = check_steps(PostProcessSteps::GEN_NORMALS | PostProcessSteps::GEN_SMOOTH_NORMALS)
            .unwrap_err();
        assert!(err.is_invalid_input());
    }
}
