//! Session settings, option sets, log sinks and disposal

mod common;

use std::sync::Arc;

use common::{write_scene, FakeEngine};
use scene_converter::{
    property_keys, ConfigPhase, ConverterSession, Error, LogSink, Matrix4x4, MemoryLogSink,
    PostProcessSteps, Property, SessionSettings, TracingLogSink,
};

#[test]
fn test_settings_round_trip() {
    let session = ConverterSession::new(FakeEngine::new());
    assert_eq!(session.settings().unwrap(), SessionSettings::default());

    let settings = SessionSettings {
        scale: 0.01,
        rotation_x: -90.0,
        rotation_y: 0.0,
        rotation_z: 45.0,
        verbose_logging: true,
    };
    session.apply_settings(&settings).unwrap();
    assert_eq!(session.settings().unwrap(), settings);
    assert_eq!(session.scale().unwrap(), 0.01);
    assert_eq!(session.rotation_x().unwrap(), -90.0);
    assert_eq!(session.rotation_z().unwrap(), 45.0);
    assert!(session.verbose_logging().unwrap());

    let configured = ConverterSession::with_settings(FakeEngine::new(), settings);
    assert_eq!(configured.settings().unwrap(), settings);
}

#[test]
fn test_option_sets_are_per_phase() {
    let session = ConverterSession::new(FakeEngine::new());
    session
        .set_property(
            ConfigPhase::Import,
            Arc::new(Property::boolean(property_keys::FBX_PRESERVE_PIVOTS, false)),
        )
        .unwrap();
    session
        .set_property(
            ConfigPhase::Import,
            Arc::new(Property::integer(property_keys::LIMIT_BONE_WEIGHTS_MAX, 4)),
        )
        .unwrap();

    assert!(session
        .contains_property(ConfigPhase::Import, property_keys::FBX_PRESERVE_PIVOTS)
        .unwrap());
    assert!(!session
        .contains_property(ConfigPhase::Export, property_keys::FBX_PRESERVE_PIVOTS)
        .unwrap());
    assert_eq!(
        session.property_names(ConfigPhase::Import).unwrap(),
        vec![
            property_keys::FBX_PRESERVE_PIVOTS.to_string(),
            property_keys::LIMIT_BONE_WEIGHTS_MAX.to_string(),
        ]
    );

    assert!(session
        .remove_property(ConfigPhase::Import, property_keys::LIMIT_BONE_WEIGHTS_MAX)
        .unwrap());
    assert!(!session
        .remove_property(ConfigPhase::Import, property_keys::LIMIT_BONE_WEIGHTS_MAX)
        .unwrap());

    session.remove_all_properties(ConfigPhase::Import).unwrap();
    assert!(session
        .property_names(ConfigPhase::Import)
        .unwrap()
        .is_empty());
}

#[test]
fn test_log_sink_identity() {
    let session = ConverterSession::new(FakeEngine::new());
    let memory: Arc<dyn LogSink> = Arc::new(MemoryLogSink::new());
    let traced: Arc<dyn LogSink> = Arc::new(TracingLogSink);

    assert!(session.attach_log_sink(memory.clone()).unwrap());
    assert!(!session.attach_log_sink(memory.clone()).unwrap());
    assert!(session.attach_log_sink(traced.clone()).unwrap());
    assert_eq!(session.log_sinks().unwrap().len(), 2);

    assert!(session.detach_log_sink(&memory).unwrap());
    assert!(!session.detach_log_sink(&memory).unwrap());
    session.detach_all_log_sinks().unwrap();
    assert!(session.log_sinks().unwrap().is_empty());
}

#[test]
fn test_disposed_session_refuses_everything() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_scene(dir.path(), "in.fake", &Matrix4x4::IDENTITY, b"");
    let engine = FakeEngine::new();
    let session = ConverterSession::new(engine.clone());
    let scene = session.import_file(&input, PostProcessSteps::empty()).unwrap();

    session.dispose();
    session.dispose();
    assert!(session.is_disposed());

    assert!(matches!(session.set_scale(2.0), Err(Error::Disposed)));
    assert!(matches!(session.settings(), Err(Error::Disposed)));
    assert!(matches!(
        session.property_names(ConfigPhase::Export),
        Err(Error::Disposed)
    ));
    assert!(matches!(
        session.supported_export_formats(),
        Err(Error::Disposed)
    ));
    assert!(matches!(
        session.convert_file_to_blob(
            &input,
            PostProcessSteps::empty(),
            "fake",
            PostProcessSteps::empty()
        ),
        Err(Error::Disposed)
    ));
    assert!(matches!(
        session.export_to_blob(&scene, "fake", PostProcessSteps::empty()),
        Err(Error::Disposed)
    ));

    // Scenes outlive the session that imported them.
    assert_eq!(engine.live_scenes(), 1);
    drop(scene);
    assert_eq!(engine.live_scenes(), 0);
}
