//! Bad inputs are rejected before the engine is touched

mod common;

use std::io::Cursor;

use common::{encode, FakeEngine};
use scene_converter::{ConverterSession, Error, Matrix4x4, PostProcessSteps};

#[test]
fn test_missing_source_file() {
    let engine = FakeEngine::new();
    let session = ConverterSession::new(engine.clone());
    let dir = tempfile::tempdir().unwrap();

    let err = session
        .convert_file_to_file(
            dir.path().join("missing.fake"),
            PostProcessSteps::empty(),
            dir.path().join("out.fake"),
            "fake",
            PostProcessSteps::empty(),
        )
        .unwrap_err();

    assert!(matches!(err, Error::FileNotFound { .. }));
    assert!(err.is_invalid_input());
    assert!(engine.events().is_empty());
    assert!(!dir.path().join("out.fake").exists());
}

#[test]
fn test_directory_is_not_a_source_file() {
    let engine = FakeEngine::new();
    let session = ConverterSession::new(engine.clone());
    let dir = tempfile::tempdir().unwrap();

    let err = session
        .convert_file_to_blob(
            dir.path(),
            PostProcessSteps::empty(),
            "fake",
            PostProcessSteps::empty(),
        )
        .unwrap_err();
    assert!(err.is_invalid_input());
    assert!(engine.events().is_empty());
}

#[test]
fn test_empty_format_hint() {
    let engine = FakeEngine::new();
    let session = ConverterSession::new(engine.clone());

    for hint in ["", "."] {
        let mut stream = Cursor::new(encode(&Matrix4x4::IDENTITY, b""));
        let err = session
            .convert_stream_to_blob(
                &mut stream,
                hint,
                PostProcessSteps::empty(),
                "fake",
                PostProcessSteps::empty(),
            )
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput { .. }));
        // Stream untouched.
        assert_eq!(stream.position(), 0);
    }
    assert!(engine.events().is_empty());
}

#[test]
fn test_conflicting_post_process_steps() {
    let engine = FakeEngine::new();
    let session = ConverterSession::new(engine.clone());
    let mut stream = Cursor::new(encode(&Matrix4x4::IDENTITY, b""));

    let err = session
        .convert_stream_to_blob(
            &mut stream,
            "fake",
            PostProcessSteps::OPTIMIZE_GRAPH | PostProcessSteps::PRE_TRANSFORM_VERTICES,
            "fake",
            PostProcessSteps::empty(),
        )
        .unwrap_err();

    assert!(err.is_invalid_input());
    assert!(engine.events().is_empty());
}

#[test]
fn test_undecodable_stream_is_import_failure() {
    let engine = FakeEngine::new();
    let session = ConverterSession::new(engine.clone());
    let mut stream = Cursor::new(b"not a scene".to_vec());

    let err = session
        .convert_stream_to_blob(
            &mut stream,
            "fake",
            PostProcessSteps::empty(),
            "fake",
            PostProcessSteps::empty(),
        )
        .unwrap_err();
    assert!(matches!(err, Error::ImportFailed { .. }));
    assert_eq!(engine.live_scenes(), 0);
}
