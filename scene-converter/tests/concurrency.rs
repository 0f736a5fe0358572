//! Conversions on one session are serialized

mod common;

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use common::{write_scene, Event, FakeEngine, Knobs};
use scene_converter::{ConverterSession, LogSink, Matrix4x4, MemoryLogSink, PostProcessSteps};

#[test]
fn test_conversions_do_not_interleave() {
    common::init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let input = write_scene(dir.path(), "in.fake", &Matrix4x4::IDENTITY, b"");
    let engine = FakeEngine::with_knobs(Knobs {
        import_delay: Some(Duration::from_millis(20)),
        ..Knobs::default()
    });
    let session = Arc::new(ConverterSession::new(engine.clone()));
    let sink: Arc<dyn LogSink> = Arc::new(MemoryLogSink::new());
    session.attach_log_sink(sink).unwrap();
    session.set_scale(2.0).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let session = Arc::clone(&session);
            let input = input.clone();
            thread::spawn(move || {
                session
                    .convert_file_to_blob(
                        &input,
                        PostProcessSteps::empty(),
                        "fake",
                        PostProcessSteps::empty(),
                    )
                    .map(|blob| blob.size())
            })
        })
        .collect();
    for handle in handles {
        assert!(handle.join().unwrap().unwrap() > 0);
    }

    // Each conversion is one contiguous block, attach through release.
    let events = engine.events();
    assert_eq!(events.len(), 4 * 7);
    for block in events.chunks(7) {
        assert_eq!(block[0], Event::Verbose(false));
        assert_eq!(block[1], Event::AttachSink);
        let scene = match &block[3] {
            Event::PostProcess { scene, .. } => *scene,
            other => panic!("unexpected event {other:?}"),
        };
        assert!(matches!(&block[4], Event::Export { scene: s, .. } if *s == scene));
        assert_eq!(block[5], Event::DetachSink);
        assert_eq!(block[6], Event::Release { scene });
    }
    assert_eq!(engine.live_scenes(), 0);
}

#[test]
fn test_settings_change_waits_for_running_conversion() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_scene(dir.path(), "in.fake", &Matrix4x4::IDENTITY, b"");
    let engine = FakeEngine::with_knobs(Knobs {
        import_delay: Some(Duration::from_millis(100)),
        ..Knobs::default()
    });
    let session = Arc::new(ConverterSession::new(engine));
    session.set_scale(2.0).unwrap();

    let converting = {
        let session = Arc::clone(&session);
        thread::spawn(move || {
            session.convert_file_to_blob(
                &input,
                PostProcessSteps::empty(),
                "fake",
                PostProcessSteps::empty(),
            )
        })
    };
    thread::sleep(Duration::from_millis(20));
    session.set_scale(5.0).unwrap();

    let blob = converting.join().unwrap().unwrap();
    let (transform, _) = common::decode(blob.data()).unwrap();
    // Either the conversion ran entirely before or entirely after the change.
    let scale = transform.x_axis.x;
    assert!(scale == 2.0 || scale == 5.0, "scale {scale}");
}

#[test]
fn test_session_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ConverterSession<FakeEngine>>();
}
