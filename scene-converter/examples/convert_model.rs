/*!
 * Convert a model between formats through a converter session.
 *
 * cargo run --example convert_model --features build-assimp -- <input> <output> [scale] [rot_x] [rot_y] [rot_z]
 *
 * The export format is picked from the output extension. Set RUST_LOG=debug
 * to see the pipeline phases and Assimp's own log output.
 */

use std::env;
use std::path::Path;
use std::sync::Arc;

use scene_converter::{
    assimp::AssimpEngine, property_keys, ConfigPhase, ConverterSession, PostProcessSteps,
    Property, SessionSettings, TracingLogSink,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        println!(
            "Usage: {} <input_file> <output_file> [scale] [rot_x] [rot_y] [rot_z]",
            args[0]
        );
        println!("Example: {} model.fbx model.obj 0.01 -90 0 0", args[0]);
        return Ok(());
    }
    let input = Path::new(&args[1]);
    let output = Path::new(&args[2]);
    let number = |index: usize, default: f32| -> Result<f32, Box<dyn std::error::Error>> {
        Ok(args.get(index).map(|s| s.parse()).transpose()?.unwrap_or(default))
    };

    let settings = SessionSettings {
        scale: number(3, 1.0)?,
        rotation_x: number(4, 0.0)?,
        rotation_y: number(5, 0.0)?,
        rotation_z: number(6, 0.0)?,
        verbose_logging: env::var_os("RUST_LOG").is_some(),
    };
    let session = ConverterSession::with_settings(Arc::new(AssimpEngine::new()), settings);
    session.attach_log_sink(Arc::new(TracingLogSink))?;
    session.set_property(
        ConfigPhase::Import,
        Arc::new(Property::boolean(property_keys::FBX_PRESERVE_PIVOTS, false)),
    )?;

    let extension = output
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("");
    let format = session
        .supported_export_formats()?
        .into_iter()
        .find(|desc| desc.file_extension == extension)
        .ok_or_else(|| format!("no export format for '.{extension}'"))?;

    println!(
        "Converting: {} -> {} ({})",
        input.display(),
        output.display(),
        format.description
    );
    session.convert_file_to_file(
        input,
        PostProcessSteps::TARGET_REALTIME_QUALITY,
        output,
        &format.id,
        PostProcessSteps::empty(),
    )?;

    let size = std::fs::metadata(output)?.len();
    println!("✓ Wrote {size} bytes");
    Ok(())
}
