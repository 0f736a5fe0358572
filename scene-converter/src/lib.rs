//! # Scene Converter
//!
//! Serialized 3D scene conversion on top of an external import/export engine
//! such as Assimp.
//!
//! A [`ConverterSession`] takes a scene from a file or stream and writes it to
//! a file or an in-memory [`ExportBlob`]:
//!
//! 1. materialize the import options and import the scene without
//!    post-processing;
//! 2. multiply the root node's transform by the session's scale and rotation;
//! 3. run the requested post-processing steps and reject incomplete scenes;
//! 4. materialize the export options and export;
//! 5. release the export options, detach the log sinks and release the scene.
//!
//! The engine sits behind the [`SceneEngine`] trait. With the `assimp`
//! feature, [`assimp::AssimpEngine`] drives the Assimp C API.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use scene_converter::{assimp::AssimpEngine, ConverterSession, PostProcessSteps};
//!
//! # fn main() -> scene_converter::Result<()> {
//! let session = ConverterSession::new(Arc::new(AssimpEngine::new()));
//! session.set_rotation_x(-90.0)?;
//! let blob = session.convert_file_to_blob(
//!     "model.fbx",
//!     PostProcessSteps::TRIANGULATE,
//!     "glb2",
//!     PostProcessSteps::empty(),
//! )?;
//! println!("{} bytes", blob.size());
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]

pub use crate::{
    config::{
        property_keys, ConfigPhase, ConfigSet, MaterializedConfigs, Property, PropertyConfig,
        PropertyStore, PropertyValue,
    },
    engine::{EngineResult, ImportedScene, SceneEngine},
    error::{EngineFailure, Error, Result},
    exporter::{ExportBlob, ExportBlobIterator},
    formats::{format_ids, parse_extension_list, ExportFormatDesc, FormatCapabilities},
    layout::{LayoutError, SceneArena, SceneBuffer, SceneFlags, SceneLayout},
    logging::{FileLogSink, LogSink, LogSinkSet, MemoryLogSink, TracingLogSink},
    patch::{apply_root_transform, PatchOutcome},
    postprocess::PostProcessSteps,
    session::{ConversionPhase, ConverterSession, SessionSettings},
    transform::{is_identity, Matrix4x4, TransformParameters, Vector3D},
};

pub mod config;
pub mod engine;
pub mod error;
pub mod exporter;
pub mod formats;
pub mod layout;
pub mod logging;
pub mod patch;
pub mod postprocess;
pub mod session;
pub mod transform;

#[cfg(feature = "assimp")]
pub mod assimp;
