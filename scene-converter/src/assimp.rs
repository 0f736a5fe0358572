//! [`SceneEngine`] backed by the Assimp C API
//!
//! Assimp keeps verbose logging and log streams in process-wide state, so
//! every [`AssimpEngine`] in a process shares them. The C export API takes no
//! property store; export options are materialized and released but not
//! forwarded.

use std::ffi::{CStr, CString};
use std::io::Read;
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;
use std::ptr::{self, NonNull};
use std::sync::{Arc, Mutex, PoisonError};

use asset_importer_sys as sys;

use crate::{
    config::{PropertyStore, PropertyValue},
    engine::{EngineResult, SceneEngine},
    error::EngineFailure,
    exporter::ExportBlob,
    formats::{parse_extension_list, ExportFormatDesc},
    layout::{LayoutError, SceneBuffer, SceneLayout},
    logging::LogSink,
    postprocess::PostProcessSteps,
    transform::Matrix4x4,
};

const _: () = {
    assert!(std::mem::offset_of!(sys::aiScene, mFlags) == SceneLayout::NATIVE.flags_offset);
    assert!(
        std::mem::offset_of!(sys::aiScene, mRootNode) == SceneLayout::NATIVE.root_node_offset
    );
    assert!(
        std::mem::offset_of!(sys::aiNode, mTransformation)
            == SceneLayout::NATIVE.transform_offset()
    );
};

/// Scene returned by `aiImportFile*`.
///
/// The pointer becomes null once Assimp has freed the scene itself, which it
/// does when post-processing fails.
#[derive(Debug)]
pub struct AssimpScene {
    ptr: *mut sys::aiScene,
}

// SAFETY: the scene is plain heap memory owned by this handle until it is
// passed to `aiReleaseImport`; Assimp keeps no thread affinity for it.
unsafe impl Send for AssimpScene {}

impl AssimpScene {
    /// Raw scene pointer; null after Assimp released the scene
    pub fn as_raw(&self) -> *const sys::aiScene {
        self.ptr
    }

    fn check(&self, address: usize, len: usize) -> Result<(), LayoutError> {
        if self.ptr.is_null() {
            return Err(LayoutError::NullAddress { field: "aiScene" });
        }
        if address == 0 || address.checked_add(len).is_none() {
            return Err(LayoutError::OutOfBounds { address, len });
        }
        Ok(())
    }
}

impl SceneBuffer for AssimpScene {
    fn base_address(&self) -> usize {
        self.ptr as usize
    }

    fn read_bytes(&self, address: usize, out: &mut [u8]) -> Result<(), LayoutError> {
        self.check(address, out.len())?;
        // SAFETY: addresses come from the scene header and root node pointer,
        // whose offsets are checked against the bindings at compile time.
        unsafe { ptr::copy_nonoverlapping(address as *const u8, out.as_mut_ptr(), out.len()) };
        Ok(())
    }

    fn write_bytes(&mut self, address: usize, bytes: &[u8]) -> Result<(), LayoutError> {
        self.check(address, bytes.len())?;
        // SAFETY: see `read_bytes`; the scene is exclusively borrowed.
        unsafe { ptr::copy_nonoverlapping(bytes.as_ptr(), address as *mut u8, bytes.len()) };
        Ok(())
    }
}

/// A log stream registered with Assimp
struct AttachedStream {
    stream: sys::aiLogStream,
    user: NonNull<Arc<dyn LogSink>>,
}

// SAFETY: `user` is a boxed `Arc<dyn LogSink>` owned by the stream entry; the
// sink itself is `Send + Sync`.
unsafe impl Send for AttachedStream {}

/// Engine over the process-wide Assimp library
#[derive(Default)]
pub struct AssimpEngine {
    streams: Mutex<Vec<AttachedStream>>,
}

impl AssimpEngine {
    /// Create an engine handle
    pub fn new() -> Self {
        Self::default()
    }

    fn last_failure(&self, fallback: &str) -> EngineFailure {
        let message = self.error_string();
        if message.is_empty() {
            EngineFailure::new(fallback)
        } else {
            EngineFailure::new(message)
        }
    }
}

impl std::fmt::Debug for AssimpEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let streams = self
            .streams
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len();
        f.debug_struct("AssimpEngine")
            .field("log_streams", &streams)
            .finish()
    }
}

impl Drop for AssimpEngine {
    fn drop(&mut self) {
        let streams = self.streams.get_mut().unwrap_or_else(PoisonError::into_inner);
        for entry in streams.drain(..) {
            detach_stream(entry);
        }
    }
}

impl SceneEngine for AssimpEngine {
    type Scene = AssimpScene;

    fn import_file(
        &self,
        path: &Path,
        steps: PostProcessSteps,
        properties: &PropertyStore,
    ) -> EngineResult<AssimpScene> {
        let c_path = CString::new(path.to_string_lossy().as_ref())
            .map_err(|_| EngineFailure::new("path contains a NUL byte"))?;
        let store = NativePropertyStore::new(properties)?;

        let scene = unsafe {
            sys::aiImportFileExWithProperties(
                c_path.as_ptr(),
                steps.as_raw(),
                ptr::null_mut(),
                store.as_ptr(),
            )
        };
        if scene.is_null() {
            return Err(self.last_failure("import failed"));
        }
        Ok(AssimpScene {
            ptr: scene as *mut sys::aiScene,
        })
    }

    fn import_stream(
        &self,
        stream: &mut dyn Read,
        format_hint: &str,
        steps: PostProcessSteps,
        properties: &PropertyStore,
    ) -> EngineResult<AssimpScene> {
        let mut data = Vec::new();
        stream
            .read_to_end(&mut data)
            .map_err(|e| EngineFailure::new(format!("failed to read stream: {e}")))?;
        if data.is_empty() {
            return Err(EngineFailure::new("stream is empty"));
        }
        let len = u32::try_from(data.len())
            .map_err(|_| EngineFailure::new("stream is larger than 4 GiB"))?;
        let c_hint = CString::new(format_hint)
            .map_err(|_| EngineFailure::new("format hint contains a NUL byte"))?;
        let store = NativePropertyStore::new(properties)?;

        let scene = unsafe {
            sys::aiImportFileFromMemoryWithProperties(
                data.as_ptr() as *const c_char,
                len,
                steps.as_raw(),
                c_hint.as_ptr(),
                store.as_ptr(),
            )
        };
        if scene.is_null() {
            return Err(self.last_failure("import failed"));
        }
        Ok(AssimpScene {
            ptr: scene as *mut sys::aiScene,
        })
    }

    fn apply_post_processing(
        &self,
        scene: &mut AssimpScene,
        steps: PostProcessSteps,
    ) -> EngineResult<()> {
        if scene.ptr.is_null() {
            return Err(EngineFailure::new("scene was already released"));
        }
        let processed = unsafe { sys::aiApplyPostProcessing(scene.ptr, steps.as_raw()) };
        if processed.is_null() {
            // Assimp frees the scene when post-processing fails.
            scene.ptr = ptr::null_mut();
            return Err(self.last_failure("post-processing failed"));
        }
        scene.ptr = processed as *mut sys::aiScene;
        Ok(())
    }

    fn export_file(
        &self,
        scene: &AssimpScene,
        format_id: &str,
        path: &Path,
        steps: PostProcessSteps,
        properties: &PropertyStore,
    ) -> EngineResult<()> {
        if scene.ptr.is_null() {
            return Err(EngineFailure::new("scene was already released"));
        }
        let c_format = CString::new(format_id)
            .map_err(|_| EngineFailure::new("format id contains a NUL byte"))?;
        let c_path = CString::new(path.to_string_lossy().as_ref())
            .map_err(|_| EngineFailure::new("path contains a NUL byte"))?;
        if !properties.is_empty() {
            tracing::debug!(count = properties.len(), "export options not forwarded");
        }

        let result = unsafe {
            sys::aiExportScene(scene.ptr, c_format.as_ptr(), c_path.as_ptr(), steps.as_raw())
        };
        if result == sys::aiReturn::aiReturn_SUCCESS {
            Ok(())
        } else {
            Err(self.last_failure("export failed"))
        }
    }

    fn export_blob(
        &self,
        scene: &AssimpScene,
        format_id: &str,
        steps: PostProcessSteps,
        properties: &PropertyStore,
    ) -> EngineResult<ExportBlob> {
        if scene.ptr.is_null() {
            return Err(EngineFailure::new("scene was already released"));
        }
        let c_format = CString::new(format_id)
            .map_err(|_| EngineFailure::new("format id contains a NUL byte"))?;
        if !properties.is_empty() {
            tracing::debug!(count = properties.len(), "export options not forwarded");
        }

        let head =
            unsafe { sys::aiExportSceneToBlob(scene.ptr, c_format.as_ptr(), steps.as_raw()) };
        if head.is_null() {
            return Err(self.last_failure("export failed"));
        }

        // Copy the chain out, then hand it back to Assimp in one call.
        let mut blobs = Vec::new();
        let mut current = head;
        while let Some(raw) = unsafe { current.as_ref() } {
            let data = if raw.size == 0 || raw.data.is_null() {
                Vec::new()
            } else {
                unsafe { std::slice::from_raw_parts(raw.data as *const u8, raw.size) }.to_vec()
            };
            blobs.push(ExportBlob::new(ai_string_to_string(&raw.name), data));
            current = raw.next;
        }
        unsafe { sys::aiReleaseExportBlob(head) };

        let mut blobs = blobs.into_iter();
        let mut primary = blobs
            .next()
            .ok_or_else(|| EngineFailure::new("export produced no data"))?;
        for blob in blobs {
            primary.push(blob);
        }
        Ok(primary)
    }

    fn release_scene(&self, scene: AssimpScene) {
        if !scene.ptr.is_null() {
            unsafe { sys::aiReleaseImport(scene.ptr) };
        }
    }

    fn error_string(&self) -> String {
        let message = unsafe { sys::aiGetErrorString() };
        if message.is_null() {
            return String::new();
        }
        unsafe { CStr::from_ptr(message) }
            .to_string_lossy()
            .into_owned()
    }

    fn enable_verbose_logging(&self, enable: bool) {
        unsafe { sys::aiEnableVerboseLogging(if enable { 1 } else { 0 }) };
    }

    fn attach_log_sink(&self, sink: &Arc<dyn LogSink>) {
        let user = NonNull::from(Box::leak(Box::new(Arc::clone(sink))));
        let stream = sys::aiLogStream {
            callback: Some(forward_log),
            user: user.as_ptr() as *mut c_char,
        };
        unsafe { sys::aiAttachLogStream(&stream) };
        self.streams
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(AttachedStream { stream, user });
    }

    fn detach_log_sink(&self, sink: &Arc<dyn LogSink>) {
        let entry = {
            let mut streams = self.streams.lock().unwrap_or_else(PoisonError::into_inner);
            let pos = streams
                .iter()
                .position(|entry| Arc::ptr_eq(unsafe { entry.user.as_ref() }, sink));
            pos.map(|pos| streams.remove(pos))
        };
        if let Some(entry) = entry {
            detach_stream(entry);
        }
    }

    fn export_formats(&self) -> Vec<ExportFormatDesc> {
        let count = unsafe { sys::aiGetExportFormatCount() };
        let mut formats = Vec::with_capacity(count);
        for index in 0..count {
            let desc = unsafe { sys::aiGetExportFormatDescription(index) };
            let Some(raw) = (unsafe { desc.as_ref() }) else {
                continue;
            };
            formats.push(ExportFormatDesc::new(
                c_str_to_string(raw.id),
                c_str_to_string(raw.description),
                c_str_to_string(raw.fileExtension),
            ));
            unsafe { sys::aiReleaseExportFormatDescription(desc) };
        }
        formats
    }

    fn import_extensions(&self) -> Vec<String> {
        let mut list = sys::aiString {
            length: 0,
            data: [0; 1024],
        };
        unsafe { sys::aiGetExtensionList(&mut list) };
        parse_extension_list(&ai_string_to_string(&list))
    }
}

fn detach_stream(entry: AttachedStream) {
    unsafe {
        sys::aiDetachLogStream(&entry.stream);
        drop(Box::from_raw(entry.user.as_ptr()));
    }
}

/// Assimp log callback; `user` is a boxed `Arc<dyn LogSink>`
extern "C" fn forward_log(message: *const c_char, user: *mut c_char) {
    if message.is_null() || user.is_null() {
        return;
    }
    // Panics must not unwind into C.
    let _ = catch_unwind(AssertUnwindSafe(|| {
        let message = unsafe { CStr::from_ptr(message) }.to_string_lossy();
        let sink = unsafe { &*(user as *const Arc<dyn LogSink>) };
        sink.log(&message);
    }));
}

/// `aiPropertyStore` filled from a [`PropertyStore`], released on drop
struct NativePropertyStore {
    ptr: *mut sys::aiPropertyStore,
}

impl NativePropertyStore {
    fn new(properties: &PropertyStore) -> EngineResult<Self> {
        let ptr = unsafe { sys::aiCreatePropertyStore() };
        if ptr.is_null() {
            return Err(EngineFailure::new("failed to create property store"));
        }
        let store = Self { ptr };

        for (name, value) in properties.properties() {
            let c_name = CString::new(name.as_str())
                .map_err(|_| EngineFailure::new(format!("invalid property name {name:?}")))?;
            unsafe {
                match value {
                    PropertyValue::Integer(v) => {
                        sys::aiSetImportPropertyInteger(store.ptr, c_name.as_ptr(), *v);
                    }
                    PropertyValue::Float(v) => {
                        sys::aiSetImportPropertyFloat(store.ptr, c_name.as_ptr(), *v);
                    }
                    PropertyValue::Boolean(v) => {
                        sys::aiSetImportPropertyInteger(store.ptr, c_name.as_ptr(), i32::from(*v));
                    }
                    PropertyValue::String(v) => {
                        let value = to_ai_string(v);
                        sys::aiSetImportPropertyString(store.ptr, c_name.as_ptr(), &value);
                    }
                    PropertyValue::Matrix(m) => {
                        let value = to_ai_matrix(m);
                        sys::aiSetImportPropertyMatrix(store.ptr, c_name.as_ptr(), &value);
                    }
                }
            }
        }
        Ok(store)
    }

    fn as_ptr(&self) -> *const sys::aiPropertyStore {
        self.ptr
    }
}

impl Drop for NativePropertyStore {
    fn drop(&mut self) {
        unsafe { sys::aiReleasePropertyStore(self.ptr) };
    }
}

fn to_ai_string(value: &str) -> sys::aiString {
    let mut out = sys::aiString {
        length: 0,
        data: [0; 1024],
    };
    let bytes = value.as_bytes();
    let len = bytes.len().min(SceneLayout::MAX_NAME_LEN - 1);
    for (dst, &src) in out.data.iter_mut().zip(&bytes[..len]) {
        *dst = src as c_char;
    }
    out.length = len as u32;
    out
}

fn ai_string_to_string(value: &sys::aiString) -> String {
    let len = (value.length as usize).min(value.data.len());
    let bytes: Vec<u8> = value.data[..len].iter().map(|&c| c as u8).collect();
    String::from_utf8_lossy(&bytes).into_owned()
}

fn c_str_to_string(value: *const c_char) -> String {
    if value.is_null() {
        return String::new();
    }
    unsafe { CStr::from_ptr(value) }
        .to_string_lossy()
        .into_owned()
}

/// Row-major `aiMatrix4x4` from a column-major glam matrix
fn to_ai_matrix(m: &Matrix4x4) -> sys::aiMatrix4x4 {
    sys::aiMatrix4x4 {
        a1: m.x_axis.x,
        a2: m.y_axis.x,
        a3: m.z_axis.x,
        a4: m.w_axis.x,
        b1: m.x_axis.y,
        b2: m.y_axis.y,
        b3: m.z_axis.y,
        b4: m.w_axis.y,
        c1: m.x_axis.z,
        c2: m.y_axis.z,
        c3: m.z_axis.z,
        c4: m.w_axis.z,
        d1: m.x_axis.w,
        d2: m.y_axis.w,
        d3: m.z_axis.w,
        d4: m.w_axis.w,
    }
}
