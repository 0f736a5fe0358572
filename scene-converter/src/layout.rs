//! Byte-level layout of the engine-owned scene structure
//!
//! The orchestrator never dereferences scene pointers directly. It goes
//! through [`SceneBuffer`] (byte reads/writes at absolute addresses, provided
//! by the engine's scene type) and [`SceneLayout`] (field offsets mirroring
//! Assimp's `aiScene` / `aiNode`):
//!
//! ```text
//! aiScene: u32 mFlags | padding to pointer width | aiNode* mRootNode | ...
//! aiNode:  aiString mName (u32 length + 1024 bytes) | f32[16] mTransformation (row-major) | ...
//! ```

use bitflags::bitflags;
use thiserror::Error;

use crate::transform::Matrix4x4;

bitflags! {
    /// Scene flags stored in `aiScene::mFlags`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SceneFlags: u32 {
        /// The importer could not load the whole scene
        const INCOMPLETE = 0x1;
        /// `ValidateDataStructure` ran without errors
        const VALIDATED = 0x2;
        /// `ValidateDataStructure` reported warnings
        const VALIDATION_WARNING = 0x4;
        /// Vertices are not deduplicated
        const NON_VERBOSE_FORMAT = 0x8;
        /// The scene is a height-map terrain
        const TERRAIN = 0x10;
        /// Meshes may share data
        const ALLOW_SHARED = 0x20;
    }
}

/// Errors raised while walking scene memory
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// A null address was encountered
    #[error("null address while reading {field}")]
    NullAddress { field: &'static str },

    /// The access falls outside the memory the buffer can reach
    #[error("access of {len} bytes at {address:#x} is out of bounds")]
    OutOfBounds { address: usize, len: usize },

    /// The layout does not describe a supported pointer width
    #[error("unsupported pointer width {0}")]
    UnsupportedPointerWidth(usize),
}

/// Byte access to a scene owned by the engine.
///
/// Addresses are absolute: [`base_address`](Self::base_address) is the
/// address of the scene struct, and pointers read out of the scene (such as
/// the root node) are used as-is.
pub trait SceneBuffer {
    /// Address of the scene struct
    fn base_address(&self) -> usize;

    /// Copy `out.len()` bytes starting at `address`
    fn read_bytes(&self, address: usize, out: &mut [u8]) -> Result<(), LayoutError>;

    /// Overwrite `bytes.len()` bytes starting at `address`
    fn write_bytes(&mut self, address: usize, bytes: &[u8]) -> Result<(), LayoutError>;
}

/// Field offsets of the scene and root node structs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneLayout {
    /// Offset of `mFlags` in the scene
    pub flags_offset: usize,
    /// Offset of `mRootNode` in the scene
    pub root_node_offset: usize,
    /// Size of a pointer in the scene memory
    pub pointer_width: usize,
    /// Size of `aiNode::mName`; the transform follows immediately
    pub node_name_size: usize,
}

impl SceneLayout {
    /// `MAXLEN` of Assimp's `aiString`
    pub const MAX_NAME_LEN: usize = 1024;

    /// Size of the 4x4 `f32` transform
    pub const TRANSFORM_SIZE: usize = 16 * std::mem::size_of::<f32>();

    /// Layout for the target this crate is compiled for
    pub const NATIVE: Self = Self::for_pointer_width(std::mem::size_of::<usize>());

    /// Layout for a given pointer width (4 or 8)
    ///
    /// # Panics
    ///
    /// Panics if `pointer_width` is not a power of two. Other unsupported
    /// widths are reported as [`LayoutError::UnsupportedPointerWidth`] when
    /// the layout is used.
    pub const fn for_pointer_width(pointer_width: usize) -> Self {
        assert!(
            pointer_width.is_power_of_two(),
            "pointer width must be a power of two"
        );
        let flags_size = std::mem::size_of::<u32>();
        Self {
            flags_offset: 0,
            root_node_offset: flags_size.next_multiple_of(pointer_width),
            pointer_width,
            node_name_size: std::mem::size_of::<u32>() + Self::MAX_NAME_LEN,
        }
    }

    /// Offset of `aiNode::mTransformation` inside the node
    pub const fn transform_offset(&self) -> usize {
        self.node_name_size
    }

    /// Bytes of the scene header this layout covers
    pub const fn scene_header_size(&self) -> usize {
        self.root_node_offset + self.pointer_width
    }

    /// Read `aiScene::mFlags`
    pub fn read_flags<B: SceneBuffer + ?Sized>(
        &self,
        scene: &B,
    ) -> Result<SceneFlags, LayoutError> {
        let field = self.address(scene.base_address(), self.flags_offset, "mFlags")?;
        let mut raw = [0u8; 4];
        scene.read_bytes(field, &mut raw)?;
        Ok(SceneFlags::from_bits_retain(u32::from_ne_bytes(raw)))
    }

    /// Resolve `aiScene::mRootNode`
    pub fn root_node<B: SceneBuffer + ?Sized>(&self, scene: &B) -> Result<usize, LayoutError> {
        let field = self.address(scene.base_address(), self.root_node_offset, "mRootNode")?;
        let root = match self.pointer_width {
            4 => {
                let mut raw = [0u8; 4];
                scene.read_bytes(field, &mut raw)?;
                u32::from_ne_bytes(raw) as usize
            }
            8 => {
                let mut raw = [0u8; 8];
                scene.read_bytes(field, &mut raw)?;
                usize::try_from(u64::from_ne_bytes(raw))
                    .map_err(|_| LayoutError::OutOfBounds { address: field, len: 8 })?
            }
            other => return Err(LayoutError::UnsupportedPointerWidth(other)),
        };
        if root == 0 {
            return Err(LayoutError::NullAddress { field: "mRootNode" });
        }
        Ok(root)
    }

    /// Address of the root node's transform
    pub fn root_transform_address<B: SceneBuffer + ?Sized>(
        &self,
        scene: &B,
    ) -> Result<usize, LayoutError> {
        let root = self.root_node(scene)?;
        self.address(root, self.transform_offset(), "mTransformation")
    }

    /// Decode the root node's row-major transform
    pub fn read_root_transform<B: SceneBuffer + ?Sized>(
        &self,
        scene: &B,
    ) -> Result<Matrix4x4, LayoutError> {
        let address = self.root_transform_address(scene)?;
        let mut raw = [0u8; Self::TRANSFORM_SIZE];
        scene.read_bytes(address, &mut raw)?;
        Ok(decode_row_major(&raw))
    }

    /// Overwrite the root node's transform in place
    pub fn write_root_transform<B: SceneBuffer + ?Sized>(
        &self,
        scene: &mut B,
        transform: &Matrix4x4,
    ) -> Result<(), LayoutError> {
        let address = self.root_transform_address(scene)?;
        let rows = transform.transpose().to_cols_array();
        scene.write_bytes(address, bytemuck::bytes_of(&rows))
    }

    fn address(
        &self,
        base: usize,
        offset: usize,
        field: &'static str,
    ) -> Result<usize, LayoutError> {
        if base == 0 {
            return Err(LayoutError::NullAddress { field });
        }
        base.checked_add(offset).ok_or(LayoutError::OutOfBounds {
            address: base,
            len: offset,
        })
    }
}

impl Default for SceneLayout {
    fn default() -> Self {
        Self::NATIVE
    }
}

/// Decode 16 native-endian `f32`s stored row-major
pub(crate) fn decode_row_major(raw: &[u8; SceneLayout::TRANSFORM_SIZE]) -> Matrix4x4 {
    let rows: [f32; 16] = bytemuck::pod_read_unaligned(raw);
    Matrix4x4::from_cols_array(&rows).transpose()
}

/// Owned scene memory laid out per [`SceneLayout`].
///
/// Holds the scene header and a root node in one heap allocation; pointers
/// stored inside are real addresses into that allocation. Useful for engines
/// that build scenes in Rust memory. The layout's pointer width must match
/// the host's, since a narrower field cannot hold a heap address.
#[derive(Debug)]
pub struct SceneArena {
    bytes: Box<[u8]>,
    layout: SceneLayout,
    root_offset: usize,
}

impl SceneArena {
    /// Create a scene with a single root node
    pub fn new(
        layout: SceneLayout,
        root_name: &str,
        transform: Matrix4x4,
    ) -> Result<Self, LayoutError> {
        if layout.pointer_width != std::mem::size_of::<usize>() {
            return Err(LayoutError::UnsupportedPointerWidth(layout.pointer_width));
        }
        let root_offset = layout.scene_header_size().next_multiple_of(16);
        let len = root_offset + layout.transform_offset() + SceneLayout::TRANSFORM_SIZE;
        let mut arena = Self {
            bytes: vec![0u8; len].into_boxed_slice(),
            layout,
            root_offset,
        };
        arena.link_root();
        arena.write_name(root_name);
        arena.set_transform(transform);
        Ok(arena)
    }

    /// Layout this arena follows
    pub fn layout(&self) -> SceneLayout {
        self.layout
    }

    /// Current scene flags
    pub fn flags(&self) -> SceneFlags {
        let start = self.layout.flags_offset;
        let raw: [u8; 4] = bytemuck::pod_read_unaligned(&self.bytes[start..start + 4]);
        SceneFlags::from_bits_retain(u32::from_ne_bytes(raw))
    }

    /// Replace the scene flags
    pub fn set_flags(&mut self, flags: SceneFlags) {
        let start = self.layout.flags_offset;
        self.bytes[start..start + 4].copy_from_slice(&flags.bits().to_ne_bytes());
    }

    /// Name of the root node
    pub fn root_name(&self) -> String {
        let start = self.root_offset;
        let len: [u8; 4] = bytemuck::pod_read_unaligned(&self.bytes[start..start + 4]);
        let len = (u32::from_ne_bytes(len) as usize).min(SceneLayout::MAX_NAME_LEN);
        String::from_utf8_lossy(&self.bytes[start + 4..start + 4 + len]).into_owned()
    }

    /// Root transform as stored
    pub fn transform(&self) -> Matrix4x4 {
        let mut raw = [0u8; SceneLayout::TRANSFORM_SIZE];
        raw.copy_from_slice(self.transform_bytes());
        decode_row_major(&raw)
    }

    /// Raw bytes of the root transform
    pub fn transform_bytes(&self) -> &[u8] {
        let start = self.root_offset + self.layout.transform_offset();
        &self.bytes[start..start + SceneLayout::TRANSFORM_SIZE]
    }

    /// Replace the root transform
    pub fn set_transform(&mut self, transform: Matrix4x4) {
        let start = self.root_offset + self.layout.transform_offset();
        let rows = transform.transpose().to_cols_array();
        self.bytes[start..start + SceneLayout::TRANSFORM_SIZE]
            .copy_from_slice(bytemuck::bytes_of(&rows));
    }

    /// Null out the root node pointer
    pub fn clear_root(&mut self) {
        self.write_pointer(0);
    }

    fn link_root(&mut self) {
        let root = self.base_address() + self.root_offset;
        self.write_pointer(root);
    }

    fn write_pointer(&mut self, value: usize) {
        let start = self.layout.root_node_offset;
        let width = self.layout.pointer_width;
        self.bytes[start..start + width].copy_from_slice(&value.to_ne_bytes());
    }

    fn write_name(&mut self, name: &str) {
        let bytes = name.as_bytes();
        let len = bytes.len().min(SceneLayout::MAX_NAME_LEN - 1);
        let start = self.root_offset;
        self.bytes[start..start + 4].copy_from_slice(&(len as u32).to_ne_bytes());
        self.bytes[start + 4..start + 4 + len].copy_from_slice(&bytes[..len]);
    }

    fn range(&self, address: usize, len: usize) -> Result<std::ops::Range<usize>, LayoutError> {
        let out_of_bounds = LayoutError::OutOfBounds { address, len };
        let start = address
            .checked_sub(self.base_address())
            .ok_or(out_of_bounds.clone())?;
        let end = start.checked_add(len).ok_or(out_of_bounds.clone())?;
        if end > self.bytes.len() {
            return Err(out_of_bounds);
        }
        Ok(start..end)
    }
}

impl SceneBuffer for SceneArena {
    fn base_address(&self) -> usize {
        self.bytes.as_ptr() as usize
    }

    fn read_bytes(&self, address: usize, out: &mut [u8]) -> Result<(), LayoutError> {
        let range = self.range(address, out.len())?;
        out.copy_from_slice(&self.bytes[range]);
        Ok(())
    }

    fn write_bytes(&mut self, address: usize, bytes: &[u8]) -> Result<(), LayoutError> {
        let range = self.range(address, bytes.len())?;
        self.bytes[range].copy_from_slice(bytes);
        Ok(())
    }
}
