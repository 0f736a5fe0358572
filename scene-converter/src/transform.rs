//! Composite root transform built from a uniform scale and three rotations

pub use glam::{Mat4 as Matrix4x4, Vec3 as Vector3D};

/// Factor applied to each rotation angle before building the rotation matrices.
///
/// NOTE: this multiplies by `180/π`, which converts radians to degrees, while
/// the angles are documented as degrees. Conversions produced with earlier
/// versions of this pipeline depend on the exact numbers, so the factor is kept.
pub const ROTATION_FACTOR: f32 = (180.0_f64 / std::f64::consts::PI) as f32;

/// Per-element tolerance used when testing a matrix for identity (Assimp's `IsIdentity`).
pub const IDENTITY_EPSILON: f32 = 10e-3;

/// True when every element is within [`IDENTITY_EPSILON`] of the identity.
///
/// A composite this close to identity is never written to the scene, so a
/// scale within 0.01 of 1 (such as 1.009) with no rotation has no effect.
pub fn is_identity(matrix: &Matrix4x4) -> bool {
    matrix.abs_diff_eq(Matrix4x4::IDENTITY, IDENTITY_EPSILON)
}

/// Scale and rotation inputs plus the memoized composite matrix.
///
/// The composite is `scale * (rot_x * rot_y * rot_z)` and is rebuilt only
/// when a setter actually changed a value since the last build.
#[derive(Debug, Clone)]
pub struct TransformParameters {
    scale: f32,
    rotation_x: f32,
    rotation_y: f32,
    rotation_z: f32,
    composite: Matrix4x4,
    dirty: bool,
    builds: u64,
}

impl TransformParameters {
    /// Unit scale, no rotation
    pub fn new() -> Self {
        Self {
            scale: 1.0,
            rotation_x: 0.0,
            rotation_y: 0.0,
            rotation_z: 0.0,
            composite: Matrix4x4::IDENTITY,
            dirty: false,
            builds: 0,
        }
    }

    /// Uniform scale
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Rotation about X, in degrees
    pub fn rotation_x(&self) -> f32 {
        self.rotation_x
    }

    /// Rotation about Y, in degrees
    pub fn rotation_y(&self) -> f32 {
        self.rotation_y
    }

    /// Rotation about Z, in degrees
    pub fn rotation_z(&self) -> f32 {
        self.rotation_z
    }

    /// Set the uniform scale.
    ///
    /// Values within [`IDENTITY_EPSILON`] of 1 are ignored by the patcher
    /// unless a rotation moves the composite away from identity.
    pub fn set_scale(&mut self, value: f32) {
        Self::update(&mut self.scale, value, &mut self.dirty);
    }

    /// Set the rotation about X, in degrees
    pub fn set_rotation_x(&mut self, value: f32) {
        Self::update(&mut self.rotation_x, value, &mut self.dirty);
    }

    /// Set the rotation about Y, in degrees
    pub fn set_rotation_y(&mut self, value: f32) {
        Self::update(&mut self.rotation_y, value, &mut self.dirty);
    }

    /// Set the rotation about Z, in degrees
    pub fn set_rotation_z(&mut self, value: f32) {
        Self::update(&mut self.rotation_z, value, &mut self.dirty);
    }

    /// Whether the composite needs rebuilding
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// The composite matrix, rebuilt first if any input changed
    pub fn composite(&mut self) -> Matrix4x4 {
        if self.dirty {
            self.rebuild();
        }
        self.composite
    }

    /// Number of times the composite has been rebuilt
    pub fn build_count(&self) -> u64 {
        self.builds
    }

    fn update(field: &mut f32, value: f32, dirty: &mut bool) {
        // Bitwise compare so NaN -> NaN is not a change and 0.0 -> -0.0 is.
        if field.to_bits() != value.to_bits() {
            *field = value;
            *dirty = true;
        }
    }

    fn rebuild(&mut self) {
        let scale = Matrix4x4::from_scale(Vector3D::splat(self.scale));
        let rot_x = Matrix4x4::from_rotation_x(self.rotation_x * ROTATION_FACTOR);
        let rot_y = Matrix4x4::from_rotation_y(self.rotation_y * ROTATION_FACTOR);
        let rot_z = Matrix4x4::from_rotation_z(self.rotation_z * ROTATION_FACTOR);

        self.composite = scale * (rot_x * rot_y * rot_z);
        self.dirty = false;
        self.builds += 1;
        tracing::trace!(
            scale = self.scale,
            rotation_x = self.rotation_x,
            rotation_y = self.rotation_y,
            rotation_z = self.rotation_z,
            "rebuilt composite transform"
        );
    }
}

impl Default for TransformParameters {
    fn default() -> Self {
        Self::new()
    }
}
