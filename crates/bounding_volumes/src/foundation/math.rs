//! Math utilities and types
//!
//! Provides the fundamental math types used by every bounding volume. All
//! matrices follow nalgebra's column-vector convention: a world-space point
//! is `T * R * S * local`.

pub use nalgebra::{
    Vector3,
    Matrix3, Matrix4,
    Quaternion,
    Rotation3,
    Unit,
};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 3x3 matrix type (pure rotations for oriented volumes)
pub type Mat3 = Matrix3<f32>;

/// 4x4 homogeneous transform type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;

    /// Radians to degrees conversion factor
    pub const RAD_TO_DEG: f32 = 180.0 / PI;
}

/// Math utility functions
pub mod utils {
    use super::{constants, Mat3, Mat4, Vec3};

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Convert radians to degrees
    pub fn rad_to_deg(radians: f32) -> f32 {
        radians * constants::RAD_TO_DEG
    }

    /// Rotation matrix from Euler angles in degrees (roll about X, pitch about Y, yaw about Z)
    pub fn rotation_from_euler_degrees(roll: f32, pitch: f32, yaw: f32) -> Mat3 {
        nalgebra::Rotation3::from_euler_angles(
            deg_to_rad(roll),
            deg_to_rad(pitch),
            deg_to_rad(yaw),
        )
        .into_inner()
    }

    /// Embed a 3x3 rotation into a homogeneous 4x4 matrix
    pub fn rotation_to_homogeneous(rotation: &Mat3) -> Mat4 {
        rotation.to_homogeneous()
    }

    /// Component-wise absolute value of a rotation matrix
    pub fn abs_matrix(matrix: &Mat3) -> Mat3 {
        matrix.map(f32::abs)
    }

    /// Squared length of the XZ (horizontal) part of a vector
    pub fn horizontal_length_squared(v: &Vec3) -> f32 {
        v.x * v.x + v.z * v.z
    }
}

/// Extension trait for Mat3 rotations
pub trait Mat3Ext {
    /// Returns true when the matrix is exactly the identity
    fn is_exact_identity(&self) -> bool;

    /// Returns true when the columns are orthonormal within `epsilon`
    fn is_orthonormal(&self, epsilon: f32) -> bool;
}

impl Mat3Ext for Mat3 {
    fn is_exact_identity(&self) -> bool {
        *self == Mat3::identity()
    }

    fn is_orthonormal(&self, epsilon: f32) -> bool {
        let gram = self.transpose() * self;
        approx::abs_diff_eq!(gram, Mat3::identity(), epsilon = epsilon)
    }
}
