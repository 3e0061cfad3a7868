//! Errors raised by bounding-volume construction and collision resolution

/// Collision and geometry errors
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CollisionError {
    /// Cylinder dimensions are negative or not finite
    #[error("invalid cylinder dimensions: radius {radius}, half height {half_height}")]
    InvalidDimensions {
        /// Rejected radius
        radius: f32,
        /// Rejected half height
        half_height: f32,
    },

    /// Box extents are negative or not finite
    #[error("invalid box extents: ({x}, {y}, {z})")]
    InvalidExtents {
        /// Rejected X extent
        x: f32,
        /// Rejected Y extent
        y: f32,
        /// Rejected Z extent
        z: f32,
    },

    /// A best-fit volume was requested for zero points
    #[error("cannot fit a bounding volume to an empty point cloud")]
    EmptyPointCloud,

    /// The vertical correction loop hit its iteration cap
    #[error("penetration still unresolved after {iterations} vertical corrections")]
    UnresolvedPenetration {
        /// Corrections applied before giving up
        iterations: usize,
    },

    /// A tuning parameter is out of range
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}
