//! Geodesic algorithms on triangle meshes.
//!
//! - **Geodesics**: locally shortest paths between surface points, geodesic
//!   interpolation and approximate distance fields ([`geodesic`])
//! - **Bézier curves**: de Casteljau subdivision lifted to the surface
//!   ([`bezier`])

pub mod bezier;
pub mod geodesic;
pub mod progress;

pub use progress::Progress;
