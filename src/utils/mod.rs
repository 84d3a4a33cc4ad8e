//! Various unsorted geometrical and logical operators.

pub use self::ccw_face_normal::ccw_face_normal;
pub use self::consts::{DEFAULT_ANGULAR_SLOP, DEFAULT_LINEAR_SLOP};
pub(crate) use self::inv::{inv, inv_det};
pub use self::sdp_matrix::{SdpMatrix2, SdpMatrix3};
pub use self::sorted_pair::SortedPair;
pub use self::wops::{normalize, WCross};

mod ccw_face_normal;
mod consts;
mod inv;
mod sdp_matrix;
mod sorted_pair;
mod wops;
