pub mod error;
pub mod geometry;
pub mod primitive;
pub mod tree;

pub use error::TreeError;
pub use geometry::{Bounds, IdPoint, Located, Point, Point2, Point4, Rect2, Rect4};
pub use primitive::AabbRect;
pub use tree::{Tree, TreeNodeIndex, TreeParameter};

// Reexport necessary items.
pub use slotmap::Key;

#[cfg(feature = "fixed")]
pub extern crate fixed;

#[cfg(feature = "glam")]
pub extern crate glam;

pub extern crate derive_more;
