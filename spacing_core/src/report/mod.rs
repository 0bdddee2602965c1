//! # Text Reports
//!
//! Plain-text renderings of a [`SpacingResult`](crate::calculations::SpacingResult):
//!
//! - [`table`] - Aligned table of shelf positions
//! - [`summary`] - Copyable summary block

pub mod summary;
pub mod table;

pub use summary::render_summary;
pub use table::{SpacingTable, TableRow};
