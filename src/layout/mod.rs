//! Page layout reconstruction.
//!
//! ```text
//! backend page  ->  Fragment[]  ->  Columns  ->  PageLayout  ->  ordered Fragment[]
//!                   extract         classify     detect          sort
//! ```
//!
//! Every stage except extraction is a pure function of its inputs.

mod columns;
mod detect;
mod extract;
mod order;

pub use columns::{classify, Columns};
pub use detect::{detect, is_two_column, PageLayout, MIN_FRAGMENTS_PER_COLUMN};
pub use extract::FragmentExtractor;
pub use order::{join_texts, sort};

pub use crate::model::ColumnSide;
