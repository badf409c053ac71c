pub mod decomp;
pub mod sparse;

pub use decomp::Decomposition;
pub use sparse::{CsrMatrix, RowMatrix};
