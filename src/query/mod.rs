pub mod bfs;
pub mod cfpq;
pub mod rpq;

pub use bfs::{BfsRpqResult, bfs_rpq};
pub use cfpq::{Backend, cfpq, cfpq_closure};
pub use rpq::{intersect, regex_to_min_dfa, rpq};
