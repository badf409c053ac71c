//! Path queries over edge-labeled directed multigraphs.
//!
//! A path is *admissible* when the word spelled by its edge labels belongs to
//! a query language. The crate answers two families of such queries:
//!
//! * **RPQ**: the language is regular, given as a regular expression over
//!   edge labels. Implemented by automaton intersection plus transitive
//!   closure ([`query::rpq`]) and by a multi-source matrix BFS
//!   ([`query::bfs_rpq`]).
//! * **CFPQ**: the language is context free, given as a grammar in text
//!   form. Implemented by Hellings' worklist algorithm and by a matrix
//!   fixed point ([`query::cfpq`]), both over grammars normalized to weak
//!   Chomsky normal form.
//!
//! Everything is built on a sparse boolean matrix layer ([`matrix`]) and a
//! small finite-automaton toolkit ([`automata`]): graphs and regexes both
//! become automata, automata become per-label boolean decompositions, and
//! the engines are algebra over those decompositions.

pub mod automata;
pub mod cancel;
pub mod errors;
pub mod grammar;
pub mod graph;
pub mod matrix;
pub mod query;
pub mod regex;

pub use automata::{Label, NodeId, StateId};
pub use cancel::CancelToken;
pub use errors::QueryError;
pub use graph::LabeledGraph;
