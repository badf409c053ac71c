pub mod cfg;
pub mod ecfg;
pub mod rsa;
pub mod wcnf;

pub use cfg::{Cfg, Production, Symbol};
pub use ecfg::Ecfg;
pub use rsa::RecursiveAutomaton;
pub use wcnf::to_wcnf;
