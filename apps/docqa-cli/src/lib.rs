pub mod eval;
pub mod setup;
