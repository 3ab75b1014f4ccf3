pub mod compose;
pub mod env;
