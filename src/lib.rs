pub mod backend;
pub mod expression;
