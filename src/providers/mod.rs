pub mod ai;
pub mod email;
