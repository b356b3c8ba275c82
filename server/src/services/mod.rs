pub mod greeters;
pub mod mock;
