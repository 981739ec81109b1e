pub mod guard;
pub mod time_range;
pub mod usecase;
