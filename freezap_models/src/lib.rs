pub mod schedule;
pub mod work;
