pub mod gbx;
pub mod map;
