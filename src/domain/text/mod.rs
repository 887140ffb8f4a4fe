pub mod boundary;
pub mod mapping;
