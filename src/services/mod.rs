pub mod boundary;
pub mod trail;
