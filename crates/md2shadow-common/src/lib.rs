pub mod endian;
pub mod mathlib;
pub mod qfiles;
pub mod config;
