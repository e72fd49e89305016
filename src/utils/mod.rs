#[macro_use]
pub mod term;

pub mod format;
pub mod hijri;
