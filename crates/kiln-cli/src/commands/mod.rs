//! Command implementations.

pub mod build;
pub mod check;
pub mod print;

pub use build::execute as build_execute;
pub use check::execute as check_execute;
pub use print::execute as print_execute;
