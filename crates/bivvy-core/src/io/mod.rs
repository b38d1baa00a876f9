//! IO modules - side effects (network, filesystem)

pub mod fetch;
pub mod install;
