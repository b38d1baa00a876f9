pub mod error;
pub mod launch;
