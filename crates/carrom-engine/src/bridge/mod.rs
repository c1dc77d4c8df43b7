pub mod protocol;
pub mod sync;
