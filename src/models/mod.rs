pub mod forum;
pub mod result;

pub use forum::*;
pub use result::*;
