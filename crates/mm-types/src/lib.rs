pub mod candidate;
pub mod errors;
pub mod space;

pub use candidate::*;
pub use errors::*;
pub use space::*;
