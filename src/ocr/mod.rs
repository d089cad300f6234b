pub mod datetime;
pub mod extract;
pub mod health;
pub mod invoice;
pub mod validate;

pub use datetime::*;
pub use extract::*;
pub use health::*;
pub use invoice::*;
pub use validate::*;
