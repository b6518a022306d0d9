mod capture;
mod convert;
mod core;
mod field;
mod options;
mod parameter;
mod validate;

pub use self::core::*;
pub use capture::*;
pub use convert::*;
pub use field::*;
pub use options::*;
pub use parameter::Parameter;
pub use validate::*;
