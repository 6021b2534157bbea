pub mod dose;
pub mod enums;
pub mod regimen;
pub mod result;

pub use dose::*;
pub use enums::*;
pub use regimen::*;
pub use result::*;
