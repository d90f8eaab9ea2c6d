mod marshals;
mod traits;
mod utils;

pub use self::marshals::*;
pub use self::traits::*;
pub use self::utils::*;
