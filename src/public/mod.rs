mod model;
mod types;

pub use self::model::*;
pub use self::types::*;

#[cfg(test)]
mod tests;
