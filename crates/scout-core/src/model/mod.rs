mod entity;
mod search;
#[cfg(test)]
mod tests;

pub use entity::*;
pub use search::*;
