pub mod battle;
pub mod defense;
pub mod models;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
