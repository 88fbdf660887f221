pub mod memory;
pub mod search;
pub mod vm;

pub use memory::{Memory, Word};
pub use search::{SearchError, Solution};
pub use vm::{Error, Machine, Status};
