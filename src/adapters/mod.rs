pub mod mock;
pub mod system;
