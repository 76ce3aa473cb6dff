pub mod device;
pub mod error;
pub mod test_utils;

pub use device::{Device, FileDevice};
pub use error::ContainerError;
