pub mod acwmap;
pub mod componentdata;
pub mod error;
pub mod logging;
pub mod scanner;

pub use error::Result;
