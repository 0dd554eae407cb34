pub mod format;
pub mod io;

pub use format::*;
pub use io::*;
