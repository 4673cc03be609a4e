pub mod annotate;
pub mod check;
pub mod scan;
pub mod util;

pub use annotate::*;
pub use check::*;
pub use scan::*;
pub use util::*;
