mod cursor;

pub use cursor::*;
