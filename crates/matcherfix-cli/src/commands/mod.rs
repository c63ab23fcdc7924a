pub mod canonicalize;
pub mod check;
pub mod fix;
pub mod list;
pub mod pack;
