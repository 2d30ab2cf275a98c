pub mod highlight;
pub mod seek_ops;
