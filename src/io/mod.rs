pub mod base;
pub mod ext;
pub mod handoff;
pub mod source;
