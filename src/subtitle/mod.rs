pub mod generate;
pub mod sanitize;
pub mod timeline;
