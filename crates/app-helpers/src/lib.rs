pub mod encoding;
pub mod text;
