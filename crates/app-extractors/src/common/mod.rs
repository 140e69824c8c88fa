pub mod extractor_error;
pub mod html;
pub mod json;
pub mod media_descriptor;
pub mod platform;
pub mod request;
pub mod url;
