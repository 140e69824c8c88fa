use base64::Engine;

#[derive(Debug, thiserror::Error)]
pub enum TextDecodeError {
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("decoded bytes are not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Decode standard (`+/`, padded) base64.
pub fn from_base64_standard<T>(data: T) -> Result<Vec<u8>, base64::DecodeError>
where
    T: AsRef<[u8]>,
{
    base64::engine::general_purpose::STANDARD.decode(data)
}

/// Decode standard base64 that is known to hold text.
pub fn base64_to_string<T>(data: T) -> Result<String, TextDecodeError>
where
    T: AsRef<[u8]>,
{
    let bytes = from_base64_standard(data)?;

    Ok(String::from_utf8(bytes)?)
}
