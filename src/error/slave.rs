/// Failure modes for slave-side request parsing that cannot be represented as
/// a wire-level exception response.
#[derive(Debug)]
pub enum SlaveError {
    /// The request's CRC did not match.
    Crc,

    /// An argument was out of range, or the request buffer was too short to
    /// even contain an address and function code.
    Other,
}

impl core::fmt::Display for SlaveError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SlaveError::Crc => write!(f, "CRC mismatch"),
            SlaveError::Other => write!(f, "invalid argument or request too short"),
        }
    }
}

impl core::error::Error for SlaveError {}
