use super::ExceptionRecord;

/// Failure modes for master-side request building and response parsing.
#[derive(Debug)]
pub enum MasterError {
    /// The response replied with a protocol exception. The exception details
    /// are also available via [`crate::MasterSession::exception`].
    Exception(ExceptionRecord),

    /// A CRC check failed on the request or the response.
    Crc,

    /// The response's length or a field inside it did not match what the
    /// request expected.
    Frame,

    /// The response's function code is not one this crate parses.
    Parse,

    /// A buffer allocation failed.
    Alloc,

    /// An argument was out of range, or the session was used inconsistently
    /// (for example, parsing a response before a request was ever built).
    Other,
}

impl core::fmt::Display for MasterError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            MasterError::Exception(record) => {
                write!(f, "device {} raised {} on function 0x{:02X}", record.address, record.code, record.function)
            }
            MasterError::Crc => write!(f, "CRC mismatch"),
            MasterError::Frame => write!(f, "response frame did not match the request"),
            MasterError::Parse => write!(f, "unsupported function code in response"),
            MasterError::Alloc => write!(f, "buffer allocation failed"),
            MasterError::Other => write!(f, "invalid argument or session state"),
        }
    }
}

impl core::error::Error for MasterError {}
