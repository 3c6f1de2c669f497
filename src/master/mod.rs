//! Master-side request building and response parsing.

mod encode;
mod decode;

use crate::error::{ExceptionRecord, MasterError};

/// Which bank a [`DataRecord`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataKind {
    HoldingRegister,
    InputRegister,
    Coil,
    DiscreteInput,
}

/// The payload carried by a [`DataRecord`]: either unpacked coil/discrete-input
/// bits or 16-bit register words, matching whichever function produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Bits(Vec<bool>),
    Words(Vec<u16>),
}

impl Payload {
    /// Returns the payload as bits, if this payload is a [`Payload::Bits`].
    pub fn as_bits(&self) -> Option<&[bool]> {
        match self {
            Payload::Bits(bits) => Some(bits),
            Payload::Words(_) => None,
        }
    }

    /// Returns the payload as words, if this payload is a [`Payload::Words`].
    pub fn as_words(&self) -> Option<&[u16]> {
        match self {
            Payload::Words(words) => Some(words),
            Payload::Bits(_) => None,
        }
    }
}

/// Data successfully parsed out of a slave's response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataRecord {
    pub slave_address: u8,
    pub index: u16,
    pub count: u16,
    pub function: u8,
    pub kind: DataKind,
    pub payload: Payload,
}

/// Owns the request/response buffers and parsed results for one master-side
/// exchange with a slave device.
///
/// A session is reused across exchanges: each `build_request_*` call clears
/// the previous request (and the predicted response length), and
/// [`parse_response`](MasterSession::parse_response) clears the previous
/// `data`/`exception` record before populating one of the two.
#[derive(Debug, Default)]
pub struct MasterSession {
    request: Vec<u8>,
    response: Vec<u8>,
    predicted_response_length: usize,
    data: Option<DataRecord>,
    exception: Option<ExceptionRecord>,
}

impl MasterSession {
    /// Creates an empty session with no request built yet.
    ///
    /// # Examples
    /// ```
    /// use modbus_rtu::MasterSession;
    ///
    /// let session = MasterSession::new();
    /// assert_eq!(session.request(), &[]);
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Releases all buffers and parsed records owned by this session.
    ///
    /// # Examples
    /// ```
    /// use modbus_rtu::MasterSession;
    ///
    /// let mut session = MasterSession::new();
    /// session.build_request_3(0x11, 0x006B, 3).unwrap();
    /// session.close();
    /// assert_eq!(session.request(), &[]);
    /// ```
    pub fn close(&mut self) {
        self.request = Vec::new();
        self.response = Vec::new();
        self.predicted_response_length = 0;
        self.data = None;
        self.exception = None;
    }

    /// The most recently built request frame.
    pub fn request(&self) -> &[u8] {
        &self.request
    }

    /// The buffer the caller should fill with the slave's raw response bytes
    /// before calling [`parse_response`](MasterSession::parse_response).
    pub fn response_mut(&mut self) -> &mut Vec<u8> {
        &mut self.response
    }

    /// The response bytes currently held by the session.
    pub fn response(&self) -> &[u8] {
        &self.response
    }

    /// How many bytes the slave is expected to return for the request most
    /// recently built, or 0 if that request was a broadcast.
    pub fn predicted_response_length(&self) -> usize {
        self.predicted_response_length
    }

    /// The data parsed out of the last successful, non-exception response.
    pub fn data(&self) -> Option<&DataRecord> {
        self.data.as_ref()
    }

    /// The exception recorded by the last response that carried one.
    pub fn exception(&self) -> Option<&ExceptionRecord> {
        self.exception.as_ref()
    }

    fn begin_request(&mut self) {
        self.request.clear();
        self.predicted_response_length = 0;
    }

    /// Builds a Read Coils (`0x01`) request for `count` coils starting at
    /// `index`.
    ///
    /// # Examples
    /// ```
    /// use modbus_rtu::MasterSession;
    ///
    /// let mut session = MasterSession::new();
    /// session.build_request_1(0x11, 0x0013, 0x0025).unwrap();
    /// assert_eq!(session.request()[..2], [0x11, 0x01]);
    /// ```
    pub fn build_request_1(&mut self, address: u8, index: u16, count: u16) -> Result<(), MasterError> {
        self.build_read(0x01, address, index, count)
    }

    /// Builds a Read Discrete Inputs (`0x02`) request.
    pub fn build_request_2(&mut self, address: u8, index: u16, count: u16) -> Result<(), MasterError> {
        self.build_read(0x02, address, index, count)
    }

    /// Builds a Read Holding Registers (`0x03`) request.
    ///
    /// # Examples
    /// ```
    /// use modbus_rtu::MasterSession;
    ///
    /// let mut session = MasterSession::new();
    /// session.build_request_3(0x11, 0x006B, 0x0003).unwrap();
    /// assert_eq!(session.request(), &[0x11, 0x03, 0x00, 0x6B, 0x00, 0x03, 0x76, 0x87]);
    /// ```
    pub fn build_request_3(&mut self, address: u8, index: u16, count: u16) -> Result<(), MasterError> {
        self.build_read(0x03, address, index, count)
    }

    /// Builds a Read Input Registers (`0x04`) request.
    pub fn build_request_4(&mut self, address: u8, index: u16, count: u16) -> Result<(), MasterError> {
        self.build_read(0x04, address, index, count)
    }

    fn build_read(&mut self, function: u8, address: u8, index: u16, count: u16) -> Result<(), MasterError> {
        self.begin_request();
        let is_coil = function == 0x01 || function == 0x02;
        let limit = if is_coil { encode::MAX_READ_COILS } else { encode::MAX_READ_REGISTERS };
        if count == 0 || count > limit || address == 0 {
            return Err(MasterError::Other);
        }
        self.request = encode::build_read(function, address, index, count)?;
        let body = if is_coil { crate::bits::byte_count(count) as usize } else { count as usize * 2 };
        self.predicted_response_length = 5 + body;
        Ok(())
    }

    /// Builds a Write Single Coil (`0x05`) request. Any nonzero `value` is
    /// coerced to the wire-level "on" value `0xFF00`.
    pub fn build_request_5(&mut self, address: u8, index: u16, value: u16) -> Result<(), MasterError> {
        self.begin_request();
        let on = value != 0;
        self.request = encode::build_write_single(0x05, address, index, if on { 0xFF00 } else { 0x0000 })?;
        self.predicted_response_length = if address != 0 { 8 } else { 0 };
        Ok(())
    }

    /// Builds a Write Single Register (`0x06`) request.
    pub fn build_request_6(&mut self, address: u8, index: u16, value: u16) -> Result<(), MasterError> {
        self.begin_request();
        self.request = encode::build_write_single(0x06, address, index, value)?;
        self.predicted_response_length = if address != 0 { 8 } else { 0 };
        Ok(())
    }

    /// Builds a Write Multiple Coils (`0x0F`) request for `count` coils
    /// starting at `index`. `values.len()` must equal `count as usize`.
    pub fn build_request_15(&mut self, address: u8, index: u16, count: u16, values: &[bool]) -> Result<(), MasterError> {
        self.begin_request();
        if count == 0 || count > encode::MAX_WRITE_COILS || values.len() != count as usize {
            return Err(MasterError::Other);
        }
        self.request = encode::build_write_multiple_coils(address, index, count, values)?;
        self.predicted_response_length = if address != 0 { 8 } else { 0 };
        Ok(())
    }

    /// Builds a Write Multiple Registers (`0x10`) request for `count`
    /// registers starting at `index`. `values.len()` must equal
    /// `count as usize`.
    pub fn build_request_16(&mut self, address: u8, index: u16, count: u16, values: &[u16]) -> Result<(), MasterError> {
        self.begin_request();
        if count == 0 || count > encode::MAX_WRITE_REGISTERS || values.len() != count as usize {
            return Err(MasterError::Other);
        }
        self.request = encode::build_write_multiple_registers(address, index, count, values)?;
        self.predicted_response_length = if address != 0 { 8 } else { 0 };
        Ok(())
    }

    /// Builds a Mask Write Register (`0x16`) request.
    pub fn build_request_22(&mut self, address: u8, index: u16, and_mask: u16, or_mask: u16) -> Result<(), MasterError> {
        self.begin_request();
        self.request = encode::build_mask_write(address, index, and_mask, or_mask)?;
        self.predicted_response_length = if address != 0 { 10 } else { 0 };
        Ok(())
    }

    /// Validates the CRC on both the request and the response, then parses
    /// the response against the request most recently built, populating
    /// either [`data`](MasterSession::data) or
    /// [`exception`](MasterSession::exception).
    pub fn parse_response(&mut self) -> Result<(), MasterError> {
        decode::parse_response(self)
    }
}
