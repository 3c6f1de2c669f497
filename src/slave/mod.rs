//! Slave-side request parsing, validation, and response building.

mod handlers;

use crate::crc;
use crate::error::SlaveError;
use crate::{Exception, FunctionKind};

/// What the caller should do after [`SlaveSession::parse_request`] returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlaveOutcome {
    /// The request was a broadcast, or this slave's address didn't match;
    /// no response frame was produced and none should be sent.
    NoResponse,
    /// A normal response was built and is ready in
    /// [`SlaveSession::response`].
    Response,
    /// An exception response was built and is ready in
    /// [`SlaveSession::response`].
    Exception,
}

/// The data banks a [`SlaveSession`] exposes to the Modbus master. Bank
/// contents are owned by the caller; the session only borrows them for the
/// duration of a `parse_request` call.
pub struct Banks<'a> {
    pub holding_registers: &'a mut [u16],
    pub input_registers: &'a mut [u16],
    pub coils: &'a mut [bool],
    pub discrete_inputs: &'a mut [bool],
}

/// Write-protection masks, bit-packed LSB-first the same way coil payloads
/// are (§4.2): bit `i` of `register_mask`/`coil_mask` set means register/coil
/// `i` is protected.
pub struct Masks<'a> {
    pub register_mask: &'a [u8],
    pub coil_mask: &'a [u8],
}

impl Masks<'_> {
    pub(crate) fn register_protected(&self, index: u16) -> bool {
        crate::bits::read(self.register_mask, self.register_mask.len(), index as usize).unwrap_or(false)
    }

    pub(crate) fn coil_protected(&self, index: u16) -> bool {
        crate::bits::read(self.coil_mask, self.coil_mask.len(), index as usize).unwrap_or(false)
    }
}

/// Owns a slave identity, borrows its data banks and write-protection masks,
/// and parses incoming request frames against them.
pub struct SlaveSession<'a> {
    address: u8,
    banks: Banks<'a>,
    masks: Masks<'a>,
    request: Vec<u8>,
    response: Vec<u8>,
}

impl<'a> SlaveSession<'a> {
    /// Creates a session for the slave at `address` (1..=247; 0 is reserved
    /// for broadcast and is rejected).
    ///
    /// # Examples
    /// ```
    /// use modbus_rtu::slave::{Banks, Masks, SlaveSession};
    ///
    /// let mut holding = [0u16; 4];
    /// let mut input = [0u16; 0];
    /// let mut coils = [false; 0];
    /// let mut discrete = [false; 0];
    /// let register_mask = [0u8; 1];
    /// let coil_mask = [0u8; 0];
    /// let session = SlaveSession::new(
    ///     0x11,
    ///     Banks {
    ///         holding_registers: &mut holding,
    ///         input_registers: &mut input,
    ///         coils: &mut coils,
    ///         discrete_inputs: &mut discrete,
    ///     },
    ///     Masks { register_mask: &register_mask, coil_mask: &coil_mask },
    /// );
    /// assert!(session.is_ok());
    /// ```
    pub fn new(address: u8, banks: Banks<'a>, masks: Masks<'a>) -> Result<Self, SlaveError> {
        if address == 0 {
            return Err(SlaveError::Other);
        }
        Ok(Self { address, banks, masks, request: Vec::new(), response: Vec::new() })
    }

    /// Releases the request/response buffers owned by this session.
    pub fn close(&mut self) {
        self.request = Vec::new();
        self.response = Vec::new();
    }

    /// This slave's configured address.
    pub fn address(&self) -> u8 {
        self.address
    }

    /// The buffer the caller should fill with an incoming request's raw
    /// bytes before calling [`parse_request`](SlaveSession::parse_request).
    pub fn request_mut(&mut self) -> &mut Vec<u8> {
        &mut self.request
    }

    /// The response frame built by the last `parse_request` call, or empty
    /// if none should be sent.
    pub fn response(&self) -> &[u8] {
        &self.response
    }

    /// Parses the bytes in [`request_mut`](SlaveSession::request_mut) against
    /// this slave's address, banks, and masks, applying any writes and
    /// building the matching response (or exception) frame.
    pub fn parse_request(&mut self) -> Result<SlaveOutcome, SlaveError> {
        self.response.clear();

        if self.request.len() < 4 {
            return Err(SlaveError::Other);
        }
        if !crc::verify(&self.request) {
            return Err(SlaveError::Crc);
        }

        let request_address = self.request[0];
        let broadcast = request_address == 0;
        if !broadcast && request_address != self.address {
            return Ok(SlaveOutcome::NoResponse);
        }

        let function = self.request[1];
        let outcome = match FunctionKind::from_code(function) {
            Some(FunctionKind::ReadCoils) => handlers::read_bits(self, broadcast, BitBank::Coils),
            Some(FunctionKind::ReadDiscreteInputs) => handlers::read_bits(self, broadcast, BitBank::DiscreteInputs),
            Some(FunctionKind::ReadHoldingRegisters) => handlers::read_registers(self, broadcast, RegisterBank::Holding),
            Some(FunctionKind::ReadInputRegisters) => handlers::read_registers(self, broadcast, RegisterBank::Input),
            Some(FunctionKind::WriteSingleCoil) => handlers::write_single_coil(self, broadcast),
            Some(FunctionKind::WriteSingleRegister) => handlers::write_single_register(self, broadcast),
            Some(FunctionKind::WriteMultipleCoils) => handlers::write_multiple_coils(self, broadcast),
            Some(FunctionKind::WriteMultipleRegisters) => handlers::write_multiple_registers(self, broadcast),
            Some(FunctionKind::MaskWriteRegister) => handlers::mask_write_register(self, broadcast),
            None => {
                if broadcast {
                    handlers::HandlerOutcome::NoResponse
                } else {
                    handlers::HandlerOutcome::Exception(Exception::IllegalFunction)
                }
            }
        };

        match outcome {
            handlers::HandlerOutcome::NoResponse => Ok(SlaveOutcome::NoResponse),
            handlers::HandlerOutcome::Response(bytes) => {
                self.response = bytes;
                Ok(SlaveOutcome::Response)
            }
            handlers::HandlerOutcome::Exception(code) => {
                #[cfg(feature = "log")]
                log::trace!("slave {} built exception {} for function 0x{:02X}", self.address, code, function);
                self.response = handlers::build_exception(self.address, function, code);
                Ok(SlaveOutcome::Exception)
            }
        }
    }
}

pub(crate) enum BitBank {
    Coils,
    DiscreteInputs,
}

pub(crate) enum RegisterBank {
    Holding,
    Input,
}
