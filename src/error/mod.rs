//! modbus-rtu crate error types

mod master;
pub use master::MasterError;

mod slave;
pub use slave::SlaveError;

/// An exception response, either received by the master or built by the slave.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExceptionRecord {
    /// Address of the device that raised the exception.
    pub address: u8,
    /// Function code the exception was raised against (high bit set).
    pub function: u8,
    /// The exception itself.
    pub code: crate::Exception,
}
