//! Ambient helpers shared by the codec and the optional transport layer.

pub mod baudrate;
pub use baudrate::Baudrate;