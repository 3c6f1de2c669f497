//! Optional blocking Modbus RTU master transport backed by the `serialport`
//! crate.
//!
//! This module is not part of the codec's correctness surface (§1, §10.5 of
//! the design notes): it is a convenience wrapper that drives a
//! [`MasterSession`] over a real serial link, honoring the Modbus RTU T3.5
//! idle interval between frames the way the teacher crate's own transport
//! helper does.

use crate::common::baudrate::Baudrate;
use crate::error::MasterError;
use crate::MasterSession;

/// Failure modes specific to driving a [`MasterSession`] over a serial port.
#[derive(Debug)]
pub enum TransportError {
    /// The underlying serial port returned an I/O error.
    Io(std::io::Error),
    /// The codec itself rejected the request or response.
    Master(MasterError),
}

impl core::fmt::Display for TransportError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            TransportError::Io(err) => write!(f, "serial I/O error: {err}"),
            TransportError::Master(err) => write!(f, "modbus error: {err}"),
        }
    }
}

impl std::error::Error for TransportError {}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        TransportError::Io(err)
    }
}

impl From<MasterError> for TransportError {
    fn from(err: MasterError) -> Self {
        TransportError::Master(err)
    }
}

/// Blocking Modbus RTU master that enforces Modbus idle timing rules between
/// frames sent over a real serial port.
#[derive(Debug)]
pub struct Master {
    port: Box<dyn serialport::SerialPort>,
    last_tx: std::time::Instant,
    baud_rate: u32,
}

impl Master {
    /// Opens `path` configured 8N1 (RS-485 style) at `baud_rate`, with the
    /// read timeout pinned to the Modbus RTU T3.5 silent interval for that
    /// speed.
    ///
    /// # Examples
    /// ```ignore
    /// use modbus_rtu::transport::Master;
    ///
    /// # fn demo() -> serialport::Result<()> {
    /// let master = Master::new_rs485("/dev/ttyUSB0", 9_600)?;
    /// assert_eq!(master.baud_rate(), 9_600);
    /// # Ok(())
    /// # }
    /// ```
    pub fn new_rs485(path: &str, baud_rate: u32) -> serialport::Result<Self> {
        let idle = idle_interval(baud_rate);
        let port = serialport::new(path, baud_rate)
            .data_bits(serialport::DataBits::Eight)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One)
            .timeout(idle)
            .open()?;
        Ok(Self { port, last_tx: std::time::Instant::now() - idle, baud_rate })
    }

    /// The baud rate currently configured on the serial link.
    pub fn baud_rate(&self) -> u32 {
        self.baud_rate
    }

    /// Updates the serial baud rate and the matching Modbus idle timeout.
    pub fn set_baud_rate(&mut self, baud_rate: u32) -> serialport::Result<()> {
        self.port.set_baud_rate(baud_rate)?;
        self.port.set_timeout(idle_interval(baud_rate))?;
        self.baud_rate = baud_rate;
        self.last_tx = std::time::Instant::now();
        Ok(())
    }

    /// Transmits the request already built in `session`, waits the required
    /// idle interval, and (unless the request is a broadcast) reads back a
    /// response into `session` and parses it in place.
    ///
    /// Broadcasts (`predicted_response_length() == 0`) return as soon as the
    /// frame is flushed, since the Modbus RTU spec forbids a response to
    /// address 0.
    ///
    /// # Examples
    /// ```ignore
    /// use modbus_rtu::{transport::Master, MasterSession};
    ///
    /// # fn demo() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut master = Master::new_rs485("/dev/ttyUSB0", 19_200)?;
    /// let mut session = MasterSession::new();
    /// session.build_request_3(0x11, 0x006B, 3)?;
    /// master.send(&mut session)?;
    /// assert!(session.data().is_some());
    /// # Ok(())
    /// # }
    /// ```
    pub fn send(&mut self, session: &mut MasterSession) -> Result<(), TransportError> {
        self.wait_idle();
        self.port.clear(serialport::ClearBuffer::Output)?;
        self.write(session.request().to_vec().as_slice())?;

        if session.predicted_response_length() == 0 {
            return Ok(());
        }

        let mut buf = [0u8; 256];
        let len = self.read(&mut buf, session.predicted_response_length())?;
        if len == 0 {
            return Err(TransportError::Io(std::io::ErrorKind::TimedOut.into()));
        }
        *session.response_mut() = buf[..len].to_vec();
        session.parse_response()?;
        Ok(())
    }

    fn wait_idle(&self) {
        let idle = idle_interval(self.baud_rate);
        while self.last_tx.elapsed() <= idle {
            std::thread::sleep(std::time::Duration::from_micros(1));
        }
    }

    fn write(&mut self, frame: &[u8]) -> Result<(), TransportError> {
        self.port.write_all(frame)?;
        self.last_tx = std::time::Instant::now();
        Ok(())
    }

    /// Reads until at least `expected` bytes have arrived or the port's idle
    /// timeout elapses with nothing further incoming.
    fn read(&mut self, buf: &mut [u8; 256], expected: usize) -> Result<usize, TransportError> {
        let expected = expected.min(buf.len());
        let mut len = 0usize;
        loop {
            match self.port.read(&mut buf[len..]) {
                Ok(0) => break,
                Ok(n) => {
                    len += n;
                    if len >= expected {
                        break;
                    }
                }
                Err(ref e) if e.kind() == std::io::ErrorKind::TimedOut => break,
                Err(e) => return Err(TransportError::Io(e)),
            }
        }
        Ok(len)
    }
}

/// Computes the Modbus RTU T3.5 idle interval for an 8N1 link running at
/// `baud_rate`. Falls back to the raw 3.5-character formula for baud rates
/// outside [`Baudrate`]'s fixed set of standard speeds.
fn idle_interval(baud_rate: u32) -> std::time::Duration {
    match Baudrate::try_from(baud_rate) {
        Ok(br) => std::time::Duration::from_micros(br.packet_end_us()),
        Err(()) => std::time::Duration::from_secs_f64(3.5 * 10.0 / baud_rate as f64),
    }
}
