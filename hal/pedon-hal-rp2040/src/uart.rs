//! Buffered-UART adapters for the node's two serial buses
//!
//! The protocol engines poll bytes instead of awaiting them, so these
//! adapters bridge embassy's buffered UART halves to the polled
//! `SerialLink` shape. The SDI-12 variant also owns the bus discipline:
//! a wake-up break plus marking before every command, and a transmit
//! direction gate so the half-duplex line driver never feeds our own
//! bytes back into the receiver.

use core::task::Poll;

use embassy_futures::{block_on, poll_once};
use embassy_rp::gpio::Output;
use embassy_rp::uart::{BufferedUartRx, BufferedUartTx};
use embassy_time::{block_for, Duration};
use embedded_io_async::{Read, Write};

use pedon_core::SerialLink;
use pedon_hal::uart::{DataBits, Parity, StopBits};

// Re-export the shared settings type next to its converter
pub use pedon_hal::uart::UartConfig;

/// Break length before an SDI-12 command, in bit times. The bus wants at
/// least 12 ms; sixteen bit times at 1200 baud is a touch over 13 ms.
const SDI12_BREAK_BITS: u32 = 16;

/// Marking time between break end and the first command byte (spec
/// minimum is 8.33 ms).
const SDI12_MARK: Duration = Duration::from_millis(9);

/// One 7E1 byte on the wire at 1200 baud, rounded up.
const SDI12_BYTE_US: u64 = 8_340;

/// Convert shared UART settings to the embassy-rp form.
pub fn uart_config(cfg: UartConfig) -> embassy_rp::uart::Config {
    let mut out = embassy_rp::uart::Config::default();
    out.baudrate = cfg.baudrate;
    out.data_bits = match cfg.data_bits {
        DataBits::Seven => embassy_rp::uart::DataBits::DataBits7,
        DataBits::Eight => embassy_rp::uart::DataBits::DataBits8,
    };
    out.parity = match cfg.parity {
        Parity::None => embassy_rp::uart::Parity::ParityNone,
        Parity::Even => embassy_rp::uart::Parity::ParityEven,
        Parity::Odd => embassy_rp::uart::Parity::ParityOdd,
    };
    out.stop_bits = match cfg.stop_bits {
        StopBits::One => embassy_rp::uart::StopBits::STOP1,
        StopBits::Two => embassy_rp::uart::StopBits::STOP2,
    };
    out
}

/// Plain buffered-UART `SerialLink`, used for the tile modem.
pub struct TileSerial {
    tx: BufferedUartTx,
    rx: BufferedUartRx,
}

impl TileSerial {
    pub fn new(tx: BufferedUartTx, rx: BufferedUartRx) -> Self {
        Self { tx, rx }
    }
}

impl SerialLink for TileSerial {
    fn poll_byte(&mut self) -> Option<u8> {
        poll_ring(&mut self.rx)
    }

    fn write(&mut self, bytes: &[u8]) -> usize {
        match block_on(self.tx.write_all(bytes)) {
            Ok(()) => bytes.len(),
            Err(_) => 0,
        }
    }
}

/// SDI-12 `SerialLink` with the bus wake-up discipline folded into
/// `write`.
///
/// The front end is a direction-gated level shifter: `dir` high drives
/// the line, low listens. Commands are short (five bytes at most), so
/// holding the task through break, marking and the command itself stays
/// under 80 ms.
pub struct Sdi12Serial {
    tx: BufferedUartTx,
    rx: BufferedUartRx,
    dir: Output<'static>,
}

impl Sdi12Serial {
    /// # Arguments
    /// * `tx`, `rx` - buffered halves of the SDI-12 UART (1200 7E1)
    /// * `dir` - transmit-enable pin of the line driver, active high
    pub fn new(tx: BufferedUartTx, rx: BufferedUartRx, dir: Output<'static>) -> Self {
        Self { tx, rx, dir }
    }
}

impl SerialLink for Sdi12Serial {
    fn poll_byte(&mut self) -> Option<u8> {
        poll_ring(&mut self.rx)
    }

    fn write(&mut self, bytes: &[u8]) -> usize {
        self.dir.set_high();
        block_on(self.tx.send_break(SDI12_BREAK_BITS));
        block_for(SDI12_MARK);
        let sent = match block_on(self.tx.write_all(bytes)) {
            Ok(()) => bytes.len(),
            Err(_) => 0,
        };
        let _ = block_on(self.tx.flush());
        // flush drains the ring buffer, not the FIFO; keep driving until
        // the last byte has left the wire
        block_for(Duration::from_micros(sent as u64 * SDI12_BYTE_US + 2_000));
        self.dir.set_low();
        sent
    }
}

/// Single non-blocking read from a buffered RX half.
fn poll_ring(rx: &mut BufferedUartRx) -> Option<u8> {
    let mut byte = [0u8; 1];
    match poll_once(rx.read(&mut byte)) {
        Poll::Ready(Ok(n)) if n > 0 => Some(byte[0]),
        _ => None,
    }
}
