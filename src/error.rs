//! Unified error types for the SmartGrow firmware.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! top-level control loop's error handling uniform. No condition in this
//! firmware is fatal to the process: the device degrades individual cycles
//! and keeps running.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A sensor could not be read or returned out-of-range data.
    Sensor(SensorError),
    /// The reporting channel to the coordinator failed.
    Transport(TransportError),
    /// A coordinator command failed validation.
    Command(CommandError),
    /// A safety interlock was violated.
    Safety(SafetyFault),
    /// Peripheral initialisation failed.
    Init(&'static str),
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Transport(e) => write!(f, "transport: {e}"),
            Self::Command(e) => write!(f, "command: {e}"),
            Self::Safety(e) => write!(f, "safety: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

/// Sensor read failures. Never propagated out of the sampling layer — the
/// hub substitutes the documented fallback values and logs instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// DHT11 returned NaN or timed out on the one-wire handshake.
    DhtReadFailed,
    /// ADC read returned an error.
    AdcReadFailed,
    /// GPIO read returned an error.
    GpioReadFailed,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DhtReadFailed => write!(f, "DHT read failed"),
            Self::AdcReadFailed => write!(f, "ADC read failed"),
            Self::GpioReadFailed => write!(f, "GPIO read failed"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Transport errors
// ---------------------------------------------------------------------------

/// Failures on the reporting channel. Logged by the caller and degraded to
/// an empty command batch; the next report cycle is the natural retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// TCP/TLS connection to the coordinator could not be established.
    ConnectFailed,
    /// The request was sent but the coordinator answered with a non-200 code.
    HttpStatus(u16),
    /// The request body could not be serialized.
    EncodeFailed,
    /// The response body was not valid JSON for the expected schema.
    InvalidResponse,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConnectFailed => write!(f, "connect failed"),
            Self::HttpStatus(code) => write!(f, "HTTP status {code}"),
            Self::EncodeFailed => write!(f, "request encode failed"),
            Self::InvalidResponse => write!(f, "invalid response body"),
        }
    }
}

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}

// ---------------------------------------------------------------------------
// Command validation errors
// ---------------------------------------------------------------------------

/// Terminal per-command validation failures, always surfaced to the
/// coordinator as a `failed` status report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandError {
    /// Parameters missing, undecodable, or out of range (e.g. volume ≤ 0).
    InvalidParameters,
    /// The command type tag is not recognised by this firmware.
    UnsupportedType,
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParameters => write!(f, "Invalid parameters"),
            Self::UnsupportedType => write!(f, "Unsupported command type"),
        }
    }
}

impl From<CommandError> for Error {
    fn from(e: CommandError) -> Self {
        Self::Command(e)
    }
}

// ---------------------------------------------------------------------------
// Safety faults
// ---------------------------------------------------------------------------

/// Safety faults override normal operation unconditionally. They are
/// accumulated in a bitfield by the safety supervisor so set/clear
/// transitions can be edge-logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SafetyFault {
    /// Rain sensor reports wet — irrigation is forbidden while set.
    RainDetected = 0b0000_0001,
}

impl SafetyFault {
    /// Return the bitmask for this fault.
    pub const fn mask(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for SafetyFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RainDetected => write!(f, "rain detected"),
        }
    }
}

impl From<SafetyFault> for Error {
    fn from(e: SafetyFault) -> Self {
        Self::Safety(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
