use super::error::Error;
use super::spec;
use std::fmt;
use std::io::prelude::*;
use std::io::ErrorKind;
use std::net::{Shutdown, TcpStream};
use std::time::Duration;

/// Manages a byte stream to a SIP server and handles writing
/// messages and reading terminated responses.
///
/// Any Read + Write stream may be used.  TcpStream is the default.
pub struct Connection<S: Read + Write = TcpStream> {
    stream: S,
    log_prefix: Option<String>,
}

impl<S: Read + Write> fmt::Display for Connection<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(log_prefix) = self.log_prefix.as_ref() {
            write!(f, "{log_prefix} ")
        } else {
            write!(f, "")
        }
    }
}

impl Connection<TcpStream> {
    /// Opens a TCP connection to the SIP server.
    ///
    /// * `sip_host` - SIP server host/ip and port
    /// * E.g. "127.0.0.1:6002"
    ///
    /// ```
    /// use sip2sc::Connection;
    /// assert_eq!(Connection::new("JUNK0+..-*z$@").is_err(), true);
    /// ```
    pub fn new(sip_host: &str) -> Result<Self, Error> {
        log::debug!("Connection::new() connecting to: {}", sip_host);

        match TcpStream::connect(sip_host) {
            Ok(stream) => Ok(Connection::from_stream(stream)),
            Err(s) => {
                log::error!("Connection::new() failed: {s}");
                Err(Error::NetworkError(s.to_string()))
            }
        }
    }

    /// Set the read and write timeouts on the TCP socket.
    ///
    /// If this method is never called, reads and writes block
    /// indefinitely.  A value of None removes the timeout.
    pub fn set_timeout(&mut self, timeout: Option<Duration>) -> Result<(), Error> {
        let result = self
            .stream
            .set_read_timeout(timeout)
            .and_then(|_| self.stream.set_write_timeout(timeout));

        if let Err(e) = result {
            log::error!("{self}Invalid timeout: {timeout:?} {e}");
            return Err(Error::NetworkError(e.to_string()));
        }

        Ok(())
    }

    /// Shutdown the TCP connection with the SIP server.
    pub fn disconnect(&self) -> Result<(), Error> {
        log::debug!("{self}Connection::disconnect()");

        match self.stream.shutdown(Shutdown::Both) {
            Ok(_) => Ok(()),
            Err(s) => {
                log::error!("{self}disconnect() failed: {s}");
                Err(Error::NetworkError(s.to_string()))
            }
        }
    }
}

impl<S: Read + Write> Connection<S> {
    /// Wrap an already open stream.
    pub fn from_stream(stream: S) -> Self {
        Connection {
            stream,
            log_prefix: None,
        }
    }

    /// Add a string that will be prepended to all log:: calls where
    /// a self exists.
    pub fn set_log_prefix(&mut self, prefix: impl Into<String>) {
        self.log_prefix = Some(prefix.into());
    }

    pub fn stream(&self) -> &S {
        &self.stream
    }

    pub fn stream_mut(&mut self) -> &mut S {
        &mut self.stream
    }

    /// Write a fully encoded message, terminator included.
    pub fn send(&mut self, message: &str) -> Result<(), Error> {
        let result = self
            .stream
            .write_all(message.as_bytes())
            .and_then(|_| self.stream.flush());

        if let Err(e) = result {
            log::error!("{self}send() failed: {e}");
            return Err(Error::NetworkError(e.to_string()));
        }

        Ok(())
    }

    /// Read one response, a byte at a time, up to the carriage return.
    ///
    /// The carriage return is not included in the returned bytes.  Line
    /// feeds preceding the response, left over from the previous
    /// terminator, are discarded.  No decoding is done, so a corrupted
    /// response can still have its checksum checked.
    pub fn recv_bytes(&mut self) -> Result<Vec<u8>, Error> {
        let mut bytes: Vec<u8> = Vec::new();
        let mut byte = [0u8; 1];

        loop {
            match self.stream.read(&mut byte) {
                Ok(0) => {
                    log::debug!("{self}Stream closed after {} bytes", bytes.len());
                    return Err(Error::NoResponseError);
                }
                Ok(_) => {}
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    log::error!("{self}recv_bytes() failed: {e}");
                    return Err(Error::NetworkError(e.to_string()));
                }
            }

            match byte[0] {
                spec::RESPONSE_TERMINATOR => break,
                b'\n' if bytes.is_empty() => continue,
                b => bytes.push(b),
            }
        }

        Ok(bytes)
    }
}
