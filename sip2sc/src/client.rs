use super::catalog::{self, Summary, UnitStatus};
use super::checksum;
use super::config::Config;
use super::connection::Connection;
use super::error::Error;
use super::message::Message;
use super::response::{self, ParsedResponse};
use super::sequence::SequenceCounter;
use super::util;
use std::io::{Read, Write};
use std::net::TcpStream;

/// SIP2 self-check client.
///
/// Owns the configuration, the connection, and the sequence and retry
/// counters.  One request is outstanding at a time.
///
/// ```no_run
/// use sip2sc::{Client, Config, Summary};
///
/// let config = Config::builder()
///     .set_host("sip.example.org")
///     .set_patron("101010101")
///     .set_patron_pwd("010101")
///     .build()
///     .expect("valid config");
///
/// let mut client = Client::connect(config).expect("Cannot Connect");
///
/// client.login("sip-user", "sip-pass").expect("Login Error");
///
/// let resp = client.patron_info(Summary::Charged, 1, 5).expect("Patron Info");
/// println!("charged items: {:?}", resp.fixed_count("ChargedCount"));
///
/// client.disconnect().ok();
/// ```
pub struct Client<S: Read + Write = TcpStream> {
    config: Config,
    connection: Connection<S>,
    seq: SequenceCounter,

    // Consecutive checksum failures.  Reset only by a valid response.
    retry: usize,
}

impl Client<TcpStream> {
    /// Opens the TCP connection to the configured host and port.
    pub fn connect(config: Config) -> Result<Self, Error> {
        log::debug!("SIP2: connecting to {}", config.address());

        let mut connection = Connection::new(&config.address())?;

        if config.timeout().is_some() {
            connection.set_timeout(config.timeout())?;
        }

        Ok(Client::from_connection(config, connection))
    }

    /// Shutdown the TCP connection with the SIP server.
    pub fn disconnect(&self) -> Result<(), Error> {
        self.connection.disconnect()
    }
}

impl<S: Read + Write> Client<S> {
    /// Create a client around an already opened connection.
    pub fn from_connection(config: Config, connection: Connection<S>) -> Self {
        Client {
            config,
            connection,
            seq: SequenceCounter::new(),
            retry: 0,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn connection(&self) -> &Connection<S> {
        &self.connection
    }

    pub fn connection_mut(&mut self) -> &mut Connection<S> {
        &mut self.connection
    }

    /// Checksum failures since the last valid response.
    pub fn retry_count(&self) -> usize {
        self.retry
    }

    /// Transaction date stamp in local time, or UTC if configured.
    fn date_stamp(&self) -> String {
        match self.config.utc_dates() {
            true => util::sip_date_utc_now(),
            false => util::sip_date_now(),
        }
    }

    /// Assign the next sequence number and produce the wire message.
    fn encode(&mut self, msg: Message) -> String {
        let seq = self.seq.next();

        log::info!("{}OUTBOUND: {}", self.connection, msg.to_sip_redacted());

        let body = msg.checksum_body(Some(seq));

        // Transliterate before the checksum is computed.
        let body = match self.config.ascii() {
            true => util::ascii_string(&body),
            false => body,
        };

        checksum::seal(&body, self.config.terminator())
    }

    pub fn msg_login(&mut self, login_id: &str, password: &str) -> Result<String, Error> {
        let msg = catalog::login(&self.config, login_id, password)?;
        Ok(self.encode(msg))
    }

    pub fn msg_sc_status(
        &mut self,
        status: UnitStatus,
        width: u16,
        version: f32,
    ) -> Result<String, Error> {
        let msg = catalog::sc_status(status, width, version)?;
        Ok(self.encode(msg))
    }

    pub fn msg_patron_status(&mut self) -> Result<String, Error> {
        let msg = catalog::patron_status(&self.config, &self.date_stamp())?;
        Ok(self.encode(msg))
    }

    pub fn msg_patron_info(
        &mut self,
        summary: Summary,
        start: usize,
        end: usize,
    ) -> Result<String, Error> {
        let msg = catalog::patron_info(&self.config, &self.date_stamp(), summary, start, end)?;
        Ok(self.encode(msg))
    }

    pub fn msg_item_info(&mut self, item: &str) -> Result<String, Error> {
        let msg = catalog::item_info(&self.config, &self.date_stamp(), item)?;
        Ok(self.encode(msg))
    }

    pub fn msg_renew(
        &mut self,
        item: &str,
        title: &str,
        nb_due_date: &str,
        item_properties: &str,
        fee_acknowledged: bool,
    ) -> Result<String, Error> {
        let msg = catalog::renew(
            &self.config,
            &self.date_stamp(),
            item,
            title,
            nb_due_date,
            item_properties,
            fee_acknowledged,
        )?;
        Ok(self.encode(msg))
    }

    /// Returns Err without consuming a sequence number if the mode or
    /// hold type is invalid.
    pub fn msg_hold(
        &mut self,
        mode: char,
        expiration_date: &str,
        hold_type: u8,
        item: &str,
        title: &str,
        fee_acknowledged: bool,
    ) -> Result<String, Error> {
        let msg = catalog::hold(
            &self.config,
            &self.date_stamp(),
            mode,
            expiration_date,
            hold_type,
            item,
            title,
            fee_acknowledged,
        )?;
        Ok(self.encode(msg))
    }

    pub fn msg_end_patron_session(&mut self) -> Result<String, Error> {
        let msg = catalog::end_patron_session(&self.config, &self.date_stamp())?;
        Ok(self.encode(msg))
    }

    pub fn msg_block_patron(&mut self, message: &str, card_retained: bool) -> Result<String, Error> {
        let msg = catalog::block_patron(&self.config, &self.date_stamp(), message, card_retained)?;
        Ok(self.encode(msg))
    }

    /// Resend requests carry no sequence number.
    pub fn msg_request_resend(&self) -> String {
        catalog::request_resend().encode(None, self.config.terminator())
    }

    /// Send a wire message and return the first response which passes
    /// checksum validation, minus its terminator.
    ///
    /// The checksum is verified over the bytes as received.  A valid
    /// response which is not UTF-8 is decoded as Latin-1.
    ///
    /// On a checksum failure the same message is sent again.  Once the
    /// number of consecutive failures reaches the configured maximum,
    /// Error::RetriesExhausted is returned.  Transport errors are
    /// returned immediately.
    pub fn get_message(&mut self, message: &str) -> Result<String, Error> {
        let max_retry = self.config.max_retry();
        let mut attempts = 0;

        loop {
            attempts += 1;

            log::debug!("{}SIP2: sending request, attempt {attempts}", self.connection);
            self.connection.send(message)?;

            let bytes = self.connection.recv_bytes()?;
            log::info!(
                "{}INBOUND: {}",
                self.connection,
                String::from_utf8_lossy(&bytes)
            );

            // Verified before decoding so corrupted bytes are resent
            // rather than rejected.
            if checksum::verify_bytes(&bytes) {
                self.retry = 0;
                log::debug!("{}SIP2: response passed checksum check", self.connection);
                return Ok(util::decode_response(&bytes));
            }

            self.retry += 1;

            if self.retry < max_retry {
                log::warn!(
                    "{}SIP2: response failed checksum check, retrying ({})",
                    self.connection,
                    self.retry
                );
                continue;
            }

            log::error!(
                "{}SIP2: failed to get a valid checksum after {max_retry} retries",
                self.connection
            );

            return Err(Error::RetriesExhausted(attempts));
        }
    }

    /// Login to the SIP server.
    ///
    /// Returns the raw Login Response.
    pub fn login(&mut self, login_id: &str, password: &str) -> Result<String, Error> {
        let msg = self.msg_login(login_id, password)?;
        self.get_message(&msg)
    }

    /// Send the SC Status message.
    ///
    /// Returns the raw ACS Status response.
    pub fn sc_status(
        &mut self,
        status: UnitStatus,
        width: u16,
        version: f32,
    ) -> Result<String, Error> {
        let msg = self.msg_sc_status(status, width, version)?;
        self.get_message(&msg)
    }

    /// Returns the raw Patron Status Response.
    pub fn patron_status(&mut self) -> Result<String, Error> {
        let msg = self.msg_patron_status()?;
        self.get_message(&msg)
    }

    pub fn patron_info(
        &mut self,
        summary: Summary,
        start: usize,
        end: usize,
    ) -> Result<ParsedResponse, Error> {
        let msg = self.msg_patron_info(summary, start, end)?;
        let resp = self.get_message(&msg)?;
        Ok(response::parse_patron_info_response(&resp))
    }

    pub fn item_info(&mut self, item: &str) -> Result<ParsedResponse, Error> {
        let msg = self.msg_item_info(item)?;
        let resp = self.get_message(&msg)?;
        Ok(response::parse_item_info_response(&resp))
    }

    pub fn renew(
        &mut self,
        item: &str,
        title: &str,
        nb_due_date: &str,
        item_properties: &str,
        fee_acknowledged: bool,
    ) -> Result<ParsedResponse, Error> {
        let msg = self.msg_renew(item, title, nb_due_date, item_properties, fee_acknowledged)?;
        let resp = self.get_message(&msg)?;
        Ok(response::parse_renew_response(&resp))
    }

    pub fn hold(
        &mut self,
        mode: char,
        expiration_date: &str,
        hold_type: u8,
        item: &str,
        title: &str,
        fee_acknowledged: bool,
    ) -> Result<ParsedResponse, Error> {
        let msg = self.msg_hold(mode, expiration_date, hold_type, item, title, fee_acknowledged)?;
        let resp = self.get_message(&msg)?;
        Ok(response::parse_hold_response(&resp))
    }

    pub fn end_patron_session(&mut self) -> Result<ParsedResponse, Error> {
        let msg = self.msg_end_patron_session()?;
        let resp = self.get_message(&msg)?;
        Ok(response::parse_end_session_response(&resp))
    }

    /// Returns the raw Patron Status Response sent in reply.
    pub fn block_patron(&mut self, message: &str, card_retained: bool) -> Result<String, Error> {
        let msg = self.msg_block_patron(message, card_retained)?;
        self.get_message(&msg)
    }

    /// Ask the ACS to resend its last response.
    pub fn request_resend(&mut self) -> Result<String, Error> {
        let msg = self.msg_request_resend();
        self.get_message(&msg)
    }
}
