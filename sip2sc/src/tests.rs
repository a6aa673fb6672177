use super::checksum;
use super::client::Client;
use super::config::Config;
use super::connection::Connection;
use super::error::Error;
use super::{Summary, UnitStatus};
use std::collections::VecDeque;
use std::io;

/// In-memory stream which replays canned ACS responses and records
/// everything written to it.
#[derive(Default)]
struct MockStream {
    inbound: VecDeque<u8>,
    outbound: Vec<u8>,
    // One flush per message sent.
    sends: usize,
}

impl MockStream {
    fn with_responses(responses: &[&str]) -> Self {
        let mut stream = MockStream::default();
        for r in responses {
            stream.inbound.extend(r.as_bytes());
        }
        stream
    }

    fn with_bytes(responses: &[&[u8]]) -> Self {
        let mut stream = MockStream::default();
        for r in responses {
            stream.inbound.extend(r.iter());
        }
        stream
    }

    fn outbound(&self) -> String {
        String::from_utf8(self.outbound.clone()).unwrap()
    }
}

impl io::Read for MockStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut count = 0;
        while count < buf.len() {
            match self.inbound.pop_front() {
                Some(b) => buf[count] = b,
                None => break,
            }
            count += 1;
        }
        Ok(count)
    }
}

impl io::Write for MockStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.outbound.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.sends += 1;
        Ok(())
    }
}

fn client(config: Config, responses: &[&str]) -> Client<MockStream> {
    let con = Connection::from_stream(MockStream::with_responses(responses));
    Client::from_connection(config, con)
}

fn default_config() -> Config {
    Config::builder().build().unwrap()
}

/// Append a valid checksum and CRLF to a response body.
fn signed(body: &str) -> String {
    format!("{body}{}\r\n", checksum::checksum(body))
}

const END_SESSION_BODY: &str = "36Y20080228    145537AOWOHLERS|AAX00000000|AY9AZ";
const BAD_RESPONSE: &str = "36Y20080228    145537AOWOHLERS|AAX00000000|AY9AZ0000\r\n";

#[test]
fn login_message() {
    let mut client = client(default_config(), &[]);
    let msg = client.msg_login("testuser", "testpass").unwrap();
    assert_eq!(msg, "9300CNtestuser|COtestpass|CP|AY0AZF3AF\r\n");
    assert!(checksum::verify(msg.trim_end()));
}

#[test]
fn sequence_advances_per_message() {
    let mut client = client(default_config(), &[]);

    for expected in [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 0] {
        let msg = client.msg_login("u", "p").unwrap();
        assert!(msg.contains(&format!("|AY{expected}AZ")), "{msg}");
    }
}

#[test]
fn resend_request_skips_sequence() {
    let mut client = client(default_config(), &[]);
    assert_eq!(client.msg_request_resend(), "97AZFEF5\r\n");

    let msg = client.msg_login("u", "p").unwrap();
    assert!(msg.contains("|AY0AZ"));
}

#[test]
fn invalid_hold_consumes_nothing() {
    let mut client = client(default_config(), &[]);

    assert_eq!(
        client.msg_hold('?', "", 2, "item", "title", false),
        Err(Error::InvalidHoldMode('?'))
    );
    assert_eq!(
        client.hold('+', "", 0, "item", "title", false),
        Err(Error::InvalidHoldType(0))
    );

    assert_eq!(client.connection().stream().sends, 0);

    let msg = client.msg_login("u", "p").unwrap();
    assert!(msg.contains("|AY0AZ"));
}

#[test]
fn dated_messages() {
    let config = Config::builder()
        .set_institution("INST")
        .set_patron("101010101")
        .set_patron_pwd("010101")
        .build()
        .unwrap();

    let mut client = client(config, &[]);

    let msg = client.msg_patron_info(Summary::Hold, 1, 5).unwrap();
    assert!(msg.starts_with("63001"));
    assert_eq!(&msg[13..17], "    ");
    assert_eq!(&msg[23..33], "Y         ");
    assert!(msg.contains("AOINST|AA101010101|AC|AD010101|BP00001|BQ00005|AY0AZ"));
    assert!(msg.ends_with("\r\n"));
    assert!(checksum::verify(msg.trim_end()));

    let msg = client.msg_end_patron_session().unwrap();
    assert!(msg.starts_with("35"));
    assert!(msg.contains("AY1AZ"));
    assert!(checksum::verify(msg.trim_end()));

    let msg = client.msg_sc_status(UnitStatus::Ok, 80, 2.0).unwrap();
    assert!(msg.starts_with("990 802.00AY2AZ"));
}

#[test]
fn get_message_success() {
    let good = signed(END_SESSION_BODY);
    let mut client = client(default_config(), &[&good]);

    let resp = client.end_patron_session().unwrap();

    assert_eq!(resp.fixed_str("EndSession"), Some("Y"));
    assert_eq!(resp.value("AO"), Some("WOHLERS"));
    assert_eq!(client.retry_count(), 0);
    assert_eq!(client.connection().stream().sends, 1);
}

#[test]
fn retry_until_exhausted() {
    let config = Config::builder().set_max_retry(3).build().unwrap();
    let mut client = client(config, &[BAD_RESPONSE, BAD_RESPONSE, BAD_RESPONSE]);

    let msg = client.msg_login("u", "p").unwrap();

    assert_eq!(client.get_message(&msg), Err(Error::RetriesExhausted(3)));
    assert_eq!(client.connection().stream().sends, 3);
    assert_eq!(client.retry_count(), 3);

    // Every attempt resends the original message.
    assert_eq!(client.connection().stream().outbound(), msg.repeat(3));
}

#[test]
fn retry_then_success() {
    let good = signed(END_SESSION_BODY);
    let mut client = client(default_config(), &[BAD_RESPONSE, &good]);

    let msg = client.msg_login("u", "p").unwrap();
    let resp = client.get_message(&msg).unwrap();

    assert_eq!(resp, good.trim_end());
    assert_eq!(client.connection().stream().sends, 2);
    assert_eq!(client.retry_count(), 0);
}

#[test]
fn retry_counter_survives_failure() {
    let config = Config::builder().set_max_retry(2).build().unwrap();
    let mut client = client(config, &[BAD_RESPONSE, BAD_RESPONSE, BAD_RESPONSE]);

    let msg = client.msg_login("u", "p").unwrap();
    assert_eq!(client.get_message(&msg), Err(Error::RetriesExhausted(2)));

    // The counter was not reset, so one more failure ends the next cycle.
    assert_eq!(client.get_message(&msg), Err(Error::RetriesExhausted(1)));
    assert_eq!(client.retry_count(), 3);
}

#[test]
fn stream_closed() {
    let mut client = client(default_config(), &["36Y2008"]);
    let msg = client.msg_login("u", "p").unwrap();
    assert_eq!(client.get_message(&msg), Err(Error::NoResponseError));
}

#[test]
fn consecutive_responses_share_stream() {
    let first = signed(END_SESSION_BODY);
    let second = signed("36N20080228    145537AOWOHLERS|AAX00000001|AY0AZ");

    let mut client = client(default_config(), &[&first, &second]);

    let resp = client.end_patron_session().unwrap();
    assert_eq!(resp.value("AA"), Some("X00000000"));

    // The LF left over from the first terminator is skipped.
    let resp = client.end_patron_session().unwrap();
    assert_eq!(resp.fixed_str("EndSession"), Some("N"));
    assert_eq!(resp.value("AA"), Some("X00000001"));
}

#[test]
fn ascii_transliteration() {
    let config = Config::builder().set_ascii(true).build().unwrap();
    let good = signed(END_SESSION_BODY);
    let mut client = client(config, &[&good]);

    client.login("usér", "p").unwrap();

    let sent = client.connection().stream().outbound();
    assert!(sent.starts_with("9300CNuser|COp|CP|AY0AZ"));
    assert!(sent.ends_with("\r\n"));
}

/// Append a valid checksum and CRLF to a response body of raw bytes.
fn signed_bytes(body: &[u8]) -> Vec<u8> {
    let mut bytes = body.to_vec();
    bytes.extend_from_slice(checksum::checksum_bytes(body).as_bytes());
    bytes.extend_from_slice(b"\r\n");
    bytes
}

#[test]
fn corrupt_byte_is_resent() {
    let corrupt: &[u8] = b"36Y20080228    145537AOWOHL\xffRS|AY9AZ0000\r\n";
    let good = signed(END_SESSION_BODY);

    let con = Connection::from_stream(MockStream::with_bytes(&[corrupt, good.as_bytes()]));
    let mut client = Client::from_connection(default_config(), con);

    let resp = client.end_patron_session().unwrap();

    assert_eq!(resp.value("AO"), Some("WOHLERS"));
    assert_eq!(client.connection().stream().sends, 2);
    assert_eq!(client.retry_count(), 0);
}

#[test]
fn latin1_response_accepted() {
    let latin1 = signed_bytes(b"36Y20080228    145537AOWOHL\xe9RS|AAX00000000|AY9AZ");

    let con = Connection::from_stream(MockStream::with_bytes(&[latin1.as_slice()]));
    let mut client = Client::from_connection(default_config(), con);

    let resp = client.end_patron_session().unwrap();

    assert_eq!(resp.fixed_str("EndSession"), Some("Y"));
    assert_eq!(resp.value("AO"), Some("WOHL\u{e9}RS"));
    assert_eq!(resp.value("AA"), Some("X00000000"));
    assert_eq!(client.connection().stream().sends, 1);
}

#[test]
fn utc_date_stamps() {
    let mut local = client(default_config(), &[]);
    let msg = local.msg_end_patron_session().unwrap();
    assert_eq!(&msg[10..14], "    ");

    let config = Config::builder().set_utc_dates(true).build().unwrap();
    let mut utc = client(config, &[]);
    let msg = utc.msg_end_patron_session().unwrap();
    assert_eq!(&msg[10..14], "   Z");
    assert!(checksum::verify(msg.trim_end()));
}
