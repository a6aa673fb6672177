use sip2sc::*;
use std::env;
use std::time::{Duration, SystemTime};

const HELP_TEXT: &str = r#"
Send self-check messages to a SIP server and print the responses to STDOUT.

Synopsis:

sip2sc-cli --sip-user sip-user --sip-pass sip-pass \
    --item 30000017113634                          \
    --patron 394902                                \
    --message-type item-information                \
    --message-type patron-status                   \
    --message-type patron-information

Parameters:

    --config <file>
        YAML file with a top-level "sip2sc" key.  Command line
        values override file values.

    --host <host> [default="localhost"]
    --port <port> [default=6002]
    --sip-user <username>
    --sip-pass <password>
    --max-retry <count> [default=3]
    --timeout <seconds>

    --ascii
        Transliterate outbound messages to plain ASCII.

    --utc-dates
        Send transaction dates in UTC.

    --debug
        Log at debug level.

    --quiet
        Print only the message name and duration.

Message Parameters:
    --institution <institution>
    --location <location>
    --terminal-pwd <password>
    --patron <barcode>
    --patron-pwd <password>
    --item <barcode>
    --summary <none|hold|overdue|charged|fine|recall|unavail>
    --hold-expire <RFC 3339 date>
    --due-date <RFC 3339 date>
        No-block due date sent with renewals.

    --message-type <mtype> [Repeatable]

        Specify which messages to send to the SIP server.

        Options include:
            * sc-status
            * patron-status
            * patron-information
            * item-information
            * renew
            * hold
            * end-patron-session
            * request-resend
"#;

fn main() {
    let options = read_options();

    if options.opt_present("help") {
        println!("{HELP_TEXT}");
        return;
    }

    let config = match setup_config(&options) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    let level = match config.debug() {
        true => log::LevelFilter::Debug,
        false => log::LevelFilter::Info,
    };

    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    if let Err(e) = run(&options, config) {
        eprintln!("SIP request failed: {e}");
        std::process::exit(1);
    }
}

fn run(options: &getopts::Matches, config: Config) -> Result<(), Error> {
    let quiet = options.opt_present("quiet");
    let item = options.opt_str("item").unwrap_or_default();

    let summary = match options.opt_str("summary") {
        Some(s) => Summary::try_from(s.as_str())?,
        None => Summary::None,
    };

    let hold_expire = rfc3339_option(options, "hold-expire")?;
    let due_date = rfc3339_option(options, "due-date")?;

    let mut client = Client::connect(config)?;

    if let (Some(user), Some(pass)) = (options.opt_str("sip-user"), options.opt_str("sip-pass")) {
        let resp = client.login(&user, &pass)?;
        match resp.starts_with("941") {
            true => println!("Login OK"),
            false => eprintln!("Login Failed: {resp}"),
        }
    }

    for message in options.opt_strs("message-type").iter() {
        let start = SystemTime::now();

        let output = match message.as_str() {
            "sc-status" => client.sc_status(UnitStatus::Ok, 80, spec::SIP_PROTOCOL_VERSION)?,
            "patron-status" => client.patron_status()?,
            "patron-information" => client.patron_info(summary, 1, 5)?.to_string(),
            "item-information" => client.item_info(&item)?.to_string(),
            "renew" => client.renew(&item, "", &due_date, "", false)?.to_string(),
            "hold" => client.hold('+', &hold_expire, 2, &item, "", false)?.to_string(),
            "end-patron-session" => client.end_patron_session()?.to_string(),
            "request-resend" => client.request_resend()?,
            _ => {
                eprintln!("Unsupported message type: {message}");
                continue;
            }
        };

        // Translate duration micros to millis w/ 3 decimal places.
        let duration = start.elapsed().map(|d| d.as_micros()).unwrap_or(0);
        let millis = (duration as f64) / 1000.0;
        let ms = format!("{:0>7}", format!("{:.3}", millis));

        if quiet {
            println!("{:.<35} {} ms", message, ms);
        } else {
            println!("{output}\n{ms} ms\n");
        }
    }

    client.disconnect()
}

/// SIP date for an optional RFC 3339 date option, "" if not set.
fn rfc3339_option(options: &getopts::Matches, name: &str) -> Result<String, Error> {
    match options.opt_str(name) {
        Some(date) => util::sip_date(&date),
        None => Ok(String::new()),
    }
}

/// Read the command line arguments
fn read_options() -> getopts::Matches {
    let args: Vec<String> = env::args().collect();
    let mut opts = getopts::Options::new();

    opts.optopt("", "config", "YAML Config File", "");
    opts.optopt("", "host", "SIP Host", "");
    opts.optopt("", "port", "SIP Port", "");
    opts.optopt("", "sip-user", "SIP User", "");
    opts.optopt("", "sip-pass", "SIP pass", "");
    opts.optopt("", "institution", "Institution", "");
    opts.optopt("", "location", "Location Code", "");
    opts.optopt("", "terminal-pwd", "Terminal Password", "");
    opts.optopt("", "patron", "Patron Barcode", "");
    opts.optopt("", "patron-pwd", "Patron Password", "");
    opts.optopt("", "item", "Item Barcode", "");
    opts.optopt("", "summary", "Patron Info Summary", "");
    opts.optopt("", "max-retry", "Max Checksum Retries", "");
    opts.optopt("", "timeout", "Socket Timeout Seconds", "");
    opts.optopt("", "hold-expire", "Hold Expiration Date", "");
    opts.optopt("", "due-date", "Renewal Due Date", "");

    opts.optflag("h", "help", "");
    opts.optflag("q", "quiet", "");
    opts.optflag("", "debug", "");
    opts.optflag("", "ascii", "");
    opts.optflag("", "utc-dates", "");

    opts.optmulti("", "message-type", "Message Type", "");

    opts.parse(&args[1..]) // skip the command name
        .expect("Error parsing command line options")
}

/// Build the client configuration from the optional YAML file and
/// any command line overrides.
fn setup_config(options: &getopts::Matches) -> Result<Config, Error> {
    let mut builder = match options.opt_str("config") {
        Some(filename) => ConfigBuilder::from_config(&Config::from_yaml(&filename)?),
        None => Config::builder(),
    };

    if let Some(ref host) = options.opt_str("host") {
        builder.set_host(host);
    }

    if let Some(port) = options.opt_str("port") {
        let port = port
            .parse::<u16>()
            .map_err(|e| Error::ConfigError(format!("Invalid port {port}: {e}")))?;
        builder.set_port(port);
    }

    if let Some(ref institution) = options.opt_str("institution") {
        builder.set_institution(institution);
    }

    if let Some(ref location) = options.opt_str("location") {
        builder.set_location(location);
    }

    if let Some(ref terminal_pwd) = options.opt_str("terminal-pwd") {
        builder.set_terminal_pwd(terminal_pwd);
    }

    if let Some(ref patron) = options.opt_str("patron") {
        builder.set_patron(patron);
    }

    if let Some(ref patron_pwd) = options.opt_str("patron-pwd") {
        builder.set_patron_pwd(patron_pwd);
    }

    if let Some(retry) = options.opt_str("max-retry") {
        let retry = retry
            .parse::<usize>()
            .map_err(|e| Error::ConfigError(format!("Invalid max-retry {retry}: {e}")))?;
        builder.set_max_retry(retry);
    }

    if let Some(timeout) = options.opt_str("timeout") {
        let secs = timeout
            .parse::<u64>()
            .map_err(|e| Error::ConfigError(format!("Invalid timeout {timeout}: {e}")))?;
        builder.set_timeout(Some(Duration::from_secs(secs)));
    }

    if options.opt_present("ascii") {
        builder.set_ascii(true);
    }

    if options.opt_present("utc-dates") {
        builder.set_utc_dates(true);
    }

    if options.opt_present("debug") {
        builder.set_debug(true);
    }

    builder.build()
}
