use sip2sc::{Client, Config, Summary};

fn main() {
    env_logger::init();

    let config = Config::builder()
        .set_host("127.0.0.1")
        .set_port(6002)
        .set_institution("example")
        .set_patron("394902")
        .set_patron_pwd("demo123")
        .build()
        .expect("should be a valid config");

    // Connect to our SIP server
    let mut client = Client::connect(config).expect("should connect");

    // A successful login returns a first fixed field value of "1".
    let resp = client.login("sip-user", "sip-pass").expect("should log in");

    if resp.starts_with("941") {
        println!("Login succeeded");
    }

    let info = client
        .patron_info(Summary::Charged, 1, 10)
        .expect("should receive patron info");

    println!("{info}");

    if let Some(items) = info.variable().get("AU") {
        println!("{} charged items returned", items.len());
    }

    client.end_patron_session().ok();
    client.disconnect().ok();
}
