//! End-to-end handshake and session scenarios, driven over real TCP sockets.

use securechan::config::{PkcConfig, SuiteBuilder, SymmetricConfig};
use securechan::{Client, CryptoManager, Error, Server};
use std::net::TcpListener;
use std::thread;

fn rsa_and_rc4_manager() -> CryptoManager {
    let mut builder = SuiteBuilder::new();
    builder.add_rc4(SymmetricConfig { key_size: 56 });
    builder
        .add_rsa(PkcConfig {
            key_size: 1024,
            pub_key: None,
            priv_key: None,
        })
        .unwrap();
    builder.build()
}

fn free_port() -> u16 {
    TcpListener::bind(("127.0.0.1", 0))
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

#[test]
fn s1_matching_suites_carry_a_session_message() {
    let _ = env_logger::try_init();
    let port = free_port();
    let server_handle = thread::spawn(move || {
        let mut server = Server::bind(port, rsa_and_rc4_manager()).unwrap();
        let mut transport = server.accept().unwrap();
        let contents = server.receive_message(&mut transport).unwrap();
        String::from_utf8(contents).unwrap()
    });

    // Give the listener a moment to bind before the client dials in.
    thread::sleep(std::time::Duration::from_millis(50));

    let mut client = Client::connect("127.0.0.1", port, rsa_and_rc4_manager()).unwrap();
    client.send_message(b"Hello").unwrap();

    let received = server_handle.join().unwrap();
    assert_eq!(received, "Hello");
}

#[test]
fn s2_mismatched_pkc_suites_fail_the_handshake() {
    let port = free_port();
    let server_handle = thread::spawn(move || {
        let mut builder = SuiteBuilder::new();
        builder
            .add_goldwasser_micali(PkcConfig {
                key_size: 32,
                pub_key: None,
                priv_key: None,
            })
            .unwrap();
        let mut server = Server::bind(port, builder.build()).unwrap();
        let result = server.accept();
        assert!(matches!(result, Err(Error::NoSuiteMatch)));
    });

    thread::sleep(std::time::Duration::from_millis(50));

    let mut builder = SuiteBuilder::new();
    builder
        .add_rsa(PkcConfig {
            key_size: 1024,
            pub_key: None,
            priv_key: None,
        })
        .unwrap();
    let result = Client::connect("127.0.0.1", port, builder.build());
    assert!(result.is_err());

    server_handle.join().unwrap();
}

#[test]
fn s6_handshake_rekeys_the_mac_after_client_challenge() {
    // A full handshake only succeeds if both peers are using the MAC key
    // carried inside ClientChallenge by the time ServerChallenge and
    // ClientSessionVerify are exchanged. If the rekey ordering were wrong on
    // either side, the MAC check inside the envelope would fail and the
    // handshake itself would return an error.
    let port = free_port();
    let server_handle = thread::spawn(move || {
        let mut server = Server::bind(port, rsa_and_rc4_manager()).unwrap();
        server.accept().unwrap();
    });

    thread::sleep(std::time::Duration::from_millis(50));
    Client::connect("127.0.0.1", port, rsa_and_rc4_manager()).unwrap();

    server_handle.join().unwrap();
}
