//! Client half of the handshake and session protocol.
//!
//! Ground truth: `examples/original_source/final/transfer/client.py`.

use crate::context::SecureContext;
use crate::error::{Error, Result};
use crate::manager::CryptoManager;
use crate::transport::Transport;
use crate::wire::messages::{ClientChallenge, ClientHello, ClientSessionVerify, ServerChallenge, ServerHello, SessionMessage};
use rand::RngCore;
use std::net::TcpStream;

const CHALLENGE_LEN: usize = 40;
const MAC_KEY_LEN: usize = 40;

fn random_bytes(len: usize) -> Vec<u8> {
    let mut buf = vec![0u8; len];
    rand::thread_rng().fill_bytes(&mut buf);
    buf
}

/// Connects to a server, negotiates a cipher suite, and carries an
/// authenticated session over it.
pub struct Client {
    transport: Transport,
    manager: CryptoManager,
}

impl Client {
    /// Connects to `host:port` and runs the handshake to completion.
    pub fn connect(host: &str, port: u16, manager: CryptoManager) -> Result<Self> {
        let stream = TcpStream::connect((host, port))?;
        log::info!("connected to {host} on port {port}");
        let mut client = Client {
            transport: Transport::new(stream),
            manager,
        };
        client.handshake()?;
        log::info!("session successfully initialized");
        Ok(client)
    }

    fn handshake(&mut self) -> Result<()> {
        let pkcs = self.manager.supported_pkcs();
        let symmetric = self.manager.supported_symmetric();
        log::debug!("sending ClientHello");
        self.transport.send(&ClientHello {
            pkc: pkcs,
            symmetric,
        })?;

        let server_hello: ServerHello = self.transport.receive()?;
        log::debug!("got ServerHello: pkc={}, symmetric={}", server_hello.pkc, server_hello.symmetric);
        self.manager.set_algorithms(&server_hello.pkc, &server_hello.symmetric);

        let (client_pub_context, _) = self.manager.get_pkc();
        let client_pub_context = client_pub_context.ok_or(Error::NoSuiteMatch)?;
        let mut server_pub_context = client_pub_context.copy_with_key(&server_hello.pub_key)?;

        self.perform_challenge(&mut server_pub_context)
    }

    fn perform_challenge(&mut self, server_pub_context: &mut SecureContext) -> Result<()> {
        let challenge = random_bytes(CHALLENGE_LEN);
        let mac_key = random_bytes(MAC_KEY_LEN);

        let (symmetric_context, client_pub_context, _) = self.manager.selected_contexts();
        let symmetric_context = symmetric_context.ok_or(Error::NoSuiteMatch)?;
        let client_pub_context = client_pub_context.ok_or(Error::NoSuiteMatch)?;

        let session_key = symmetric_context.gen_key()?;
        let client_public_key = client_pub_context.get_key();

        log::debug!("sending ClientChallenge");
        let message = ClientChallenge::create(
            server_pub_context,
            &challenge,
            client_public_key,
            &session_key,
            &mac_key,
        )?;
        self.transport.send(&message)?;

        // Rekey after the send, so ClientChallenge itself used the old MAC.
        self.manager.set_mac_keys(mac_key.clone());
        server_pub_context.set_mac_key(mac_key);

        let (symmetric_context, _, client_priv_context) = self.manager.selected_contexts();
        let symmetric_context = symmetric_context.ok_or(Error::NoSuiteMatch)?;
        let client_priv_context = client_priv_context.ok_or(Error::NoSuiteMatch)?;

        let response_message: ServerChallenge = self.transport.receive()?;
        let server_response = response_message.open_response(symmetric_context)?;
        if server_response != challenge {
            return Err(Error::ChallengeFailed {
                expected: hex::encode(&challenge),
                actual: hex::encode(&server_response),
            });
        }
        log::debug!("server challenge passed");

        let response = response_message.open_challenge(client_priv_context)?;

        log::debug!("sending ClientSessionVerify");
        let verify = ClientSessionVerify::create(symmetric_context, &response)?;
        self.transport.send(&verify)?;
        Ok(())
    }

    /// Encrypts and sends `data` as a `SessionMessage`.
    pub fn send_message(&mut self, data: &[u8]) -> Result<()> {
        let symmetric_context = self.manager.get_symmetric().ok_or(Error::NoSuiteMatch)?;
        let message = SessionMessage::create(symmetric_context, data)?;
        log::debug!("sending {} bytes", data.len());
        self.transport.send(&message)
    }
}
