//! Server half of the handshake and session protocol.
//!
//! Ground truth: `examples/original_source/final/transfer/server.py`.

use crate::error::{Error, Result};
use crate::manager::CryptoManager;
use crate::transport::Transport;
use crate::wire::messages::{ClientChallenge, ClientHello, ClientSessionVerify, ServerChallenge, ServerHello, SessionMessage};
use rand::RngCore;
use std::net::{SocketAddr, TcpListener};

const CLIENT_CHALLENGE_LEN: usize = 40;

fn random_bytes(len: usize) -> Vec<u8> {
    let mut buf = vec![0u8; len];
    rand::thread_rng().fill_bytes(&mut buf);
    buf
}

/// Listens for one client at a time and services its session.
pub struct Server {
    listener: TcpListener,
    manager: CryptoManager,
}

impl Server {
    /// Binds to `port` on all interfaces.
    pub fn bind(port: u16, manager: CryptoManager) -> Result<Self> {
        let listener = TcpListener::bind(("0.0.0.0", port))?;
        log::info!("server listening on port {port}");
        Ok(Server { listener, manager })
    }

    /// The address this server actually bound to, useful when `port` was 0.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accepts one client, runs the handshake, then services messages until
    /// the client disconnects.
    pub fn handle_client(&mut self) -> Result<()> {
        let mut transport = self.accept()?;
        loop {
            match self.receive_message(&mut transport) {
                Ok(contents) => log::info!("got message: {} bytes", contents.len()),
                Err(Error::PeerDisconnected) => {
                    log::info!("client disconnected");
                    break;
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    /// Accepts one client and runs the handshake, returning the established
    /// transport for the caller to drive the session loop over directly.
    pub fn accept(&mut self) -> Result<Transport> {
        let (stream, addr) = self.listener.accept()?;
        log::info!("got connection from {addr}");
        let mut transport = Transport::new(stream);
        self.handshake_with(&mut transport)?;
        log::info!("session successfully initialized");
        Ok(transport)
    }

    fn handshake_with(&mut self, transport: &mut Transport) -> Result<()> {
        let client_hello: ClientHello = transport.receive()?;
        if !self
            .manager
            .choose_algorithms(&client_hello.pkc, &client_hello.symmetric)
        {
            return Err(Error::NoSuiteMatch);
        }

        let (server_public, _) = self.manager.get_pkc();
        let server_public = server_public.ok_or(Error::NoSuiteMatch)?;
        let pkc_name = server_public.name();
        let server_pub_key = server_public.get_key();
        let symmetric_name = self
            .manager
            .get_symmetric()
            .ok_or(Error::NoSuiteMatch)?
            .name();

        log::debug!("sending ServerHello");
        transport.send(&ServerHello {
            pkc: pkc_name,
            symmetric: symmetric_name,
            pub_key: server_pub_key,
        })?;

        self.handle_challenge(transport)
    }

    fn handle_challenge(&mut self, transport: &mut Transport) -> Result<()> {
        let challenge_message: ClientChallenge = transport.receive()?;

        let (server_pub, server_priv) = self.manager.get_pkc();
        let server_pub = server_pub.ok_or(Error::NoSuiteMatch)?;
        let server_priv = server_priv.ok_or(Error::NoSuiteMatch)?;

        let mut client_pub_context = server_pub.copy_with_key(&challenge_message.pub_key)?;
        let session_key = challenge_message.open_session_key(server_priv)?;
        let response = challenge_message.open_challenge(server_priv)?;
        let mac_key = challenge_message.open_mac_key(server_priv)?;

        let client_challenge = random_bytes(CLIENT_CHALLENGE_LEN);

        self.manager.set_mac_keys(mac_key.clone());
        client_pub_context.set_mac_key(mac_key);

        let symmetric_context = self.manager.get_symmetric().ok_or(Error::NoSuiteMatch)?;
        symmetric_context.set_key(session_key)?;

        log::debug!("sending ServerChallenge");
        let response_message = ServerChallenge::create(
            &mut client_pub_context,
            symmetric_context,
            &client_challenge,
            &response,
        )?;
        transport.send(&response_message)?;

        let session_message: ClientSessionVerify = transport.receive()?;
        let symmetric_context = self.manager.get_symmetric().ok_or(Error::NoSuiteMatch)?;
        let client_response = session_message.open(symmetric_context)?;
        if client_response != client_challenge {
            return Err(Error::ChallengeFailed {
                expected: hex::encode(&client_challenge),
                actual: hex::encode(&client_response),
            });
        }
        log::debug!("client challenge passed");
        Ok(())
    }

    /// Reads and decrypts the next `SessionMessage` on `transport`.
    pub fn receive_message(&mut self, transport: &mut Transport) -> Result<Vec<u8>> {
        let message: SessionMessage = transport.receive()?;
        let symmetric_context = self.manager.get_symmetric().ok_or(Error::NoSuiteMatch)?;
        message.open(symmetric_context)
    }
}
