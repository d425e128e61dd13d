//! Handshake and session message shapes.
//!
//! Ground truth: `examples/original_source/final/transfer/protocol_messages.py`.
//! Fields marked `ENC` there are ciphertexts under whichever `SecureContext`
//! the call site names; this crate ties encryption/decryption directly to
//! each message's constructor/opener instead of leaving it to a raw
//! `dict`-backed `Message.get_encrypted`.

use crate::context::SecureContext;
use crate::error::Result;
use crate::wire::hex_bytes;
use serde::{Deserialize, Serialize};

/// First message of the handshake: the client's supported suite names.
#[derive(Debug, Serialize, Deserialize)]
pub struct ClientHello {
    pub pkc: Vec<String>,
    pub symmetric: Vec<String>,
}

/// The server's chosen suite and its public key for that PKC.
#[derive(Debug, Serialize, Deserialize)]
pub struct ServerHello {
    pub pkc: String,
    pub symmetric: String,
    #[serde(with = "hex_bytes")]
    pub pub_key: Vec<u8>,
}

/// The client's challenge, public key, session key, and MAC key, all but
/// `pub_key` encrypted under the server's public-key context.
#[derive(Debug, Serialize, Deserialize)]
pub struct ClientChallenge {
    #[serde(with = "hex_bytes")]
    pub challenge: Vec<u8>,
    #[serde(with = "hex_bytes")]
    pub pub_key: Vec<u8>,
    #[serde(with = "hex_bytes")]
    pub session_key: Vec<u8>,
    #[serde(with = "hex_bytes")]
    pub mac_key: Vec<u8>,
}

impl ClientChallenge {
    /// Encrypts `challenge`, `session_key`, and `mac_key` under
    /// `server_pub_context`; `pub_key` travels in the clear.
    pub fn create(
        server_pub_context: &mut SecureContext,
        challenge: &[u8],
        pub_key: Vec<u8>,
        session_key: &[u8],
        mac_key: &[u8],
    ) -> Result<Self> {
        Ok(ClientChallenge {
            challenge: server_pub_context.encrypt(challenge)?,
            pub_key,
            session_key: server_pub_context.encrypt(session_key)?,
            mac_key: server_pub_context.encrypt(mac_key)?,
        })
    }

    pub fn open_challenge(&self, server_priv_context: &mut SecureContext) -> Result<Vec<u8>> {
        server_priv_context.decrypt(&self.challenge)
    }

    pub fn open_session_key(&self, server_priv_context: &mut SecureContext) -> Result<Vec<u8>> {
        server_priv_context.decrypt(&self.session_key)
    }

    pub fn open_mac_key(&self, server_priv_context: &mut SecureContext) -> Result<Vec<u8>> {
        server_priv_context.decrypt(&self.mac_key)
    }
}

/// The server's response to the client's challenge, plus a fresh challenge
/// of its own. `challenge` is encrypted under the client's public-key
/// context; `response` is encrypted under the freshly installed session key.
#[derive(Debug, Serialize, Deserialize)]
pub struct ServerChallenge {
    #[serde(with = "hex_bytes")]
    pub challenge: Vec<u8>,
    #[serde(with = "hex_bytes")]
    pub response: Vec<u8>,
}

impl ServerChallenge {
    pub fn create(
        client_pub_context: &mut SecureContext,
        symmetric_context: &mut SecureContext,
        challenge: &[u8],
        response: &[u8],
    ) -> Result<Self> {
        Ok(ServerChallenge {
            challenge: client_pub_context.encrypt(challenge)?,
            response: symmetric_context.encrypt(response)?,
        })
    }

    pub fn open_challenge(&self, client_priv_context: &mut SecureContext) -> Result<Vec<u8>> {
        client_priv_context.decrypt(&self.challenge)
    }

    pub fn open_response(&self, symmetric_context: &mut SecureContext) -> Result<Vec<u8>> {
        symmetric_context.decrypt(&self.response)
    }
}

/// The client's proof that it recovered the server's challenge, encrypted
/// under the now-established session key.
#[derive(Debug, Serialize, Deserialize)]
pub struct ClientSessionVerify {
    #[serde(with = "hex_bytes")]
    pub response: Vec<u8>,
}

impl ClientSessionVerify {
    pub fn create(symmetric_context: &mut SecureContext, response: &[u8]) -> Result<Self> {
        Ok(ClientSessionVerify {
            response: symmetric_context.encrypt(response)?,
        })
    }

    pub fn open(&self, symmetric_context: &mut SecureContext) -> Result<Vec<u8>> {
        symmetric_context.decrypt(&self.response)
    }
}

/// A single application payload sent during the session, encrypted under the
/// session's symmetric context.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionMessage {
    #[serde(with = "hex_bytes")]
    pub contents: Vec<u8>,
}

impl SessionMessage {
    pub fn create(symmetric_context: &mut SecureContext, contents: &[u8]) -> Result<Self> {
        Ok(SessionMessage {
            contents: symmetric_context.encrypt(contents)?,
        })
    }

    pub fn open(&self, symmetric_context: &mut SecureContext) -> Result<Vec<u8>> {
        symmetric_context.decrypt(&self.contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cipher::rc4::Rc4;
    use crate::cipher::Symmetric;
    use crate::hash::HmacSha1;
    use crate::nonce::{SequentialNonceGenerator, SequentialNonceVerifier};

    fn context() -> SecureContext {
        let mut cipher = Rc4::default();
        cipher.gen_key();
        SecureContext::new_symmetric(
            Box::new(cipher),
            SequentialNonceGenerator::new(16),
            SequentialNonceVerifier::new(16),
            HmacSha1::new(b"mac_secret".to_vec()),
        )
    }

    #[test]
    fn session_message_round_trips_through_json() {
        let mut ctx = context();
        let message = SessionMessage::create(&mut ctx, b"payload").unwrap();
        let json = serde_json::to_string(&message).unwrap();
        let decoded: SessionMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.open(&mut ctx).unwrap(), b"payload");
    }
}
