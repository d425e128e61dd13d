//! Builds a `CryptoManager` from already-parsed cipher-suite configuration.
//!
//! Ground truth: `examples/original_source/final/config_helper.py`'s
//! `ConfigHelper`. That type reads and JSON-parses a config file itself;
//! here, parsing a config file is a collaborator's job (see the crate's
//! module-boundary notes) -- `SuiteBuilder` only ever consumes structs that
//! have already been deserialized.

use crate::cipher::blum_goldwasser::BlumGoldwasser;
use crate::cipher::goldwasser_micali::GoldwasserMicali;
use crate::cipher::rc4::Rc4;
use crate::cipher::rsa::Rsa;
use crate::cipher::ssrsa::Ssrsa;
use crate::cipher::triple_des::TripleDes;
use crate::cipher::{Pkc, Symmetric};
use crate::context::SecureContext;
use crate::error::Result;
use crate::hash::HmacSha1;
use crate::manager::CryptoManager;
use crate::nonce::{SequentialNonceGenerator, SequentialNonceVerifier};
use serde::Deserialize;

const NONCE_SIZE: u32 = 32;
const MAC_DEFAULT_KEY: &[u8] = b"mac_secret";

/// Configuration shape for a symmetric suite.
#[derive(Debug, Clone, Deserialize)]
pub struct SymmetricConfig {
    pub key_size: usize,
}

/// Configuration shape for a PKC suite. `pub_key`/`priv_key` carry the
/// cipher's own serialized key-pair encoding and are only present when the
/// caller wants to pin a fixed key pair rather than generate a fresh one.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PkcConfig {
    pub key_size: u64,
    #[serde(default, with = "crate::wire::hex_bytes_option")]
    pub pub_key: Option<Vec<u8>>,
    #[serde(default, with = "crate::wire::hex_bytes_option")]
    pub priv_key: Option<Vec<u8>>,
}

/// Populates a `CryptoManager` one cipher suite at a time.
///
/// Every context this builder produces shares one template `nonce_gen` /
/// `nonce_ver` / `mac`, cloned per context rather than aliased as the Python
/// source's single shared instance would be -- `CryptoManager` only ever
/// exposes the one negotiated context per category at a time, so the two
/// never observably diverge within a connection.
pub struct SuiteBuilder {
    manager: CryptoManager,
    nonce_gen: SequentialNonceGenerator,
    nonce_ver: SequentialNonceVerifier,
    mac: HmacSha1,
}

impl SuiteBuilder {
    pub fn new() -> Self {
        SuiteBuilder {
            manager: CryptoManager::new(),
            nonce_gen: SequentialNonceGenerator::new(NONCE_SIZE),
            nonce_ver: SequentialNonceVerifier::new(NONCE_SIZE),
            mac: HmacSha1::new(MAC_DEFAULT_KEY.to_vec()),
        }
    }

    fn register_pkc<C: Pkc + Clone + 'static>(&mut self, mut cipher: C, config: &PkcConfig) -> Result<()> {
        match (&config.pub_key, &config.priv_key) {
            (Some(pub_key), Some(priv_key)) => cipher.set_key_pair(pub_key, priv_key),
            _ => {
                cipher.gen_key_pair();
            }
        }

        let public = SecureContext::new_public_key(
            Box::new(cipher.clone()),
            self.nonce_gen.clone(),
            self.nonce_ver.clone(),
            self.mac.clone(),
        );
        let private = SecureContext::new_private_key(
            Box::new(cipher),
            self.nonce_gen.clone(),
            self.nonce_ver.clone(),
            self.mac.clone(),
        );
        self.manager.add_pkc_contexts(public, private)
    }

    /// Registers RC4 with a freshly generated key.
    pub fn add_rc4(&mut self, config: SymmetricConfig) {
        let mut cipher = Rc4::new(config.key_size);
        cipher.gen_key();
        self.manager.add_symmetric_context(SecureContext::new_symmetric(
            Box::new(cipher),
            self.nonce_gen.clone(),
            self.nonce_ver.clone(),
            self.mac.clone(),
        ));
    }

    /// Registers Triple DES with a freshly generated key. 3DES's key size
    /// is fixed by the algorithm, so `config` carries no tunable field
    /// today; it is accepted for symmetry with the other `add_*` methods.
    pub fn add_triple_des(&mut self, _config: SymmetricConfig) {
        let mut cipher = TripleDes::new();
        cipher.gen_key();
        self.manager.add_symmetric_context(SecureContext::new_symmetric(
            Box::new(cipher),
            self.nonce_gen.clone(),
            self.nonce_ver.clone(),
            self.mac.clone(),
        ));
    }

    /// Registers RSA. Uses `config.pub_key`/`priv_key` if both are present,
    /// otherwise generates a fresh key pair at `config.key_size` bits.
    pub fn add_rsa(&mut self, config: PkcConfig) -> Result<()> {
        let cipher = Rsa::new(config.key_size);
        self.register_pkc(cipher, &config)
    }

    /// Registers SSRSA, RSA with a SHA-1 keystream mask over the message.
    pub fn add_ssrsa(&mut self, config: PkcConfig) -> Result<()> {
        let cipher = Ssrsa::new(config.key_size);
        self.register_pkc(cipher, &config)
    }

    /// Registers Goldwasser-Micali.
    pub fn add_goldwasser_micali(&mut self, config: PkcConfig) -> Result<()> {
        let cipher = GoldwasserMicali::new(config.key_size);
        self.register_pkc(cipher, &config)
    }

    /// Registers Blum-Goldwasser. The Python source never accepts a config
    /// file for this one either; the key pair is always freshly generated.
    pub fn add_blum_goldwasser(&mut self) -> Result<()> {
        let mut cipher = BlumGoldwasser::new();
        cipher.gen_key_pair();
        let public = SecureContext::new_public_key(
            Box::new(cipher.clone()),
            self.nonce_gen.clone(),
            self.nonce_ver.clone(),
            self.mac.clone(),
        );
        let private = SecureContext::new_private_key(
            Box::new(cipher),
            self.nonce_gen.clone(),
            self.nonce_ver.clone(),
            self.mac.clone(),
        );
        self.manager.add_pkc_contexts(public, private)
    }

    /// Consumes the builder, returning the populated manager.
    pub fn build(self) -> CryptoManager {
        self.manager
    }
}

impl Default for SuiteBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_rc4_registers_a_symmetric_suite() {
        let mut builder = SuiteBuilder::new();
        builder.add_rc4(SymmetricConfig { key_size: 56 });
        let manager = builder.build();
        assert_eq!(manager.supported_symmetric(), vec!["RC4_SequentialNonce_HMAC".to_string()]);
    }

    #[test]
    fn add_rsa_without_key_material_generates_a_fresh_pair() {
        let mut builder = SuiteBuilder::new();
        builder
            .add_rsa(PkcConfig {
                key_size: 64,
                pub_key: None,
                priv_key: None,
            })
            .unwrap();
        let manager = builder.build();
        assert_eq!(manager.supported_pkcs(), vec!["RSA_SequentialNonce_HMAC".to_string()]);
    }

    #[test]
    fn add_blum_goldwasser_registers_a_pkc_suite() {
        let mut builder = SuiteBuilder::new();
        builder.add_blum_goldwasser().unwrap();
        let manager = builder.build();
        assert_eq!(manager.supported_pkcs(), vec!["BlumGoldwasser_SequentialNonce_HMAC".to_string()]);
    }
}
