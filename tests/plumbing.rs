//! `SecureContext` plumbing exercised through identity cipher test doubles,
//! so the envelope (nonce + MAC) logic is isolated from real cipher cost.

mod support;

use securechan::cipher::Symmetric;
use securechan::context::SecureContext;
use securechan::hash::HmacSha1;
use securechan::nonce::{SequentialNonceGenerator, SequentialNonceVerifier};
use support::{StupidPkc, StupidSymmetric};

fn stupid_symmetric_context() -> SecureContext {
    let mut cipher = StupidSymmetric::default();
    cipher.set_key(b"k".to_vec());
    SecureContext::new_symmetric(
        Box::new(cipher),
        SequentialNonceGenerator::new(8),
        SequentialNonceVerifier::new(8),
        HmacSha1::new(b"mac_secret".to_vec()),
    )
}

#[test]
fn identity_cipher_still_round_trips_through_the_envelope() {
    let mut ctx = stupid_symmetric_context();
    let ciphertext = ctx.encrypt(b"plumbing").unwrap();
    // The identity cipher means the envelope's own framing is visible.
    assert!(ciphertext.len() > b"plumbing".len());
    assert_eq!(ctx.decrypt(&ciphertext).unwrap(), b"plumbing");
}

#[test]
fn copy_with_key_on_a_stupid_pkc_carries_only_the_public_half() {
    use securechan::cipher::Pkc;
    let mut pkc = StupidPkc::default();
    pkc.gen_key_pair();
    let ctx = SecureContext::new_public_key(
        Box::new(pkc),
        SequentialNonceGenerator::new(8),
        SequentialNonceVerifier::new(8),
        HmacSha1::new(b"mac_secret".to_vec()),
    );
    let copy = ctx.copy_with_key(b"peer-public-key").unwrap();
    assert_eq!(copy.get_key(), b"peer-public-key");
}
