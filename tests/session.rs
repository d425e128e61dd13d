//! Envelope-level attack scenarios: a tampered frame and a replayed frame,
//! exercised through the real wire codec.

use securechan::cipher::rc4::Rc4;
use securechan::cipher::Symmetric;
use securechan::context::SecureContext;
use securechan::error::Error;
use securechan::hash::HmacSha1;
use securechan::nonce::{SequentialNonceGenerator, SequentialNonceVerifier};
use securechan::wire::messages::SessionMessage;
use securechan::wire::{read_frame, write_frame};
use std::io::Cursor;

fn paired_contexts() -> (SecureContext, SecureContext) {
    let mut cipher = Rc4::new(56);
    let key = cipher.gen_key();

    let mut peer_cipher = Rc4::new(56);
    peer_cipher.set_key(key);

    let nonce_gen = SequentialNonceGenerator::new(16);
    let nonce_ver = SequentialNonceVerifier::new(16);
    let mac = HmacSha1::new(b"mac_secret".to_vec());

    let sender = SecureContext::new_symmetric(
        Box::new(cipher),
        nonce_gen.clone(),
        nonce_ver.clone(),
        mac.clone(),
    );
    let receiver =
        SecureContext::new_symmetric(Box::new(peer_cipher), nonce_gen, nonce_ver, mac);
    (sender, receiver)
}

fn frame_bytes(sender: &mut SecureContext, contents: &[u8]) -> Vec<u8> {
    let message = SessionMessage::create(sender, contents).unwrap();
    let mut buf = Vec::new();
    write_frame(&mut buf, &message).unwrap();
    buf
}

/// Flips one hex digit of the `contents` field's value, in place, keeping
/// the frame's length prefix and JSON structure valid so the tamper is
/// caught by the envelope (MAC/nonce), not the JSON parser.
fn flip_one_ciphertext_digit(on_wire: &[u8]) -> Vec<u8> {
    let (header, body) = on_wire.split_at(6);
    let mut body = String::from_utf8(body.to_vec()).unwrap();
    let key = "\"contents\":\"";
    let start = body.find(key).unwrap() + key.len();
    let digit = body.as_bytes()[start] as char;
    let replacement = if digit == '0' { '1' } else { '0' };
    body.replace_range(start..start + 1, &replacement.to_string());

    let mut tampered = header.to_vec();
    tampered.extend_from_slice(body.as_bytes());
    tampered
}

#[test]
fn s3_a_flipped_byte_in_transit_surfaces_mac_mismatch() {
    let (mut sender, mut receiver) = paired_contexts();
    let on_wire = frame_bytes(&mut sender, b"attack at dawn");
    let tampered = flip_one_ciphertext_digit(&on_wire);

    let mut cursor = Cursor::new(tampered);
    let message: SessionMessage = read_frame(&mut cursor).unwrap();
    let result = message.open(&mut receiver);
    assert!(matches!(
        result,
        Err(Error::MacMismatch { .. }) | Err(Error::NonceInvalid(_)) | Err(Error::FrameMalformed(_))
    ));
}

#[test]
fn s4_a_replayed_frame_is_rejected_by_the_nonce_verifier() {
    let (mut sender, mut receiver) = paired_contexts();
    let on_wire = frame_bytes(&mut sender, b"attack at dawn");

    let mut first_read = Cursor::new(on_wire.clone());
    let first_message: SessionMessage = read_frame(&mut first_read).unwrap();
    assert_eq!(first_message.open(&mut receiver).unwrap(), b"attack at dawn");

    let mut replay_read = Cursor::new(on_wire);
    let replayed_message: SessionMessage = read_frame(&mut replay_read).unwrap();
    let result = replayed_message.open(&mut receiver);
    assert!(matches!(result, Err(Error::NonceInvalid(_))));
}
