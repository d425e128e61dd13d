//! A thin `TcpStream` wrapper that sends/receives length-prefixed frames.
//!
//! Ground truth: `examples/original_source/final/transfer/message_passer.py`'s
//! `MessagePasser`, which both `Client` and `Server` inherit from.

use crate::error::Result;
use crate::wire::{read_frame, write_frame};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::net::TcpStream;

/// Wraps a connected socket with the crate's frame codec.
pub struct Transport {
    stream: TcpStream,
}

impl Transport {
    /// Takes ownership of an already-connected or already-accepted socket.
    pub fn new(stream: TcpStream) -> Self {
        Transport { stream }
    }

    /// Sends `message` as one length-prefixed JSON frame.
    pub fn send<T: Serialize>(&mut self, message: &T) -> Result<()> {
        write_frame(&mut self.stream, message)
    }

    /// Blocks for and deserializes the next frame as `T`.
    pub fn receive<T: DeserializeOwned>(&mut self) -> Result<T> {
        read_frame(&mut self.stream)
    }

    /// Borrows the underlying socket, e.g. to set a read timeout.
    pub fn socket(&self) -> &TcpStream {
        &self.stream
    }
}
