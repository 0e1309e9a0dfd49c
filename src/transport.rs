//! Inbound transport seam.
//!
//! [`UdpTransport`] is the production implementation: a non-blocking UDP
//! socket drained into an internal queue, with bundles flattened recursively
//! into their messages. The [`Transport`] trait exists so dispatch logic can
//! be driven from canned messages in tests or by a host that owns its own
//! socket.

use std::collections::VecDeque;
use std::io::ErrorKind;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};

use rosc::{decoder, OscMessage, OscPacket};

use crate::error::OscError;

/// Source of already-received messages. Neither method may block waiting for
/// new traffic.
pub trait Transport {
    fn has_waiting_messages(&mut self) -> bool;

    fn pop_next_message(&mut self) -> Option<OscMessage>;
}

/// Non-blocking UDP receive transport.
pub struct UdpTransport {
    socket: UdpSocket,
    queue: VecDeque<OscMessage>,
}

impl UdpTransport {
    /// Bind a listening socket. Port 0 picks an ephemeral port; see
    /// [`UdpTransport::local_addr`].
    pub fn bind<A: ToSocketAddrs>(addr: A) -> Result<Self, OscError> {
        let socket = UdpSocket::bind(addr)?;
        socket.set_nonblocking(true)?;
        tracing::debug!("OSC transport bound on {}", socket.local_addr()?);
        Ok(UdpTransport {
            socket,
            queue: VecDeque::new(),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, OscError> {
        Ok(self.socket.local_addr()?)
    }

    // Drain everything the socket has buffered. A malformed packet is logged
    // and dropped without aborting the rest of the drain.
    fn fill_queue(&mut self) {
        let mut buf = [0u8; decoder::MTU];
        loop {
            match self.socket.recv_from(&mut buf) {
                Ok((size, peer)) => match decoder::decode_udp(&buf[..size]) {
                    Ok((_, packet)) => flatten_packet(packet, &mut self.queue),
                    Err(err) => {
                        tracing::warn!("OSC decode error from {}: {}", peer, err);
                    }
                },
                Err(ref e) if e.kind() == ErrorKind::WouldBlock || e.kind() == ErrorKind::TimedOut => {
                    break;
                }
                Err(err) => {
                    tracing::warn!("OSC recv error: {}", err);
                    break;
                }
            }
        }
    }
}

impl Transport for UdpTransport {
    fn has_waiting_messages(&mut self) -> bool {
        if self.queue.is_empty() {
            self.fill_queue();
        }
        !self.queue.is_empty()
    }

    fn pop_next_message(&mut self) -> Option<OscMessage> {
        if self.queue.is_empty() {
            self.fill_queue();
        }
        self.queue.pop_front()
    }
}

fn flatten_packet(packet: OscPacket, queue: &mut VecDeque<OscMessage>) {
    match packet {
        OscPacket::Message(msg) => queue.push_back(msg),
        OscPacket::Bundle(bundle) => {
            for pkt in bundle.content {
                flatten_packet(pkt, queue);
            }
        }
    }
}
