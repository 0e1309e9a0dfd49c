//! Send-only facade composing one outgoing message per call.

use std::net::{SocketAddr, UdpSocket};

use rosc::{encoder, OscMessage, OscPacket, OscType};

use crate::config::OscConfig;
use crate::error::OscError;
use crate::types::{Mat3, Mat4, Vec2, Vec3, Vec4};

const DEFAULT_TARGET: &str = "127.0.0.1:9000";

/// One value encodable as wire arguments: numerics as int/float args,
/// strings verbatim, aggregates as consecutive floats in field order, and
/// `Vec<T>` one argument per element.
pub trait OscArg {
    fn append_to(self, out: &mut Vec<OscType>);
}

/// The full argument list of one message: a single [`OscArg`], a tuple of up
/// to eight of them flattened in order, or `()` for an argument-less message.
pub trait OscArgs {
    fn append_to(self, out: &mut Vec<OscType>);
}

/// Sends OSC messages over a connected UDP socket.
///
/// Each [`OscSender::send`] transmits immediately; there is no batching.
/// `send` returns `&mut Self` so calls can be chained:
///
/// ```no_run
/// use easyosc::{OscSender, Vec3};
///
/// # fn main() -> Result<(), easyosc::OscError> {
/// let mut sender = OscSender::new("127.0.0.1:9001")?;
/// sender
///     .send("/synth/gain", 0.8f32)?
///     .send("/synth/position", Vec3::new(0.0, 1.5, -2.0))?
///     .send("/synth/label", "warm pad")?;
/// # Ok(())
/// # }
/// ```
pub struct OscSender {
    socket: UdpSocket,
    target: String,
}

impl OscSender {
    /// Bind an ephemeral local socket and connect it to `target_addr`.
    /// An empty target falls back to `127.0.0.1:9000`.
    pub fn new(target_addr: &str) -> Result<Self, OscError> {
        let socket = UdpSocket::bind("0.0.0.0:0")?;
        let target = if target_addr.trim().is_empty() {
            DEFAULT_TARGET.to_string()
        } else {
            target_addr.to_string()
        };
        socket.connect(&target)?;
        Ok(OscSender { socket, target })
    }

    pub fn from_config(config: &OscConfig) -> Result<Self, OscError> {
        Self::new(&config.target_addr())
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn local_addr(&self) -> Result<SocketAddr, OscError> {
        Ok(self.socket.local_addr()?)
    }

    /// Compose one message from `args` and transmit it immediately.
    pub fn send<A: OscArgs>(&mut self, address: &str, args: A) -> Result<&mut Self, OscError> {
        let msg = build_message(address, args);
        let buf = encoder::encode(&OscPacket::Message(msg))?;
        let sent = self.socket.send(&buf)?;
        tracing::trace!("sent {} bytes to {}: {}", sent, self.target, address);
        Ok(self)
    }
}

fn build_message<A: OscArgs>(address: &str, args: A) -> OscMessage {
    let mut wire = Vec::new();
    args.append_to(&mut wire);
    OscMessage {
        addr: address.to_string(),
        args: wire,
    }
}

impl OscArg for bool {
    fn append_to(self, out: &mut Vec<OscType>) {
        out.push(OscType::Int(i32::from(self)));
    }
}

impl OscArg for u8 {
    fn append_to(self, out: &mut Vec<OscType>) {
        out.push(OscType::Int(i32::from(self)));
    }
}

impl OscArg for i32 {
    fn append_to(self, out: &mut Vec<OscType>) {
        out.push(OscType::Int(self));
    }
}

impl OscArg for f32 {
    fn append_to(self, out: &mut Vec<OscType>) {
        out.push(OscType::Float(self));
    }
}

impl OscArg for f64 {
    fn append_to(self, out: &mut Vec<OscType>) {
        out.push(OscType::Float(self as f32));
    }
}

impl OscArg for &str {
    fn append_to(self, out: &mut Vec<OscType>) {
        out.push(OscType::String(self.to_string()));
    }
}

impl OscArg for String {
    fn append_to(self, out: &mut Vec<OscType>) {
        out.push(OscType::String(self));
    }
}

impl OscArg for Vec2 {
    fn append_to(self, out: &mut Vec<OscType>) {
        out.extend([OscType::Float(self.x), OscType::Float(self.y)]);
    }
}

impl OscArg for Vec3 {
    fn append_to(self, out: &mut Vec<OscType>) {
        out.extend([
            OscType::Float(self.x),
            OscType::Float(self.y),
            OscType::Float(self.z),
        ]);
    }
}

impl OscArg for Vec4 {
    fn append_to(self, out: &mut Vec<OscType>) {
        out.extend([
            OscType::Float(self.x),
            OscType::Float(self.y),
            OscType::Float(self.z),
            OscType::Float(self.w),
        ]);
    }
}

impl OscArg for Mat3 {
    fn append_to(self, out: &mut Vec<OscType>) {
        out.extend(self.m.iter().map(|v| OscType::Float(*v)));
    }
}

// Matches the decoder: only the upper 3x4 affine block goes on the wire.
impl OscArg for Mat4 {
    fn append_to(self, out: &mut Vec<OscType>) {
        out.extend(self.m[..12].iter().map(|v| OscType::Float(*v)));
    }
}

impl<T: OscArg> OscArg for Vec<T> {
    fn append_to(self, out: &mut Vec<OscType>) {
        for item in self {
            item.append_to(out);
        }
    }
}

impl OscArgs for () {
    fn append_to(self, _out: &mut Vec<OscType>) {}
}

// A lone value is a one-argument list. Forwarded per type instead of via a
// blanket impl, which would collide with the tuple impls under coherence.
macro_rules! forward_single_arg {
    ($($t:ty),+ $(,)?) => {
        $(impl OscArgs for $t {
            fn append_to(self, out: &mut Vec<OscType>) {
                OscArg::append_to(self, out);
            }
        })+
    };
}

forward_single_arg!(bool, u8, i32, f32, f64, &str, String, Vec2, Vec3, Vec4, Mat3, Mat4);

impl<T: OscArg> OscArgs for Vec<T> {
    fn append_to(self, out: &mut Vec<OscType>) {
        OscArg::append_to(self, out);
    }
}

macro_rules! impl_osc_args_for_tuple {
    ($($name:ident),+) => {
        impl<$($name: OscArg),+> OscArgs for ($($name,)+) {
            fn append_to(self, out: &mut Vec<OscType>) {
                #[allow(non_snake_case)]
                let ($($name,)+) = self;
                $($name.append_to(out);)+
            }
        }
    };
}

impl_osc_args_for_tuple!(A);
impl_osc_args_for_tuple!(A, B);
impl_osc_args_for_tuple!(A, B, C);
impl_osc_args_for_tuple!(A, B, C, D);
impl_osc_args_for_tuple!(A, B, C, D, E);
impl_osc_args_for_tuple!(A, B, C, D, E, F);
impl_osc_args_for_tuple!(A, B, C, D, E, F, G);
impl_osc_args_for_tuple!(A, B, C, D, E, F, G, H);
