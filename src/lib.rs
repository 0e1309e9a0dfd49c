//! Address-keyed OSC dispatch on top of the `rosc` codec.
//!
//! [`OscReceiver`] maps address strings to listener bindings and routes
//! incoming messages to them on every [`OscReceiver::poll`]: a bound
//! variable gets the decoded value written into it, a function, closure or
//! method gets called with it. Argument decoding is type-directed through
//! the sealed [`Decode`] trait, so an unsupported destination type is a
//! compile error and a mismatched wire argument falls back to zero instead
//! of failing. [`OscSender`] is the send-only counterpart, composing one
//! message per call from any supported argument list.
//!
//! ```no_run
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use easyosc::{OscReceiver, OscSender, Vec3};
//!
//! # fn main() -> Result<(), easyosc::OscError> {
//! let gain = Rc::new(RefCell::new(0.0f32));
//! let mut receiver = OscReceiver::bind("0.0.0.0:9001")?;
//! receiver
//!     .add_var("/synth/gain", &gain)
//!     .add_closure("/synth/position", |p: Vec3| println!("moved to {p:?}"))
//!     .set_default_closure(|msg| println!("unhandled {}", msg.addr));
//!
//! let mut sender = OscSender::new("127.0.0.1:9001")?;
//! sender.send("/synth/gain", 0.5f32)?;
//!
//! // inside the host's update loop:
//! receiver.poll();
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod decode;
mod error;
mod listener;
mod osc_receiver;
mod osc_sender;
pub mod transport;
pub mod types;

pub use config::OscConfig;
pub use decode::Decode;
pub use error::OscError;
pub use osc_receiver::OscReceiver;
pub use osc_sender::{OscArg, OscArgs, OscSender};
pub use transport::{Transport, UdpTransport};
pub use types::{Mat3, Mat4, Vec2, Vec3, Vec4};

// Message and argument types come straight from the codec crate.
pub use rosc::{OscMessage, OscType};
