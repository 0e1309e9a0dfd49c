//! Address-keyed listener registry and the poll-driven dispatcher.

use std::cell::RefCell;
use std::collections::HashMap;
use std::net::{SocketAddr, ToSocketAddrs};
use std::rc::Rc;

use rosc::OscMessage;

use crate::config::OscConfig;
use crate::decode::Decode;
use crate::error::OscError;
use crate::listener::{Binding, BindingId};
use crate::transport::{Transport, UdpTransport};

/// Receives OSC messages and routes them to registered listeners.
///
/// Addresses are matched exactly. Each address owns an ordered listener list;
/// listeners fire in registration order. A message whose address has no entry
/// goes to the default listener, if one is set. Registration and removal
/// calls return `&mut Self` so they can be chained:
///
/// ```no_run
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use easyosc::OscReceiver;
///
/// # fn main() -> Result<(), easyosc::OscError> {
/// let gain = Rc::new(RefCell::new(0.0f32));
/// let mut receiver = OscReceiver::bind("0.0.0.0:9001")?;
/// receiver
///     .add_var("/synth/gain", &gain)
///     .add_closure("/synth/note", |note: i32| println!("note {note}"));
/// receiver.poll();
/// # Ok(())
/// # }
/// ```
pub struct OscReceiver<T: Transport = UdpTransport> {
    transport: T,
    bindings: HashMap<String, Vec<Binding>>,
    default_binding: Option<Binding>,
    counts: HashMap<String, usize>,
    counting: bool,
}

impl OscReceiver<UdpTransport> {
    /// Bind a UDP listening socket. Port 0 picks an ephemeral port.
    pub fn bind<A: ToSocketAddrs>(addr: A) -> Result<Self, OscError> {
        Ok(Self::with_transport(UdpTransport::bind(addr)?))
    }

    pub fn from_config(config: &OscConfig) -> Result<Self, OscError> {
        Self::bind(config.listen_addr())
    }

    pub fn local_addr(&self) -> Result<SocketAddr, OscError> {
        self.transport.local_addr()
    }
}

impl<T: Transport> OscReceiver<T> {
    /// Build a receiver on top of an externally-owned transport.
    pub fn with_transport(transport: T) -> Self {
        OscReceiver {
            transport,
            bindings: HashMap::new(),
            default_binding: None,
            counts: HashMap::new(),
            counting: false,
        }
    }

    /// Register an address with no listeners yet. Idempotent; useful together
    /// with [`OscReceiver::count_of`].
    pub fn add(&mut self, address: &str) -> &mut Self {
        self.bindings.entry(address.to_string()).or_default();
        self
    }

    /// Append a binding to `address`, creating the address entry if needed.
    fn push(&mut self, address: &str, binding: Binding) -> &mut Self {
        self.bindings
            .entry(address.to_string())
            .or_default()
            .push(binding);
        self
    }

    /// Remove every binding under `address` whose identity matches `id`.
    fn remove_matching(&mut self, address: &str, id: &BindingId) -> &mut Self {
        if let Some(listeners) = self.bindings.get_mut(address) {
            listeners.retain(|binding| !binding.matches(id));
        }
        self
    }

    /// Register a variable: each matching message is decoded into the cell.
    /// The registry holds a `Weak` reference only; drop the `Rc` (or call
    /// [`OscReceiver::remove_var`]) to stop the writes.
    pub fn add_var<V: Decode + 'static>(&mut self, address: &str, var: &Rc<RefCell<V>>) -> &mut Self {
        self.push(address, Binding::variable(var))
    }

    /// Register a free function taking one decoded argument.
    pub fn add_fn<V: Decode + 'static>(&mut self, address: &str, func: fn(V)) -> &mut Self {
        self.push(address, Binding::function(func))
    }

    /// Register a free function taking no arguments.
    pub fn add_fn0(&mut self, address: &str, func: fn()) -> &mut Self {
        self.push(address, Binding::function0(func))
    }

    /// Register a closure taking one decoded argument. Closures have no
    /// identity: they can only be removed via [`OscReceiver::remove_closures`].
    pub fn add_closure<V, F>(&mut self, address: &str, f: F) -> &mut Self
    where
        V: Decode + 'static,
        F: FnMut(V) + 'static,
    {
        self.push(address, Binding::closure(f))
    }

    /// Register a closure taking no arguments.
    pub fn add_closure0<F: FnMut() + 'static>(&mut self, address: &str, f: F) -> &mut Self {
        self.push(address, Binding::closure0(f))
    }

    /// Register a method on a shared object, called with one decoded
    /// argument. The registry holds a `Weak` reference to the object.
    pub fn add_method<O, V>(
        &mut self,
        address: &str,
        obj: &Rc<RefCell<O>>,
        method: fn(&mut O, V),
    ) -> &mut Self
    where
        O: 'static,
        V: Decode + 'static,
    {
        self.push(address, Binding::method(obj, method))
    }

    /// Register a method taking no arguments.
    pub fn add_method0<O: 'static>(
        &mut self,
        address: &str,
        obj: &Rc<RefCell<O>>,
        method: fn(&mut O),
    ) -> &mut Self {
        self.push(address, Binding::method0(obj, method))
    }

    /// Remove every binding of `var` under `address`. Other listeners on the
    /// address stay registered.
    pub fn remove_var<V: Decode + 'static>(
        &mut self,
        address: &str,
        var: &Rc<RefCell<V>>,
    ) -> &mut Self {
        self.remove_matching(address, &BindingId::variable(var))
    }

    pub fn remove_fn<V: Decode + 'static>(&mut self, address: &str, func: fn(V)) -> &mut Self {
        self.remove_matching(address, &BindingId::function(func))
    }

    pub fn remove_fn0(&mut self, address: &str, func: fn()) -> &mut Self {
        self.remove_matching(address, &BindingId::function0(func))
    }

    pub fn remove_method<O, V>(
        &mut self,
        address: &str,
        obj: &Rc<RefCell<O>>,
        method: fn(&mut O, V),
    ) -> &mut Self
    where
        O: 'static,
        V: Decode + 'static,
    {
        self.remove_matching(address, &BindingId::method(obj, method))
    }

    pub fn remove_method0<O: 'static>(
        &mut self,
        address: &str,
        obj: &Rc<RefCell<O>>,
        method: fn(&mut O),
    ) -> &mut Self {
        self.remove_matching(address, &BindingId::method0(obj, method))
    }

    /// Remove every closure binding under `address`, leaving variable,
    /// function and method bindings untouched.
    pub fn remove_closures(&mut self, address: &str) -> &mut Self {
        if let Some(listeners) = self.bindings.get_mut(address) {
            listeners.retain(|binding| !binding.is_closure());
        }
        self
    }

    /// Remove `address` with all its listeners.
    pub fn remove(&mut self, address: &str) -> &mut Self {
        self.bindings.remove(address);
        self
    }

    /// Remove every address and every listener.
    pub fn remove_all(&mut self) -> &mut Self {
        self.bindings.clear();
        self
    }

    /// Set the fallback for messages whose address has no registry entry.
    /// The listener receives the whole message. At most one default listener
    /// exists; setting a new one replaces the old.
    pub fn set_default_fn(&mut self, func: fn(&OscMessage)) -> &mut Self {
        self.default_binding = Some(Binding::message_function(func));
        self
    }

    pub fn set_default_closure<F: FnMut(&OscMessage) + 'static>(&mut self, f: F) -> &mut Self {
        self.default_binding = Some(Binding::message_closure(f));
        self
    }

    pub fn set_default_method<O: 'static>(
        &mut self,
        obj: &Rc<RefCell<O>>,
        method: fn(&mut O, &OscMessage),
    ) -> &mut Self {
        self.default_binding = Some(Binding::message_method(obj, method));
        self
    }

    pub fn clear_default_listener(&mut self) -> &mut Self {
        self.default_binding = None;
        self
    }

    /// Enable or disable per-poll address counting.
    pub fn count_incoming(&mut self, enable: bool) -> &mut Self {
        self.counting = enable;
        self
    }

    pub fn is_counting(&self) -> bool {
        self.counting
    }

    /// How many messages for `address` arrived during the most recent
    /// [`OscReceiver::poll`]. Returns 0 when counting is disabled.
    pub fn count_of(&self, address: &str) -> usize {
        self.counts.get(address).copied().unwrap_or(0)
    }

    /// Alias of [`OscReceiver::count_of`].
    pub fn got_message(&self, address: &str) -> usize {
        self.count_of(address)
    }

    /// The full address-to-count map accumulated during the most recent
    /// [`OscReceiver::poll`]. Valid until the next poll clears it.
    pub fn counts(&self) -> &HashMap<String, usize> {
        &self.counts
    }

    /// Drain all currently queued messages and dispatch them. Never blocks
    /// waiting for new traffic. Messages are processed in delivery order;
    /// listeners for one address fire in registration order. Returns the
    /// number of messages processed.
    pub fn poll(&mut self) -> usize {
        self.counts.clear();
        let mut processed = 0;

        while self.transport.has_waiting_messages() {
            let Some(msg) = self.transport.pop_next_message() else {
                break;
            };
            processed += 1;

            match self.bindings.get_mut(&msg.addr) {
                Some(listeners) => {
                    for listener in listeners.iter_mut() {
                        listener.dispatch(&msg);
                    }
                }
                None => match self.default_binding.as_mut() {
                    Some(default) => default.dispatch(&msg),
                    None => tracing::debug!("no listener for {}", msg.addr),
                },
            }

            if self.counting {
                *self.counts.entry(msg.addr.clone()).or_insert(0) += 1;
            }
        }

        processed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use rosc::OscType;

    /// Canned-message transport: tests push messages into the shared queue
    /// and poll them back out through the receiver.
    #[derive(Clone, Default)]
    struct QueueTransport {
        queue: Rc<RefCell<VecDeque<OscMessage>>>,
    }

    impl QueueTransport {
        fn push(&self, addr: &str, args: Vec<OscType>) {
            self.queue.borrow_mut().push_back(OscMessage {
                addr: addr.to_string(),
                args,
            });
        }
    }

    impl Transport for QueueTransport {
        fn has_waiting_messages(&mut self) -> bool {
            !self.queue.borrow().is_empty()
        }

        fn pop_next_message(&mut self) -> Option<OscMessage> {
            self.queue.borrow_mut().pop_front()
        }
    }

    fn receiver() -> (OscReceiver<QueueTransport>, QueueTransport) {
        let transport = QueueTransport::default();
        (OscReceiver::with_transport(transport.clone()), transport)
    }

    #[test]
    fn variable_listener_updates_through_poll() {
        let (mut receiver, feed) = receiver();
        let gain = Rc::new(RefCell::new(0.0f32));
        receiver.add_var("/synth/gain", &gain);

        feed.push("/synth/gain", vec![OscType::Float(0.5)]);
        assert_eq!(receiver.poll(), 1);
        assert_eq!(*gain.borrow(), 0.5);
    }

    #[test]
    fn listeners_fire_in_registration_order() {
        let (mut receiver, feed) = receiver();
        let order = Rc::new(RefCell::new(Vec::new()));
        for tag in 1..=3 {
            let order = order.clone();
            receiver.add_closure0("/step", move || order.borrow_mut().push(tag));
        }

        feed.push("/step", vec![]);
        receiver.poll();
        assert_eq!(*order.borrow(), vec![1, 2, 3]);
    }

    #[test]
    fn listener_only_fires_for_its_own_address() {
        let (mut receiver, feed) = receiver();
        let hits = Rc::new(RefCell::new(0));
        let hits_in = hits.clone();
        receiver.add_closure0("/a", move || *hits_in.borrow_mut() += 1);

        feed.push("/b", vec![OscType::Int(1)]);
        feed.push("/a", vec![]);
        receiver.poll();
        assert_eq!(*hits.borrow(), 1);
    }

    #[test]
    fn add_is_idempotent() {
        let (mut receiver, feed) = receiver();
        let hits = Rc::new(RefCell::new(0));
        receiver.add("/ping");
        let hits_in = hits.clone();
        receiver.add_closure0("/ping", move || *hits_in.borrow_mut() += 1);
        receiver.add("/ping");

        assert_eq!(receiver.bindings.len(), 1);
        feed.push("/ping", vec![]);
        receiver.poll();
        assert_eq!(*hits.borrow(), 1);
    }

    #[test]
    fn unmatched_message_goes_to_default_listener_once() {
        let (mut receiver, feed) = receiver();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_in = seen.clone();
        receiver.set_default_closure(move |msg: &OscMessage| {
            seen_in.borrow_mut().push(msg.addr.clone());
        });
        receiver.add_closure0("/known", || {});

        feed.push("/unknown", vec![OscType::Int(1)]);
        feed.push("/known", vec![]);
        receiver.poll();
        assert_eq!(*seen.borrow(), vec!["/unknown".to_string()]);
    }

    #[test]
    fn unmatched_message_without_default_is_still_counted() {
        let (mut receiver, feed) = receiver();
        receiver.count_incoming(true);

        feed.push("/nobody/home", vec![]);
        assert_eq!(receiver.poll(), 1);
        assert_eq!(receiver.count_of("/nobody/home"), 1);
    }

    #[test]
    fn counting_disabled_reports_zero() {
        let (mut receiver, feed) = receiver();
        receiver.add("/ping");
        feed.push("/ping", vec![]);
        receiver.poll();
        assert_eq!(receiver.count_of("/ping"), 0);
        assert!(!receiver.is_counting());
    }

    #[test]
    fn counts_reset_at_every_poll() {
        let (mut receiver, feed) = receiver();
        receiver.count_incoming(true);
        feed.push("/ping", vec![]);
        feed.push("/ping", vec![]);
        receiver.poll();
        assert_eq!(receiver.got_message("/ping"), 2);
        assert_eq!(receiver.counts().len(), 1);

        receiver.poll();
        assert_eq!(receiver.got_message("/ping"), 0);
        assert!(receiver.counts().is_empty());
    }

    #[test]
    fn remove_var_leaves_other_listeners_active() {
        let (mut receiver, feed) = receiver();
        let gain = Rc::new(RefCell::new(0.0f32));
        let hits = Rc::new(RefCell::new(0));
        let hits_in = hits.clone();
        receiver
            .add_var("/synth/gain", &gain)
            .add_closure0("/synth/gain", move || *hits_in.borrow_mut() += 1);

        receiver.remove_var("/synth/gain", &gain);
        feed.push("/synth/gain", vec![OscType::Float(0.9)]);
        receiver.poll();

        assert_eq!(*gain.borrow(), 0.0);
        assert_eq!(*hits.borrow(), 1);
    }

    #[test]
    fn remove_fn_matches_identity() {
        fn bump(_v: i32) {}
        fn other(_v: i32) {}

        let (mut receiver, _feed) = receiver();
        receiver.add_fn("/n", bump);
        receiver.remove_fn("/n", other);
        assert_eq!(receiver.bindings["/n"].len(), 1);
        receiver.remove_fn("/n", bump);
        assert!(receiver.bindings["/n"].is_empty());
    }

    #[test]
    fn remove_closures_spares_named_bindings() {
        let (mut receiver, feed) = receiver();
        let gain = Rc::new(RefCell::new(0.0f32));
        receiver
            .add_var("/mix", &gain)
            .add_closure("/mix", |_: f32| {})
            .add_closure0("/mix", || {});

        receiver.remove_closures("/mix");
        assert_eq!(receiver.bindings["/mix"].len(), 1);

        feed.push("/mix", vec![OscType::Float(0.25)]);
        receiver.poll();
        assert_eq!(*gain.borrow(), 0.25);
    }

    #[test]
    fn remove_address_drops_every_listener() {
        let (mut receiver, feed) = receiver();
        let hits = Rc::new(RefCell::new(0));
        let hits_in = hits.clone();
        receiver.add_closure0("/gone", move || *hits_in.borrow_mut() += 1);
        receiver.remove("/gone");

        feed.push("/gone", vec![]);
        receiver.poll();
        assert_eq!(*hits.borrow(), 0);
        assert!(receiver.bindings.is_empty());
    }

    #[test]
    fn removal_of_unknown_address_is_a_noop() {
        let (mut receiver, _feed) = receiver();
        let gain = Rc::new(RefCell::new(0.0f32));
        receiver.remove("/missing");
        receiver.remove_var("/missing", &gain);
        receiver.remove_closures("/missing");
    }

    #[test]
    fn remove_all_clears_the_registry() {
        let (mut receiver, _feed) = receiver();
        receiver.add("/a").add("/b");
        receiver.remove_all();
        assert!(receiver.bindings.is_empty());
    }

    #[test]
    fn default_listener_can_be_cleared() {
        let (mut receiver, feed) = receiver();
        let seen = Rc::new(RefCell::new(0));
        let seen_in = seen.clone();
        receiver.set_default_closure(move |_: &OscMessage| *seen_in.borrow_mut() += 1);
        receiver.clear_default_listener();

        feed.push("/whatever", vec![]);
        receiver.poll();
        assert_eq!(*seen.borrow(), 0);
    }

    #[test]
    fn default_method_receives_whole_message() {
        struct Tracker {
            last_addr: String,
            last_args: usize,
        }
        impl Tracker {
            fn record(&mut self, msg: &OscMessage) {
                self.last_addr = msg.addr.clone();
                self.last_args = msg.args.len();
            }
        }

        let (mut receiver, feed) = receiver();
        let tracker = Rc::new(RefCell::new(Tracker {
            last_addr: String::new(),
            last_args: 0,
        }));
        receiver.set_default_method(&tracker, Tracker::record);

        feed.push("/raw", vec![OscType::Int(1), OscType::Int(2)]);
        receiver.poll();
        assert_eq!(tracker.borrow().last_addr, "/raw");
        assert_eq!(tracker.borrow().last_args, 2);
    }

    #[test]
    fn dropped_target_makes_dispatch_a_noop() {
        let (mut receiver, feed) = receiver();
        let gain = Rc::new(RefCell::new(0.0f32));
        receiver.add_var("/synth/gain", &gain);
        drop(gain);

        feed.push("/synth/gain", vec![OscType::Float(1.0)]);
        assert_eq!(receiver.poll(), 1);
    }

    #[test]
    fn method_listener_dispatches_decoded_argument() {
        struct Synth {
            note: i32,
        }
        impl Synth {
            fn set_note(&mut self, note: i32) {
                self.note = note;
            }
        }

        let (mut receiver, feed) = receiver();
        let synth = Rc::new(RefCell::new(Synth { note: 0 }));
        receiver.add_method("/synth/note", &synth, Synth::set_note);

        feed.push("/synth/note", vec![OscType::Float(63.7)]);
        receiver.poll();
        assert_eq!(synth.borrow().note, 63);

        receiver.remove_method("/synth/note", &synth, Synth::set_note);
        feed.push("/synth/note", vec![OscType::Int(10)]);
        receiver.poll();
        assert_eq!(synth.borrow().note, 63);
    }
}
