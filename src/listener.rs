//! Listener bindings stored in the receiver's address registry.
//!
//! A binding pairs a type-erased invoke closure with the identity data needed
//! for targeted removal. Variable and method bindings hold `Weak` references
//! into caller-owned `Rc<RefCell<..>>` storage: the registry never takes
//! ownership, and a dropped target turns dispatch into a no-op.

use std::any::TypeId;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use rosc::OscMessage;

use crate::decode::Decode;

type Invoke = Box<dyn FnMut(&OscMessage)>;

/// One registered listener. Closures carry no identity and can only be
/// removed as a group; every other variant supports structural matching
/// against a [`BindingId`] probe.
pub(crate) enum Binding {
    Variable {
        // identity only, never dereferenced
        target: *const (),
        invoke: Invoke,
    },
    Function {
        func: usize,
        arg: TypeId,
        invoke: Invoke,
    },
    Closure {
        invoke: Invoke,
    },
    Method {
        object: *const (),
        func: usize,
        arg: TypeId,
        invoke: Invoke,
    },
}

impl Binding {
    pub(crate) fn variable<T: Decode + 'static>(var: &Rc<RefCell<T>>) -> Self {
        let weak = Rc::downgrade(var);
        Binding::Variable {
            target: Weak::as_ptr(&weak) as *const (),
            invoke: Box::new(move |msg| match weak.upgrade() {
                Some(cell) => *cell.borrow_mut() = T::decode(msg, 0),
                None => tracing::debug!("variable binding target dropped, skipping dispatch"),
            }),
        }
    }

    pub(crate) fn function<T: Decode + 'static>(func: fn(T)) -> Self {
        Binding::Function {
            func: func as usize,
            arg: TypeId::of::<T>(),
            invoke: Box::new(move |msg| func(T::decode(msg, 0))),
        }
    }

    pub(crate) fn function0(func: fn()) -> Self {
        Binding::Function {
            func: func as usize,
            arg: TypeId::of::<()>(),
            invoke: Box::new(move |_msg| func()),
        }
    }

    pub(crate) fn closure<T, F>(mut f: F) -> Self
    where
        T: Decode + 'static,
        F: FnMut(T) + 'static,
    {
        Binding::Closure {
            invoke: Box::new(move |msg| f(T::decode(msg, 0))),
        }
    }

    pub(crate) fn closure0<F: FnMut() + 'static>(mut f: F) -> Self {
        Binding::Closure {
            invoke: Box::new(move |_msg| f()),
        }
    }

    pub(crate) fn method<O, T>(obj: &Rc<RefCell<O>>, func: fn(&mut O, T)) -> Self
    where
        O: 'static,
        T: Decode + 'static,
    {
        let weak = Rc::downgrade(obj);
        Binding::Method {
            object: Weak::as_ptr(&weak) as *const (),
            func: func as usize,
            arg: TypeId::of::<T>(),
            invoke: Box::new(move |msg| match weak.upgrade() {
                Some(cell) => func(&mut cell.borrow_mut(), T::decode(msg, 0)),
                None => tracing::debug!("method binding target dropped, skipping dispatch"),
            }),
        }
    }

    pub(crate) fn method0<O: 'static>(obj: &Rc<RefCell<O>>, func: fn(&mut O)) -> Self {
        let weak = Rc::downgrade(obj);
        Binding::Method {
            object: Weak::as_ptr(&weak) as *const (),
            func: func as usize,
            arg: TypeId::of::<()>(),
            invoke: Box::new(move |_msg| match weak.upgrade() {
                Some(cell) => func(&mut cell.borrow_mut()),
                None => tracing::debug!("method binding target dropped, skipping dispatch"),
            }),
        }
    }

    // Default-listener constructors: same variants, but the argument is the
    // whole message rather than a decoded value.

    pub(crate) fn message_function(func: fn(&OscMessage)) -> Self {
        Binding::Function {
            func: func as usize,
            arg: TypeId::of::<OscMessage>(),
            invoke: Box::new(move |msg| func(msg)),
        }
    }

    pub(crate) fn message_closure<F: FnMut(&OscMessage) + 'static>(mut f: F) -> Self {
        Binding::Closure {
            invoke: Box::new(move |msg| f(msg)),
        }
    }

    pub(crate) fn message_method<O: 'static>(
        obj: &Rc<RefCell<O>>,
        func: fn(&mut O, &OscMessage),
    ) -> Self {
        let weak = Rc::downgrade(obj);
        Binding::Method {
            object: Weak::as_ptr(&weak) as *const (),
            func: func as usize,
            arg: TypeId::of::<OscMessage>(),
            invoke: Box::new(move |msg| match weak.upgrade() {
                Some(cell) => func(&mut cell.borrow_mut(), msg),
                None => tracing::debug!("default listener target dropped, skipping dispatch"),
            }),
        }
    }

    pub(crate) fn dispatch(&mut self, msg: &OscMessage) {
        match self {
            Binding::Variable { invoke, .. }
            | Binding::Function { invoke, .. }
            | Binding::Closure { invoke }
            | Binding::Method { invoke, .. } => invoke(msg),
        }
    }

    /// Structural identity check against a removal probe. Closures never
    /// match: there is no stable identity to compare.
    pub(crate) fn matches(&self, probe: &BindingId) -> bool {
        match (self, probe) {
            (Binding::Variable { target, .. }, BindingId::Variable { target: t }) => target == t,
            (Binding::Function { func, arg, .. }, BindingId::Function { func: f, arg: a }) => {
                func == f && arg == a
            }
            (
                Binding::Method {
                    object, func, arg, ..
                },
                BindingId::Method {
                    object: o,
                    func: f,
                    arg: a,
                },
            ) => object == o && func == f && arg == a,
            _ => false,
        }
    }

    pub(crate) fn is_closure(&self) -> bool {
        matches!(self, Binding::Closure { .. })
    }
}

/// Identity probe built from the same references a binding was registered
/// with, used to find matching entries on removal.
pub(crate) enum BindingId {
    Variable {
        target: *const (),
    },
    Function {
        func: usize,
        arg: TypeId,
    },
    Method {
        object: *const (),
        func: usize,
        arg: TypeId,
    },
}

impl BindingId {
    pub(crate) fn variable<T: 'static>(var: &Rc<RefCell<T>>) -> Self {
        BindingId::Variable {
            target: Rc::as_ptr(var) as *const (),
        }
    }

    pub(crate) fn function<T: Decode + 'static>(func: fn(T)) -> Self {
        BindingId::Function {
            func: func as usize,
            arg: TypeId::of::<T>(),
        }
    }

    pub(crate) fn function0(func: fn()) -> Self {
        BindingId::Function {
            func: func as usize,
            arg: TypeId::of::<()>(),
        }
    }

    pub(crate) fn method<O, T>(obj: &Rc<RefCell<O>>, func: fn(&mut O, T)) -> Self
    where
        O: 'static,
        T: Decode + 'static,
    {
        BindingId::Method {
            object: Rc::as_ptr(obj) as *const (),
            func: func as usize,
            arg: TypeId::of::<T>(),
        }
    }

    pub(crate) fn method0<O: 'static>(obj: &Rc<RefCell<O>>, func: fn(&mut O)) -> Self {
        BindingId::Method {
            object: Rc::as_ptr(obj) as *const (),
            func: func as usize,
            arg: TypeId::of::<()>(),
        }
    }
}
