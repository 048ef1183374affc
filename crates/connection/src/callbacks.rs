//! Application callback slots.
//!
//! Callbacks are invoked on the reactor thread. A slot is cloned out of its
//! lock before the call so a callback may freely call back into the client,
//! including replacing itself.

use std::sync::{Arc, Mutex, PoisonError};

use linkwire_protocol::Envelope;
use linkwire_transfer::TransferEvent;

pub(crate) type ConnectFn = dyn Fn() + Send + Sync;
pub(crate) type DisconnectFn = dyn Fn() + Send + Sync;
pub(crate) type ReceiveFn = dyn Fn(&Envelope) + Send + Sync;
pub(crate) type SendCompleteFn = dyn Fn(usize) + Send + Sync;
pub(crate) type TransferFn = dyn Fn(&TransferEvent) + Send + Sync;

type Slot<F> = Mutex<Option<Arc<F>>>;

#[derive(Default)]
pub(crate) struct Callbacks {
    on_connect: Slot<ConnectFn>,
    on_disconnect: Slot<DisconnectFn>,
    on_receive: Slot<ReceiveFn>,
    on_send_complete: Slot<SendCompleteFn>,
    on_transfer: Slot<TransferFn>,
}

fn load<F: ?Sized>(slot: &Slot<F>) -> Option<Arc<F>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner).clone()
}

fn store<F: ?Sized>(slot: &Slot<F>, f: Arc<F>) {
    *slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(f);
}

impl Callbacks {
    pub(crate) fn set_on_connect(&self, f: Arc<ConnectFn>) {
        store(&self.on_connect, f);
    }

    pub(crate) fn set_on_disconnect(&self, f: Arc<DisconnectFn>) {
        store(&self.on_disconnect, f);
    }

    pub(crate) fn set_on_receive(&self, f: Arc<ReceiveFn>) {
        store(&self.on_receive, f);
    }

    pub(crate) fn set_on_send_complete(&self, f: Arc<SendCompleteFn>) {
        store(&self.on_send_complete, f);
    }

    pub(crate) fn set_on_transfer(&self, f: Arc<TransferFn>) {
        store(&self.on_transfer, f);
    }

    pub(crate) fn connected(&self) {
        if let Some(f) = load(&self.on_connect) {
            f();
        }
    }

    pub(crate) fn disconnected(&self) {
        if let Some(f) = load(&self.on_disconnect) {
            f();
        }
    }

    pub(crate) fn received(&self, envelope: &Envelope) {
        if let Some(f) = load(&self.on_receive) {
            f(envelope);
        }
    }

    pub(crate) fn send_completed(&self, bytes: usize) {
        if let Some(f) = load(&self.on_send_complete) {
            f(bytes);
        }
    }

    pub(crate) fn transfer(&self, event: &TransferEvent) {
        if let Some(f) = load(&self.on_transfer) {
            f(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn unset_callbacks_are_noops() {
        let callbacks = Callbacks::default();
        callbacks.connected();
        callbacks.disconnected();
        callbacks.received(&Envelope::heartbeat_ack());
        callbacks.send_completed(3);
    }

    #[test]
    fn replacing_a_callback_takes_effect() {
        let callbacks = Callbacks::default();
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        let c = first.clone();
        callbacks.set_on_send_complete(Arc::new(move |n| {
            c.fetch_add(n, Ordering::SeqCst);
        }));
        callbacks.send_completed(5);

        let c = second.clone();
        callbacks.set_on_send_complete(Arc::new(move |n| {
            c.fetch_add(n, Ordering::SeqCst);
        }));
        callbacks.send_completed(7);

        assert_eq!(first.load(Ordering::SeqCst), 5);
        assert_eq!(second.load(Ordering::SeqCst), 7);
    }

    #[test]
    fn callback_may_replace_itself() {
        let callbacks = Arc::new(Callbacks::default());
        let hits = Arc::new(AtomicUsize::new(0));

        let cb = callbacks.clone();
        let h = hits.clone();
        callbacks.set_on_connect(Arc::new(move || {
            h.fetch_add(1, Ordering::SeqCst);
            cb.set_on_connect(Arc::new(|| {}));
        }));

        callbacks.connected();
        callbacks.connected();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
