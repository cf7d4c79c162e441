use crossbeam_channel::{Receiver, Sender, unbounded};

use crate::mutation::Mutation;

/// Cloneable handle for producers off the render thread.
#[derive(Clone, Debug)]
pub struct MutationSender {
    tx: Sender<Mutation>,
}

impl MutationSender {
    /// Returns `false` once the queue is gone.
    pub fn send(&self, m: Mutation) -> bool {
        self.tx.send(m).is_ok()
    }
}

/// Mutations submitted from any thread, applied on the render thread between
/// passes so cache writes never race the resolver.
#[derive(Debug)]
pub struct MutationQueue {
    tx: Sender<Mutation>,
    rx: Receiver<Mutation>,
}

impl Default for MutationQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl MutationQueue {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    pub fn sender(&self) -> MutationSender {
        MutationSender {
            tx: self.tx.clone(),
        }
    }

    pub fn push(&self, m: Mutation) {
        // Both ends live in `self`, so the channel cannot be disconnected here.
        let _ = self.tx.send(m);
    }

    /// Everything queued so far, in submission order.
    pub fn drain(&self) -> Vec<Mutation> {
        self.rx.try_iter().collect()
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}
