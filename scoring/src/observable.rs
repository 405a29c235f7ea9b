use tokio::sync::watch;

/// A value that observers can follow.
///
/// Every subscriber sees the latest value and each later change; all subscribers share the one
/// stored value. Writing a value equal to the current one does not wake anybody.
#[derive(Debug)]
pub struct Observable<T> {
    tx: watch::Sender<T>,
}

impl<T: Clone + PartialEq> Observable<T> {
    pub fn new(initial: T) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    pub fn get(&self) -> T {
        self.tx.borrow().clone()
    }

    /// Reads the current value without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.tx.borrow())
    }

    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.tx.subscribe()
    }

    pub fn set(&self, value: T) {
        self.tx.send_if_modified(|current| {
            if *current == value {
                false
            } else {
                *current = value;
                true
            }
        });
    }

    pub fn modify(&self, f: impl FnOnce(&mut T)) {
        self.tx.send_if_modified(|current| {
            let before = current.clone();
            f(current);
            *current != before
        });
    }

    pub fn has_observers(&self) -> bool {
        self.tx.receiver_count() > 0
    }
}
