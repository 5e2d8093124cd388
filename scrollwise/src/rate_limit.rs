//! Host-clocked debounce and throttle primitives.
//!
//! Nothing here owns a timer. The host passes its monotonic clock (`now_ms`) into every call
//! and polls debouncers from its frame/timer tick. Dropping or disposing a limiter therefore
//! cancels whatever was pending; there is no callback left behind to fire later.

/// Trailing-edge debounce state: only the last call within a quiet period of `wait_ms` survives.
#[derive(Clone, Debug)]
pub struct Debouncer<A> {
    wait_ms: u64,
    pending: Option<(A, u64)>,
    disposed: bool,
}

impl<A> Debouncer<A> {
    pub fn new(wait_ms: u64) -> Self {
        Self {
            wait_ms,
            pending: None,
            disposed: false,
        }
    }

    pub fn wait_ms(&self) -> u64 {
        self.wait_ms
    }

    /// Records a call, replacing any pending one and pushing the deadline to `now_ms + wait_ms`.
    ///
    /// Ignored after [`Self::dispose`].
    pub fn call(&mut self, args: A, now_ms: u64) {
        if self.disposed {
            return;
        }
        let due = now_ms.saturating_add(self.wait_ms);
        if self.pending.is_some() {
            swtrace!(now_ms, due, "debounce: rescheduled");
        }
        self.pending = Some((args, due));
    }

    /// Returns the pending arguments once their deadline has passed.
    pub fn poll(&mut self, now_ms: u64) -> Option<A> {
        match &self.pending {
            Some((_, due)) if now_ms >= *due => self.pending.take().map(|(args, _)| args),
            _ => None,
        }
    }

    /// Takes the pending arguments regardless of the deadline.
    pub fn flush(&mut self) -> Option<A> {
        self.pending.take().map(|(args, _)| args)
    }

    /// When the pending call becomes due, if any.
    pub fn deadline(&self) -> Option<u64> {
        self.pending.as_ref().map(|(_, due)| *due)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Drops the pending call. Returns `true` if there was one.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    /// Cancels the pending call and ignores every later call.
    pub fn dispose(&mut self) {
        self.cancel();
        self.disposed = true;
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

/// Leading-edge throttle state: at most one admitted call per `limit_ms`.
#[derive(Clone, Copy, Debug)]
pub struct Throttler {
    limit_ms: u64,
    last_fired_ms: Option<u64>,
    disposed: bool,
}

impl Throttler {
    pub fn new(limit_ms: u64) -> Self {
        Self {
            limit_ms,
            last_fired_ms: None,
            disposed: false,
        }
    }

    pub fn limit_ms(&self) -> u64 {
        self.limit_ms
    }

    /// Returns `true` when a call at `now_ms` should run, and restarts the cooldown if so.
    pub fn admit(&mut self, now_ms: u64) -> bool {
        if self.disposed {
            return false;
        }
        let ready = match self.last_fired_ms {
            None => true,
            Some(last) => now_ms.saturating_sub(last) >= self.limit_ms,
        };
        if ready {
            self.last_fired_ms = Some(now_ms);
        } else {
            swtrace!(now_ms, "throttle: dropped");
        }
        ready
    }

    /// Ends the current cooldown so the next call runs immediately.
    pub fn reset(&mut self) {
        self.last_fired_ms = None;
    }

    pub fn dispose(&mut self) {
        self.last_fired_ms = None;
        self.disposed = true;
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

/// A function wrapped in a [`Debouncer`].
///
/// ```
/// use scrollwise::Debounced;
///
/// let mut seen = Vec::new();
/// let mut search = Debounced::new(50, |q: &str| seen.push(q.to_owned()));
/// search.call("r", 0);
/// search.call("ru", 10);
/// search.call("rus", 20);
/// assert!(!search.poll(69));
/// assert!(search.poll(70));
/// drop(search);
/// assert_eq!(seen, ["rus"]);
/// ```
pub struct Debounced<A, F> {
    state: Debouncer<A>,
    f: F,
}

impl<A, F: FnMut(A)> Debounced<A, F> {
    pub fn new(wait_ms: u64, f: F) -> Self {
        Self {
            state: Debouncer::new(wait_ms),
            f,
        }
    }

    pub fn call(&mut self, args: A, now_ms: u64) {
        self.state.call(args, now_ms);
    }

    /// Runs the wrapped function if the pending call is due. Returns `true` if it ran.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        match self.state.poll(now_ms) {
            Some(args) => {
                (self.f)(args);
                true
            }
            None => false,
        }
    }

    /// Runs the pending call now, if any.
    pub fn flush(&mut self) -> bool {
        match self.state.flush() {
            Some(args) => {
                (self.f)(args);
                true
            }
            None => false,
        }
    }

    pub fn deadline(&self) -> Option<u64> {
        self.state.deadline()
    }

    pub fn is_pending(&self) -> bool {
        self.state.is_pending()
    }

    pub fn cancel(&mut self) -> bool {
        self.state.cancel()
    }

    pub fn dispose(&mut self) {
        self.state.dispose();
    }
}

impl<A, F> core::fmt::Debug for Debounced<A, F> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Debounced")
            .field("wait_ms", &self.state.wait_ms)
            .field("deadline", &self.state.pending.as_ref().map(|(_, due)| *due))
            .field("disposed", &self.state.disposed)
            .finish_non_exhaustive()
    }
}

/// A function wrapped in a [`Throttler`].
pub struct Throttled<F> {
    state: Throttler,
    f: F,
}

impl<F> Throttled<F> {
    pub fn new(limit_ms: u64, f: F) -> Self {
        Self {
            state: Throttler::new(limit_ms),
            f,
        }
    }

    /// Runs the wrapped function if the cooldown has elapsed. Returns `true` if it ran.
    pub fn call<A>(&mut self, args: A, now_ms: u64) -> bool
    where
        F: FnMut(A),
    {
        if !self.state.admit(now_ms) {
            return false;
        }
        (self.f)(args);
        true
    }

    pub fn dispose(&mut self) {
        self.state.dispose();
    }
}

impl<F> core::fmt::Debug for Throttled<F> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Throttled")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
