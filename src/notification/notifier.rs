use crate::notification::{ReleaseCause, ReleaseListener};

pub(crate) struct ReleaseNotifier {
    listener: Option<ReleaseListener>,
    #[cfg(feature = "logging")]
    cache_name: Option<String>,
}

impl ReleaseNotifier {
    pub(crate) fn new(listener: Option<ReleaseListener>, _cache_name: Option<String>) -> Self {
        Self {
            listener,
            #[cfg(feature = "logging")]
            cache_name: _cache_name,
        }
    }

    pub(crate) fn notify(&self, cause: ReleaseCause) {
        use std::panic::{catch_unwind, AssertUnwindSafe};

        #[cfg(feature = "logging")]
        log_release(cause, self.cache_name.as_deref());

        let listener = match &self.listener {
            Some(listener) => listener,
            None => return,
        };

        // Safety: It is safe to assert unwind safety here because the listener
        // is never called again for this cache.
        let result = catch_unwind(AssertUnwindSafe(|| listener(cause)));
        if let Err(_payload) = result {
            #[cfg(feature = "logging")]
            log_panic(&*_payload, self.cache_name.as_deref());
        }
    }
}

#[cfg(feature = "logging")]
fn log_release(cause: ReleaseCause, cache_name: Option<&str>) {
    let cn = cache_name
        .map(|name| format!("[{name}] "))
        .unwrap_or_default();

    match cause {
        ReleaseCause::Explicit => log::debug!("{cn}Released the cache lock"),
        ReleaseCause::Dropped => {
            log::warn!("{cn}The cache was dropped without calling dispose; released the lock")
        }
    }
}

#[cfg(feature = "logging")]
fn log_panic(payload: &(dyn std::any::Any + Send + 'static), cache_name: Option<&str>) {
    // Try to downcast the payload into &str or String.
    let message: Option<std::borrow::Cow<'_, str>> =
        (payload.downcast_ref::<&str>().map(|s| (*s).into()))
            .or_else(|| payload.downcast_ref::<String>().map(Into::into));

    let cn = cache_name
        .map(|name| format!("[{name}] "))
        .unwrap_or_default();

    if let Some(m) = message {
        log::error!("{cn}The release listener panicked at '{m}'");
    } else {
        log::error!("{cn}The release listener panicked");
    }
}

#[cfg(test)]
mod tests {
    use super::ReleaseNotifier;
    use crate::notification::{ReleaseCause, ReleaseListener};

    use parking_lot::Mutex;
    use std::sync::Arc;

    #[test]
    fn notify_listener() {
        let causes = Arc::new(Mutex::new(Vec::new()));
        let listener: ReleaseListener = {
            let causes = Arc::clone(&causes);
            Arc::new(move |cause| causes.lock().push(cause))
        };

        let notifier = ReleaseNotifier::new(Some(listener), Some("test".into()));
        notifier.notify(ReleaseCause::Explicit);

        assert_eq!(*causes.lock(), vec![ReleaseCause::Explicit]);
    }

    #[test]
    fn panicking_listener_is_contained() {
        let listener: ReleaseListener = Arc::new(|_| panic!("boom"));
        let notifier = ReleaseNotifier::new(Some(listener), None);

        // Must not propagate the panic.
        notifier.notify(ReleaseCause::Dropped);
    }
}
