use std::sync::atomic::{AtomicBool, Ordering};

/// Single-slot re-entrancy flag. A second caller is turned away, not queued.
#[derive(Debug, Default)]
pub struct InFlightGuard {
    busy: AtomicBool,
}

/// Held for the duration of one run; releases the guard on drop.
#[derive(Debug)]
pub struct InFlightTicket<'a> {
    guard: &'a InFlightGuard,
}

impl InFlightGuard {
    pub fn try_enter(&self) -> Option<InFlightTicket<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlightTicket { guard: self })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

impl Drop for InFlightTicket<'_> {
    fn drop(&mut self) {
        self.guard.busy.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_entry_is_refused_until_ticket_drops() {
        let guard = InFlightGuard::default();
        let ticket = guard.try_enter().expect("first entry");
        assert!(guard.is_busy());
        assert!(guard.try_enter().is_none());
        drop(ticket);
        assert!(!guard.is_busy());
        assert!(guard.try_enter().is_some());
    }
}
