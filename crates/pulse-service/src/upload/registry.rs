//! In-flight uploads keyed by temporary attachment id

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use pulse_core::TempAttachmentId;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Default)]
pub(crate) struct UploadRegistry {
    in_flight: DashMap<TempAttachmentId, CancellationToken>,
}

impl UploadRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Register an upload; `None` if the id is already in flight
    pub(crate) fn register(&self, temp_id: TempAttachmentId) -> Option<CancellationToken> {
        match self.in_flight.entry(temp_id) {
            Entry::Occupied(_) => None,
            Entry::Vacant(slot) => {
                let cancel = CancellationToken::new();
                slot.insert(cancel.clone());
                Some(cancel)
            }
        }
    }

    pub(crate) fn cancel(&self, temp_id: &TempAttachmentId) -> bool {
        match self.in_flight.remove(temp_id) {
            Some((_, cancel)) => {
                cancel.cancel();
                true
            }
            None => false,
        }
    }

    pub(crate) fn finish(&self, temp_id: &TempAttachmentId) {
        self.in_flight.remove(temp_id);
    }

    pub(crate) fn len(&self) -> usize {
        self.in_flight.len()
    }

    pub(crate) fn cancel_all(&self) -> usize {
        let mut cancelled = 0;
        self.in_flight.retain(|_, cancel| {
            cancel.cancel();
            cancelled += 1;
            false
        });
        cancelled
    }
}
