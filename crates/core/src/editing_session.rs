// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::editor::ReservationEditor;
use crate::session::{SessionContext, SubscriptionHandle};
use crate::signals::EditorSignals;
use crate::store::ReservationStore;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tablebook_domain::{Identity, ReservationDraft};
use tracing::debug;

/// Locks a mutex, recovering the inner value if a holder panicked.
fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One reservation-editing session wired to a shared [`SessionContext`].
///
/// `begin` subscribes the session's editor to identity changes exactly
/// once; `end` disposes the subscription so notifications never reach a
/// finished session. Dropping the session without calling `end` disposes
/// it as well.
///
/// Lock discipline: the subscription callback takes the editor lock, so
/// callers must not hold it while mutating the context.
pub struct EditingSession {
    /// The session's editor, shared with the identity subscription.
    editor: Arc<Mutex<ReservationEditor>>,
    /// The shared identity source.
    context: Arc<Mutex<SessionContext>>,
    /// The session's signal sink, shared with the identity subscription.
    signals: Arc<Mutex<dyn EditorSignals + Send>>,
    /// The live subscription, until `end` is called.
    subscription: Option<SubscriptionHandle>,
}

impl EditingSession {
    /// Starts an editing session and subscribes it to identity changes.
    ///
    /// # Arguments
    ///
    /// * `context` - The shared session context
    /// * `signals` - The presentation sink for this session
    #[must_use]
    pub fn begin(
        context: Arc<Mutex<SessionContext>>,
        signals: Arc<Mutex<dyn EditorSignals + Send>>,
    ) -> Self {
        let editor: Arc<Mutex<ReservationEditor>> = Arc::new(Mutex::new(ReservationEditor::new()));

        let subscription: SubscriptionHandle = {
            let editor: Arc<Mutex<ReservationEditor>> = Arc::clone(&editor);
            let signals: Arc<Mutex<dyn EditorSignals + Send>> = Arc::clone(&signals);
            lock(&context).subscribe(Box::new(move |identity: Option<&Identity>| {
                let mut editor: MutexGuard<'_, ReservationEditor> = lock(&editor);
                let mut sink: MutexGuard<'_, dyn EditorSignals + Send> = lock(&signals);
                editor.on_identity_changed(&mut *sink, identity);
            }))
        };
        debug!("Editing session began");

        Self {
            editor,
            context,
            signals,
            subscription: Some(subscription),
        }
    }

    /// Initializes the editor with the context's current identity.
    pub fn initialize(&self, store: &mut dyn ReservationStore, reservation_id: i64) {
        let identity: Option<Identity> = lock(&self.context).identity().cloned();
        let mut editor: MutexGuard<'_, ReservationEditor> = lock(&self.editor);
        let mut sink: MutexGuard<'_, dyn EditorSignals + Send> = lock(&self.signals);
        editor.initialize(store, &mut *sink, reservation_id, identity.as_ref());
    }

    /// Saves the working draft.
    pub fn save(&self, store: &mut dyn ReservationStore) {
        let mut editor: MutexGuard<'_, ReservationEditor> = lock(&self.editor);
        let mut sink: MutexGuard<'_, dyn EditorSignals + Send> = lock(&self.signals);
        editor.save(store, &mut *sink);
    }

    /// Deletes the loaded reservation (after confirmation via signals).
    pub fn delete(&self, store: &mut dyn ReservationStore) {
        let mut editor: MutexGuard<'_, ReservationEditor> = lock(&self.editor);
        let mut sink: MutexGuard<'_, dyn EditorSignals + Send> = lock(&self.signals);
        editor.delete(store, &mut *sink);
    }

    /// Applies an edit to the working draft.
    pub fn edit_draft(&self, edit: impl FnOnce(&mut ReservationDraft)) {
        let mut editor: MutexGuard<'_, ReservationEditor> = lock(&self.editor);
        edit(editor.draft_mut());
    }

    /// Reads editor state through a closure.
    pub fn with_editor<R>(&self, read: impl FnOnce(&ReservationEditor) -> R) -> R {
        let editor: MutexGuard<'_, ReservationEditor> = lock(&self.editor);
        read(&editor)
    }

    /// Whether the identity subscription is still live.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.subscription.is_some()
    }

    /// Ends the session, disposing its identity subscription.
    pub fn end(&mut self) {
        if let Some(handle) = self.subscription.take() {
            lock(&self.context).unsubscribe(handle);
            debug!("Editing session ended");
        }
    }
}

impl Drop for EditingSession {
    fn drop(&mut self) {
        self.end();
    }
}
