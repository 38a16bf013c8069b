//! Session history.
//!
//! An in-memory model of the browser history stack, enough to keep the
//! landing view tagged in the current entry across back/forward
//! navigation.

use url::Url;

/// View marker recorded for the landing page.
pub const LANDING_VIEW: &str = "landing";

/// State object attached to a history entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub view: String,
}

impl ViewState {
    pub fn landing() -> Self {
        Self {
            view: LANDING_VIEW.to_string(),
        }
    }

    pub fn is_landing(&self) -> bool {
        self.view == LANDING_VIEW
    }
}

/// One history entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub state: Option<ViewState>,
    pub url: Url,
}

/// Which history operation a sync performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryOp {
    Push,
    Replace,
}

/// Session history for one page lifetime.
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<HistoryEntry>,
    index: usize,
    synced: bool,
}

impl History {
    /// Start a history whose only entry is `url` with no state.
    pub fn new(url: Url) -> Self {
        Self {
            entries: vec![HistoryEntry { state: None, url }],
            index: 0,
            synced: false,
        }
    }

    /// The current entry.
    pub fn current(&self) -> &HistoryEntry {
        &self.entries[self.index]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Push an entry after the current one, dropping any forward entries.
    pub fn push_state(&mut self, state: Option<ViewState>, url: Url) {
        self.entries.truncate(self.index + 1);
        self.entries.push(HistoryEntry { state, url });
        self.index = self.entries.len() - 1;
    }

    /// Overwrite the current entry.
    pub fn replace_state(&mut self, state: Option<ViewState>, url: Url) {
        self.entries[self.index] = HistoryEntry { state, url };
    }

    /// Tag the current location as the landing view.
    ///
    /// The first sync of a page lifetime pushes a new entry; later syncs
    /// replace the current one.
    pub fn sync_landing(&mut self) -> HistoryOp {
        let url = landing_url(&self.current().url);
        if self.synced {
            self.replace_state(Some(ViewState::landing()), url);
            HistoryOp::Replace
        } else {
            self.synced = true;
            self.push_state(Some(ViewState::landing()), url);
            HistoryOp::Push
        }
    }

    /// Step back one entry. Returns the new current state, like `popstate`.
    pub fn back(&mut self) -> Option<Option<&ViewState>> {
        if self.index == 0 {
            return None;
        }
        self.index -= 1;
        Some(self.current().state.as_ref())
    }

    /// Step forward one entry.
    pub fn forward(&mut self) -> Option<Option<&ViewState>> {
        if self.index + 1 >= self.entries.len() {
            return None;
        }
        self.index += 1;
        Some(self.current().state.as_ref())
    }

    /// React to navigation: re-tag the current entry as the landing view
    /// unless it already is. Returns whether the entry was replaced.
    pub fn on_popstate(&mut self) -> bool {
        if self
            .current()
            .state
            .as_ref()
            .is_some_and(ViewState::is_landing)
        {
            return false;
        }
        let url = landing_url(&self.current().url);
        self.replace_state(Some(ViewState::landing()), url);
        log::debug!("history entry re-tagged as {LANDING_VIEW}");
        true
    }
}

fn landing_url(url: &Url) -> Url {
    let mut url = url.clone();
    url.set_fragment(Some(LANDING_VIEW));
    url
}
