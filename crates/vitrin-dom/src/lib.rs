//! Vitrin DOM: the host page and everything rendered into it.
//!
//! The browser document is modelled as an arena ([`dom::Document`]) shared
//! through `Rc<RefCell<_>>`; all page work runs on one thread.
//!
//! # Modules
//!
//! - [`dom`]: Arena document, selectors, and HTML serialization
//! - [`shell`]: Default host page and its attribute contract
//! - [`context`]: `PageContext`, owner of the content root
//! - [`sections`]: Section and figure markup
//! - [`contact`]: Contact/link binding
//! - [`progressive`]: Progressive image upgrades
//! - [`history`]: Session history

#![doc = include_str!("../README.md")]

pub mod contact;
pub mod context;
pub mod dom;
pub mod history;
pub mod progressive;
pub mod sections;
pub mod shell;

pub use contact::bind_contact;
pub use context::{LinkChannel, PageContext, TextSlot};
pub use dom::{Document, NodeId, SharedDocument};
pub use history::{History, HistoryOp, ViewState};
pub use progressive::{
    DisplayEnvironment, DisplayFlags, ImageLoader, ProgressiveUpgrader, Timer, TokioTimer,
    Transitions, UpgradeOutcome, UpgradeState, UpgradeTask, Variant,
};
pub use sections::{SectionBuilder, show_message};
pub use shell::landing_shell;
