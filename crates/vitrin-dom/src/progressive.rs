//! Progressive image upgrades.
//!
//! A `<picture data-progressive>` first shows low-resolution placeholders.
//! The upgrader preloads the final URLs held in `data-large-light` /
//! `data-large-dark` and swaps them in, cross-fading an overlay when the
//! swapped variant is on screen.
//!
//! Each variant runs its own state machine, terminal after the first
//! success or failure:
//!
//! ```text
//! Idle -> Preloading -> Swapping -> Committed
//!              |
//!              +-----> Failed (placeholder stays, no retry)
//! ```
//!
//! The cross-fade waits for the overlay's opacity transition to end or for
//! the safety timeout, whichever comes first. Everything the machine
//! depends on outside the document (image loading, media preferences,
//! transition events, time) goes through a trait so it can be driven
//! deterministically.
//!
//! Pictures are upgraded at most once: a picture joins the `upgraded` set
//! the moment it is discovered, before any preload starts.
//!
//! Light and dark fades on one picture may overlap. The picture's forced
//! `position` is restored only when its last overlay goes away.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::{self, FutureExt, LocalBoxFuture};
use vitrin_core::Result;
use vitrin_core::traits::{DEFAULT_FADE, DEFAULT_SAFETY_TIMEOUT};

use crate::dom::{Document, NodeId, SharedDocument};
use crate::sections::{DARK_MEDIA, LARGE_DARK_ATTR, LARGE_LIGHT_ATTR, PROGRESSIVE_ATTR};

/// Marks the temporary overlay image used for the cross-fade.
pub const OVERLAY_ATTR: &str = "data-progressive-overlay";

// ============================================================================
// State machine types
// ============================================================================

/// Light or dark colour-scheme variant of a picture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    Light,
    Dark,
}

impl Variant {
    /// Attribute holding this variant's high-resolution URL.
    pub fn large_attr(self) -> &'static str {
        match self {
            Self::Light => LARGE_LIGHT_ATTR,
            Self::Dark => LARGE_DARK_ATTR,
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Light => f.write_str("light"),
            Self::Dark => f.write_str("dark"),
        }
    }
}

/// Upgrade state of one picture variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpgradeState {
    /// Discovered, nothing started.
    Idle,
    /// High-resolution URL is being probed off-DOM.
    Preloading,
    /// Preload succeeded; the URL is being swapped in.
    Swapping,
    /// The high-resolution URL is displayed.
    Committed,
    /// Preload failed; the placeholder stays.
    Failed,
}

impl UpgradeState {
    /// Whether no further transition can happen.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Committed | Self::Failed)
    }
}

/// How a cross-fade finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadeEnd {
    /// The overlay reported the end of its opacity transition.
    TransitionEnd,
    /// The safety timeout elapsed first.
    Timeout,
}

/// Final report for one variant upgrade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpgradeOutcome {
    /// The `<picture>` element.
    pub picture: NodeId,
    /// Which variant this run upgraded.
    pub variant: Variant,
    /// The high-resolution URL.
    pub url: String,
    /// Terminal state.
    pub state: UpgradeState,
    /// How the cross-fade ended; `None` when the swap was not animated.
    pub fade: Option<FadeEnd>,
}

/// A pending variant upgrade. Drive it on the page's event loop.
pub type UpgradeTask = LocalBoxFuture<'static, UpgradeOutcome>;

// ============================================================================
// Seams
// ============================================================================

/// Loads an image off-DOM to learn whether it is available.
#[async_trait(?Send)]
pub trait ImageLoader {
    /// Resolve once the image has loaded; fail if it cannot be.
    async fn preload(&self, url: &str) -> Result<()>;
}

/// User and document display conditions, read at swap time.
pub trait DisplayEnvironment {
    /// `prefers-reduced-motion: reduce`.
    fn prefers_reduced_motion(&self) -> bool;

    /// `prefers-color-scheme: dark`.
    fn prefers_dark(&self) -> bool;

    /// Whether the document is hidden (background tab, headless).
    fn is_hidden(&self) -> bool;
}

/// Reports when an element's opacity transition has ended.
#[async_trait(?Send)]
pub trait Transitions {
    /// Resolve when `node` fires the end of its opacity transition.
    async fn opacity_end(&self, node: NodeId);
}

/// Source of delays.
#[async_trait(?Send)]
pub trait Timer {
    /// Sleep for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// [`Timer`] backed by the tokio clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioTimer;

#[async_trait(?Send)]
impl Timer for TokioTimer {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Mutable display flags; changes are seen by swaps that happen later.
#[derive(Debug, Default)]
pub struct DisplayFlags {
    reduced_motion: Cell<bool>,
    dark: Cell<bool>,
    hidden: Cell<bool>,
}

impl DisplayFlags {
    /// Create flags with explicit initial values.
    pub fn new(reduced_motion: bool, dark: bool, hidden: bool) -> Self {
        Self {
            reduced_motion: reduced_motion.into(),
            dark: dark.into(),
            hidden: hidden.into(),
        }
    }

    pub fn set_reduced_motion(&self, value: bool) {
        self.reduced_motion.set(value);
    }

    pub fn set_dark(&self, value: bool) {
        self.dark.set(value);
    }

    pub fn set_hidden(&self, value: bool) {
        self.hidden.set(value);
    }
}

impl DisplayEnvironment for DisplayFlags {
    fn prefers_reduced_motion(&self) -> bool {
        self.reduced_motion.get()
    }

    fn prefers_dark(&self) -> bool {
        self.dark.get()
    }

    fn is_hidden(&self) -> bool {
        self.hidden.get()
    }
}

// ============================================================================
// Upgrader
// ============================================================================

/// Discovers progressive pictures and upgrades them.
///
/// Cloning is cheap and clones share the `upgraded` set.
#[derive(Clone)]
pub struct ProgressiveUpgrader {
    doc: SharedDocument,
    loader: Rc<dyn ImageLoader>,
    env: Rc<dyn DisplayEnvironment>,
    timer: Rc<dyn Timer>,
    transitions: Option<Rc<dyn Transitions>>,
    upgraded: Rc<RefCell<HashSet<NodeId>>>,
    positions: Rc<RefCell<HashMap<NodeId, PositionHold>>>,
    fade: Duration,
    safety_timeout: Duration,
}

impl fmt::Debug for ProgressiveUpgrader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressiveUpgrader")
            .field("upgraded", &self.upgraded.borrow().len())
            .field("fade", &self.fade)
            .field("safety_timeout", &self.safety_timeout)
            .finish_non_exhaustive()
    }
}

/// A picture's `position` while overlays are laid over it.
struct PositionHold {
    /// Inline `position` before it was forced; `None` when nothing was forced.
    restore: Option<Option<String>>,
    overlays: usize,
}

impl ProgressiveUpgrader {
    /// Create an upgrader with default display flags, tokio timing, and the
    /// default fade (450 ms) and safety timeout (900 ms).
    pub fn new(doc: SharedDocument, loader: Rc<dyn ImageLoader>) -> Self {
        Self {
            doc,
            loader,
            env: Rc::new(DisplayFlags::default()),
            timer: Rc::new(TokioTimer),
            transitions: None,
            upgraded: Rc::new(RefCell::new(HashSet::new())),
            positions: Rc::new(RefCell::new(HashMap::new())),
            fade: DEFAULT_FADE,
            safety_timeout: DEFAULT_SAFETY_TIMEOUT,
        }
    }

    /// Use a different display environment.
    pub fn with_environment(mut self, env: Rc<dyn DisplayEnvironment>) -> Self {
        self.env = env;
        self
    }

    /// Use a different timer.
    pub fn with_timer(mut self, timer: Rc<dyn Timer>) -> Self {
        self.timer = timer;
        self
    }

    /// Use a different source of transition-end notifications.
    ///
    /// Without one, a transition ends when the fade duration elapses.
    pub fn with_transitions(mut self, transitions: Rc<dyn Transitions>) -> Self {
        self.transitions = Some(transitions);
        self
    }

    /// Set the cross-fade duration.
    pub fn with_fade(mut self, fade: Duration) -> Self {
        self.fade = fade;
        self
    }

    /// Set the safety timeout for the cross-fade.
    pub fn with_safety_timeout(mut self, timeout: Duration) -> Self {
        self.safety_timeout = timeout;
        self
    }

    /// Whether a picture has already been claimed by a scan.
    pub fn is_tracked(&self, picture: NodeId) -> bool {
        self.upgraded.borrow().contains(&picture)
    }

    /// Discover new progressive pictures and return their upgrade tasks.
    ///
    /// Safe to call repeatedly; pictures claimed by an earlier scan are
    /// skipped. The tasks are independent and may complete in any order.
    pub fn scan(&self) -> Vec<UpgradeTask> {
        let doc = self.doc.borrow();
        let mut upgraded = self.upgraded.borrow_mut();
        let mut tasks = Vec::new();

        for picture in doc.select_by_attr(PROGRESSIVE_ATTR, None) {
            if upgraded.contains(&picture) {
                continue;
            }
            let variants: Vec<(Variant, String)> = [Variant::Light, Variant::Dark]
                .into_iter()
                .filter_map(|v| {
                    doc.attr(picture, v.large_attr())
                        .filter(|url| !url.is_empty())
                        .map(|url| (v, url.to_string()))
                })
                .collect();
            if variants.is_empty() {
                continue;
            }
            upgraded.insert(picture);
            for (variant, url) in variants {
                log::debug!("discovered {variant} upgrade for {picture:?}: {url}");
                let this = self.clone();
                tasks.push(async move { this.upgrade(picture, variant, url).await }.boxed_local());
            }
        }
        tasks
    }

    /// Scan and drive every discovered upgrade to completion.
    pub async fn run_scan(&self) -> Vec<UpgradeOutcome> {
        future::join_all(self.scan()).await
    }

    /// Run one variant through the state machine.
    async fn upgrade(&self, picture: NodeId, variant: Variant, url: String) -> UpgradeOutcome {
        let mut outcome = UpgradeOutcome {
            picture,
            variant,
            url,
            state: UpgradeState::Idle,
            fade: None,
        };

        outcome.state = UpgradeState::Preloading;
        if let Err(e) = self.loader.preload(&outcome.url).await {
            log::debug!("keeping placeholder for {picture:?} ({variant}): {e}");
            outcome.state = UpgradeState::Failed;
            return outcome;
        }

        outcome.state = UpgradeState::Swapping;
        let committed = if self.should_animate(picture, variant) {
            let (fade, committed) = self.cross_fade(picture, variant, &outcome.url).await;
            outcome.fade = Some(fade);
            committed
        } else {
            commit(&mut self.doc.borrow_mut(), picture, variant, &outcome.url)
        };

        outcome.state = if committed {
            UpgradeState::Committed
        } else {
            UpgradeState::Failed
        };
        log::debug!(
            "{variant} upgrade for {picture:?} finished: {:?}",
            outcome.state
        );
        outcome
    }

    /// Decide at swap time whether the swap is worth animating.
    fn should_animate(&self, picture: NodeId, variant: Variant) -> bool {
        if self.env.prefers_reduced_motion() || self.env.is_hidden() {
            return false;
        }
        let doc = self.doc.borrow();
        doc.is_connected(picture) && displayed_variant(&doc, picture, self.env.as_ref()) == variant
    }

    async fn cross_fade(&self, picture: NodeId, variant: Variant, url: &str) -> (FadeEnd, bool) {
        let overlay = {
            let mut doc = self.doc.borrow_mut();
            self.hold_position(&mut doc, picture);
            match insert_overlay(&mut doc, picture, url, self.fade) {
                Ok(overlay) => overlay,
                Err(e) => {
                    log::warn!("cross-fade unavailable for {picture:?}: {e}");
                    self.release_position(&mut doc, picture);
                    let committed = commit(&mut doc, picture, variant, url);
                    return (FadeEnd::TransitionEnd, committed);
                }
            }
        };

        let fade_end = tokio::select! {
            _ = self.wait_transition(overlay) => FadeEnd::TransitionEnd,
            _ = self.timer.sleep(self.safety_timeout) => FadeEnd::Timeout,
        };

        let mut doc = self.doc.borrow_mut();
        let committed = commit(&mut doc, picture, variant, url);
        doc.remove(overlay);
        self.release_position(&mut doc, picture);
        (fade_end, committed)
    }

    /// Make the picture a containing block for one more overlay.
    fn hold_position(&self, doc: &mut Document, picture: NodeId) {
        let mut holds = self.positions.borrow_mut();
        if let Some(hold) = holds.get_mut(&picture) {
            hold.overlays += 1;
            return;
        }
        let previous = doc.style(picture, "position").map(String::from);
        let restore = match previous.as_deref() {
            None | Some("static") => {
                doc.set_style(picture, "position", "relative");
                Some(previous)
            }
            Some(_) => None,
        };
        holds.insert(picture, PositionHold { restore, overlays: 1 });
    }

    /// Drop one overlay's hold; the last one restores the original position.
    fn release_position(&self, doc: &mut Document, picture: NodeId) {
        let mut holds = self.positions.borrow_mut();
        let Some(hold) = holds.get_mut(&picture) else {
            return;
        };
        hold.overlays -= 1;
        if hold.overlays > 0 {
            return;
        }
        if let Some(PositionHold {
            restore: Some(previous),
            ..
        }) = holds.remove(&picture)
        {
            match previous {
                Some(position) => doc.set_style(picture, "position", &position),
                None => doc.remove_style(picture, "position"),
            }
        }
    }

    async fn wait_transition(&self, overlay: NodeId) {
        match &self.transitions {
            Some(transitions) => transitions.opacity_end(overlay).await,
            None => self.timer.sleep(self.fade).await,
        }
    }
}

/// Which variant the picture shows under the current preferences.
fn displayed_variant(doc: &Document, picture: NodeId, env: &dyn DisplayEnvironment) -> Variant {
    if env.prefers_dark()
        && dark_source(doc, picture).is_some_and(|s| doc.attr(s, "srcset").is_some_and(|v| !v.is_empty()))
    {
        Variant::Dark
    } else {
        Variant::Light
    }
}

fn dark_source(doc: &Document, picture: NodeId) -> Option<NodeId> {
    doc.children(picture).iter().copied().find(|&c| {
        doc.tag(c) == Some("source") && doc.attr(c, "media") == Some(DARK_MEDIA)
    })
}

fn base_image(doc: &Document, picture: NodeId) -> Option<NodeId> {
    doc.children(picture)
        .iter()
        .copied()
        .find(|&c| doc.tag(c) == Some("img") && !doc.has_attr(c, OVERLAY_ATTR))
}

/// Put the high-resolution URL on the element that displays the variant.
fn commit(doc: &mut Document, picture: NodeId, variant: Variant, url: &str) -> bool {
    let target = match variant {
        Variant::Light => base_image(doc, picture).map(|img| (img, "src")),
        Variant::Dark => dark_source(doc, picture).map(|source| (source, "srcset")),
    };
    match target {
        Some((el, attr)) => {
            doc.set_attr(el, attr, url);
            true
        }
        None => {
            log::warn!("{picture:?} has no element to show the {variant} image");
            false
        }
    }
}

/// Lay an invisible copy of the final image over the picture and start
/// fading it in. The picture must already be positioned.
fn insert_overlay(doc: &mut Document, picture: NodeId, url: &str, fade: Duration) -> Result<NodeId> {
    let fit = base_image(doc, picture)
        .and_then(|img| doc.style(img, "object-fit"))
        .unwrap_or("cover")
        .to_string();

    let node = doc.create_element("img");
    doc.set_attr(node, OVERLAY_ATTR, "");
    doc.set_attr(node, "src", url);
    doc.set_attr(node, "alt", "");
    doc.set_attr(node, "aria-hidden", "true");
    doc.set_style(node, "position", "absolute");
    doc.set_style(node, "inset", "0");
    doc.set_style(node, "width", "100%");
    doc.set_style(node, "height", "100%");
    doc.set_style(node, "object-fit", &fit);
    doc.set_style(node, "pointer-events", "none");
    doc.set_style(node, "opacity", "0");
    doc.set_style(
        node,
        "transition",
        &format!("opacity {}ms ease", fade.as_millis()),
    );
    doc.append_child(picture, node)?;
    doc.set_style(node, "opacity", "1");
    Ok(node)
}

// ============================================================================
// Tests
// ============================================================================
