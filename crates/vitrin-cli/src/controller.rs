//! Page controller.
//!
//! Runs the single load cycle of a page lifetime:
//!
//! ```text
//! fetch ──error──> load-failed message, stop
//!   │
//!   └─> parse ─> sections ─> progressive scan ─> contact ─> history ─> content:ready
//! ```
//!
//! Image upgrades discovered during rendering are queued, not awaited, so
//! readiness is announced without waiting on any image. Drive them with
//! [`PageController::settle`].

use std::mem;

use futures::future;
use vitrin_content::{PayloadFormat, parse_payload};
use vitrin_core::traits::ConfigProvider;
use vitrin_core::{CONTENT_READY_EVENT, Error, Metadata, PageRenderState, RenderContext};
use vitrin_dom::history::HistoryOp;
use vitrin_dom::{
    History, PageContext, ProgressiveUpgrader, SectionBuilder, UpgradeOutcome, UpgradeTask,
    bind_contact, show_message,
};

use crate::source::DocumentSource;

/// Result of one load cycle.
#[derive(Debug)]
pub enum LoadOutcome {
    /// The document was fetched and rendered.
    Rendered {
        format: PayloadFormat,
        sections: usize,
    },
    /// The document could not be fetched; the failure message is shown.
    Failed(Error),
}

impl LoadOutcome {
    pub fn is_rendered(&self) -> bool {
        matches!(self, Self::Rendered { .. })
    }
}

/// Orchestrates fetching, rendering, and binding for one page.
pub struct PageController<S: DocumentSource, C: ConfigProvider> {
    source: S,
    config: C,
    page: PageContext,
    builder: SectionBuilder,
    upgrader: ProgressiveUpgrader,
    history: History,
    state: PageRenderState,
    pending: Vec<UpgradeTask>,
}

impl<S: DocumentSource, C: ConfigProvider> PageController<S, C> {
    /// Create a controller rendering into `page`.
    ///
    /// The upgrader must share `page`'s document.
    pub fn new(
        source: S,
        config: C,
        page: PageContext,
        upgrader: ProgressiveUpgrader,
        history: History,
    ) -> Self {
        let builder = SectionBuilder::new().with_empty_message(config.empty_message());
        Self {
            source,
            config,
            page,
            builder,
            upgrader,
            history,
            state: PageRenderState::new(),
            pending: Vec::new(),
        }
    }

    /// Use a different section builder.
    pub fn with_builder(mut self, builder: SectionBuilder) -> Self {
        self.builder = builder;
        self
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    pub fn page(&self) -> &PageContext {
        &self.page
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Readiness handle; clone it to listen from elsewhere.
    pub fn state(&self) -> &PageRenderState {
        &self.state
    }

    /// Number of image upgrades queued and not yet settled.
    pub fn pending_upgrades(&self) -> usize {
        self.pending.len()
    }

    /// Run the load cycle.
    pub async fn load(&mut self) -> LoadOutcome {
        log::info!(
            "{}: loading {}",
            self.config.project_name(),
            self.source.location()
        );

        let raw = match self.source.fetch().await {
            Ok(raw) => raw,
            Err(e) => {
                log::error!("failed to load {}: {e}", self.source.location());
                show_message(&self.page, self.config.load_failed_message());
                return LoadOutcome::Failed(e);
            }
        };

        let parsed = parse_payload(&raw);
        log::debug!("decoded document as {:?}", parsed.format);
        let sections = self.render(&parsed.metadata);
        LoadOutcome::Rendered {
            format: parsed.format,
            sections,
        }
    }

    /// Render metadata into the page, replacing whatever was there.
    ///
    /// Returns the number of sections inserted (the fallback message
    /// counts as one).
    pub fn render(&mut self, meta: &Metadata) -> usize {
        let context = RenderContext::from_contact(&meta.contact);

        let sections = self.builder.render(&self.page, &meta.sections, &context).len();
        self.pending.extend(self.upgrader.scan());
        bind_contact(&self.page, meta, &context);

        let op = self.history.sync_landing();
        if op == HistoryOp::Push {
            log::debug!("pushed {} history entry", vitrin_dom::history::LANDING_VIEW);
        }

        self.page.document_mut().dispatch_event(CONTENT_READY_EVENT);
        self.state.mark_ready();
        sections
    }

    /// Re-tag the current history entry after back/forward navigation.
    pub fn on_popstate(&mut self) -> bool {
        self.history.on_popstate()
    }

    /// Navigate back and react the way the page's `popstate` listener does.
    pub fn navigate_back(&mut self) -> bool {
        if self.history.back().is_none() {
            return false;
        }
        self.on_popstate();
        true
    }

    /// Pick up progressive pictures added outside a render.
    pub fn rescan(&mut self) -> usize {
        let tasks = self.upgrader.scan();
        let found = tasks.len();
        self.pending.extend(tasks);
        found
    }

    /// Drive every queued image upgrade to completion.
    pub async fn settle(&mut self) -> Vec<UpgradeOutcome> {
        future::join_all(mem::take(&mut self.pending)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    use url::Url;
    use vitrin_dom::progressive::UpgradeState;
    use vitrin_dom::shell::{CONTACT_LINK_ATTR, SECTIONS_ROOT_ATTR};
    use vitrin_dom::{DisplayFlags, SharedDocument, landing_shell};

    use crate::config::VitrinConfig;
    use crate::preload::NoopImageLoader;
    use crate::source::StaticSource;

    const FRONTMATTER: &str = "---\n\
contact:\n  phone: 905320000000\n  whatsapp_message: Merhaba\n\
sections:\n  - body: \"Bize [yazın]({{ whatsapp_link }})\"\n    figure:\n      light: b.jpg\n      small-light: a.jpg\n\
---\n# ignored body\n";

    fn controller(source: StaticSource) -> (PageController<StaticSource, VitrinConfig>, SharedDocument) {
        let doc = landing_shell("test").unwrap().into_shared();
        let page = PageContext::new(SharedDocument::clone(&doc));
        let upgrader = ProgressiveUpgrader::new(page.shared(), Rc::new(NoopImageLoader))
            .with_environment(Rc::new(DisplayFlags::new(false, false, true)));
        let history = History::new(Url::parse("https://shop.example/").unwrap());
        (
            PageController::new(source, VitrinConfig::default(), page, upgrader, history),
            doc,
        )
    }

    fn main_html(doc: &SharedDocument) -> String {
        let doc = doc.borrow();
        let root = doc.select_by_attr(SECTIONS_ROOT_ATTR, None)[0];
        doc.inner_html(root)
    }

    // ------------------------------------------------------------------------
    // Success path
    // ------------------------------------------------------------------------

    #[tokio::test]
    async fn test_load_renders_binds_and_announces() {
        let (mut ctl, doc) = controller(StaticSource::new(FRONTMATTER));
        let listener = ctl.state().clone();
        assert!(!listener.is_ready());

        let outcome = ctl.load().await;
        assert!(matches!(
            outcome,
            LoadOutcome::Rendered {
                format: PayloadFormat::Frontmatter,
                sections: 1
            }
        ));

        let html = main_html(&doc);
        assert!(html.contains("id=\"section_1\""));
        assert!(html.contains("href=\"https://wa.me/905320000000?text=Merhaba\""));
        assert!(html.contains("src=\"a.jpg\""));

        let d = doc.borrow();
        let wa = d.select_by_attr(CONTACT_LINK_ATTR, Some("whatsapp"))[0];
        assert_eq!(
            d.attr(wa, "href"),
            Some("https://wa.me/905320000000?text=Merhaba")
        );
        assert_eq!(d.events(), &[CONTENT_READY_EVENT.to_string()]);
        drop(d);

        assert!(listener.is_ready());
        listener.wait_ready().await;
        assert_eq!(ctl.history().len(), 2);
        assert_eq!(ctl.history().current().url.fragment(), Some("landing"));
    }

    #[tokio::test]
    async fn test_ready_before_images_settle() {
        let (mut ctl, doc) = controller(StaticSource::new(FRONTMATTER));
        ctl.load().await;
        assert!(ctl.state().is_ready());
        assert_eq!(ctl.pending_upgrades(), 1);
        assert!(main_html(&doc).contains("src=\"a.jpg\""));

        let outcomes = ctl.settle().await;
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].state, UpgradeState::Committed);
        assert_eq!(ctl.pending_upgrades(), 0);
        assert!(main_html(&doc).contains("src=\"b.jpg\""));
    }

    #[tokio::test]
    async fn test_empty_document_shows_empty_message() {
        let (mut ctl, doc) = controller(StaticSource::new(""));
        let outcome = ctl.load().await;
        assert!(matches!(
            outcome,
            LoadOutcome::Rendered {
                format: PayloadFormat::Empty,
                sections: 1
            }
        ));
        assert!(main_html(&doc).contains("İçerik bulunamadı."));
        assert!(ctl.state().is_ready());
    }

    #[tokio::test]
    async fn test_rerender_replaces_and_keeps_single_push() {
        let (mut ctl, doc) = controller(StaticSource::new(FRONTMATTER));
        ctl.load().await;

        let meta = Metadata::default();
        ctl.render(&meta);
        assert!(!main_html(&doc).contains("section_1"));
        assert_eq!(ctl.history().len(), 2);
        assert_eq!(doc.borrow().events().len(), 2);

        let d = doc.borrow();
        let wa = d.select_by_attr(CONTACT_LINK_ATTR, Some("whatsapp"))[0];
        assert_eq!(d.attr(wa, "href"), None);
    }

    // ------------------------------------------------------------------------
    // Failure path
    // ------------------------------------------------------------------------

    #[tokio::test]
    async fn test_fetch_failure_shows_message_and_stops() {
        let (mut ctl, doc) = controller(StaticSource::failing(404));
        let outcome = ctl.load().await;

        match outcome {
            LoadOutcome::Failed(Error::Fetch { status, .. }) => assert_eq!(status, Some(404)),
            other => panic!("expected fetch failure, got {other:?}"),
        }
        assert!(main_html(&doc).contains("İçerik yüklenemedi."));
        assert!(!ctl.state().is_ready());
        assert!(doc.borrow().events().is_empty());
        assert_eq!(ctl.history().len(), 1);
    }

    // ------------------------------------------------------------------------
    // History and rescans
    // ------------------------------------------------------------------------

    #[tokio::test]
    async fn test_back_navigation_retags_entry() {
        let (mut ctl, _doc) = controller(StaticSource::new(FRONTMATTER));
        ctl.load().await;

        assert!(ctl.navigate_back());
        assert_eq!(ctl.history().current().url.fragment(), Some("landing"));
        assert!(ctl.history().current().state.as_ref().unwrap().is_landing());
        assert!(!ctl.navigate_back());
    }

    #[tokio::test]
    async fn test_rescan_picks_up_late_pictures() {
        let (mut ctl, doc) = controller(StaticSource::new("{}"));
        ctl.load().await;
        assert_eq!(ctl.pending_upgrades(), 0);

        {
            let mut d = doc.borrow_mut();
            let root = d.select_by_attr(SECTIONS_ROOT_ATTR, None)[0];
            let figure = vitrin_dom::sections::build_figure(
                &mut d,
                &vitrin_core::Figure {
                    light: Some("late.jpg".into()),
                    small_light: Some("late-small.jpg".into()),
                    ..Default::default()
                },
            )
            .unwrap();
            d.append_child(root, figure).unwrap();
        }
        assert_eq!(ctl.rescan(), 1);
        assert_eq!(ctl.rescan(), 0);

        let outcomes = ctl.settle().await;
        assert_eq!(outcomes[0].url, "late.jpg");
    }
}
