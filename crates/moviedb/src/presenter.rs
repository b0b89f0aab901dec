//! Search presenter
//!
//! Mediates between a [`SearchView`] and a [`SearchService`]. The presenter is
//! owned by a single task (the "UI" side). `search` never blocks: the fetch is
//! spawned onto the Tokio runtime and its completion is applied back on the
//! owner through [`SearchPresenter::process_next`] or [`SearchPresenter::settle`],
//! so view methods are only ever called from the owner.
//!
//! The view is held through a `Weak` reference. After `detach`, or once the
//! view itself is dropped, completions are discarded without touching it.
//! Overlapping searches are applied in arrival order; a stale response that
//! arrives last overwrites a newer one.

use std::sync::{Arc, Weak};

use moviedb_core::page::ResultPage;
use moviedb_core::search::{
    pagination_control, MessageKey, PaginationControl, QueryError, SearchQuery, Visibility,
};
use tokio::task::JoinSet;

use crate::error::Error;
use crate::service::SearchService;

/// Capabilities the presenter drives on the UI side
pub trait SearchView {
    /// Fire-and-forget user notification
    fn show_toast(&self, message: MessageKey);

    /// Replace the displayed results with `page`
    fn update_results_display(&self, page: &ResultPage);

    /// Show or hide the "load next page" affordance
    fn set_pagination_control(&self, query: &str, visibility: Visibility, next_page: u32);
}

struct Completion {
    request_id: u64,
    query: SearchQuery,
    outcome: Result<ResultPage, Error>,
}

pub struct SearchPresenter {
    service: Arc<dyn SearchService>,
    api_key: String,
    view: Option<Weak<dyn SearchView>>,
    last_query: Option<SearchQuery>,
    pagination: Option<PaginationControl>,
    next_request_id: u64,
    in_flight: JoinSet<Completion>,
}

impl SearchPresenter {
    pub fn new(service: Arc<dyn SearchService>, api_key: impl Into<String>) -> Self {
        Self {
            service,
            api_key: api_key.into(),
            view: None,
            last_query: None,
            pagination: None,
            next_request_id: 1,
            in_flight: JoinSet::new(),
        }
    }

    /// Attach a view, replacing any previously attached one
    pub fn attach<V: SearchView + 'static>(&mut self, view: &Arc<V>) {
        let view: Weak<V> = Arc::downgrade(view);
        self.view = Some(view);
    }

    /// Forget the view. Requests already in flight keep running but their
    /// results are dropped.
    pub fn detach(&mut self) {
        self.view = None;
    }

    /// The last query that was dispatched to the service
    pub fn last_query(&self) -> Option<&SearchQuery> {
        self.last_query.as_ref()
    }

    /// The pagination affordance computed from the last applied response
    pub fn pagination(&self) -> Option<&PaginationControl> {
        self.pagination.as_ref()
    }

    /// Number of dispatched requests whose completion has not been applied
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Validate `query` and dispatch exactly one fetch for it.
    ///
    /// Must be called from within a Tokio runtime. Blank text raises
    /// `search_error_no_text` on the attached view (if any) and issues no
    /// request.
    pub fn search(&mut self, query: &str, page: u32) {
        let query = match SearchQuery::new(query, page) {
            Ok(query) => query,
            Err(QueryError::EmptyText) => {
                log::debug!("Ignoring search with blank text");
                self.toast(MessageKey::SearchErrorNoText);
                return;
            }
            Err(err) => {
                log::warn!("Rejecting search for {query:?}: {err}");
                self.toast(MessageKey::SearchErrorText);
                return;
            }
        };

        let request_id = self.next_request_id;
        self.next_request_id += 1;

        log::debug!(
            "Dispatching search #{request_id}: query={:?} page={}",
            query.text(),
            query.page()
        );

        let service = Arc::clone(&self.service);
        let api_key = self.api_key.clone();
        self.last_query = Some(query.clone());

        self.in_flight.spawn(async move {
            let outcome = service.fetch(&api_key, query.text(), query.page()).await;
            Completion {
                request_id,
                query,
                outcome,
            }
        });
    }

    /// Dispatch the page offered by the current pagination affordance.
    ///
    /// Returns `false` when there is no visible next page.
    pub fn search_next_page(&mut self) -> bool {
        match self.pagination.clone().filter(PaginationControl::is_visible) {
            Some(control) => {
                self.search(&control.query, control.next_page);
                true
            }
            None => false,
        }
    }

    /// Wait for the next request to finish and apply it to the view.
    ///
    /// Returns `false` when nothing is in flight.
    pub async fn process_next(&mut self) -> bool {
        let Some(joined) = self.in_flight.join_next().await else {
            return false;
        };

        match joined {
            Ok(completion) => self.apply(completion),
            Err(err) => {
                log::warn!("Search task failed: {err}");
                self.toast(MessageKey::SearchErrorText);
            }
        }

        true
    }

    /// Apply every in-flight request, in the order they finish
    pub async fn settle(&mut self) {
        while self.process_next().await {}
    }

    fn apply(&mut self, completion: Completion) {
        let Completion {
            request_id,
            query,
            outcome,
        } = completion;

        let Some(view) = self.view() else {
            log::debug!("Dropping search #{request_id}: no view attached");
            return;
        };

        match outcome {
            Ok(page) => {
                log::debug!(
                    "Search #{request_id} returned page {}/{} with {} items",
                    page.page_number,
                    page.total_pages,
                    page.items.len()
                );

                view.update_results_display(&page);

                let control = pagination_control(&query, &page);
                view.set_pagination_control(&control.query, control.visibility, control.next_page);
                self.pagination = Some(control);
            }
            Err(err) => {
                log::warn!("Search #{request_id} for {:?} failed: {err}", query.text());
                view.show_toast(MessageKey::SearchErrorText);
            }
        }
    }

    fn toast(&self, message: MessageKey) {
        if let Some(view) = self.view() {
            view.show_toast(message);
        }
    }

    fn view(&self) -> Option<Arc<dyn SearchView>> {
        self.view.as_ref().and_then(Weak::upgrade)
    }
}

#[cfg(test)]
impl SearchPresenter {
    fn is_attached(&self) -> bool {
        self.view().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use moviedb_core::page::MovieResult;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tokio::sync::oneshot;

    const API_KEY: &str = "test-api-key";
    const SEARCH: &str = "star wars";

    type Outcome = Result<ResultPage, Error>;

    #[derive(Debug, Clone, PartialEq)]
    enum ViewCall {
        Toast(MessageKey),
        Results(ResultPage),
        Pagination(String, Visibility, u32),
    }

    #[derive(Default)]
    struct RecordingView {
        calls: RefCell<Vec<ViewCall>>,
    }

    impl RecordingView {
        fn calls(&self) -> Vec<ViewCall> {
            self.calls.borrow().clone()
        }

        fn results(&self) -> Vec<ResultPage> {
            self.calls()
                .into_iter()
                .filter_map(|c| match c {
                    ViewCall::Results(page) => Some(page),
                    _ => None,
                })
                .collect()
        }
    }

    impl SearchView for RecordingView {
        fn show_toast(&self, message: MessageKey) {
            self.calls.borrow_mut().push(ViewCall::Toast(message));
        }

        fn update_results_display(&self, page: &ResultPage) {
            self.calls.borrow_mut().push(ViewCall::Results(page.clone()));
        }

        fn set_pagination_control(&self, query: &str, visibility: Visibility, next_page: u32) {
            self.calls
                .borrow_mut()
                .push(ViewCall::Pagination(query.to_string(), visibility, next_page));
        }
    }

    /// Records every fetch. Returns the scripted outcome, unless a gate was
    /// registered for the (query, page) pair, in which case it waits for the
    /// test to release it.
    #[derive(Default)]
    struct MockService {
        calls: Mutex<Vec<(String, String, u32)>>,
        outcome: Mutex<Option<Outcome>>,
        gates: Mutex<HashMap<(String, u32), oneshot::Receiver<Outcome>>>,
    }

    impl MockService {
        fn returning(outcome: Outcome) -> Arc<Self> {
            let service = Self::default();
            *service.outcome.lock().unwrap() = Some(outcome);
            Arc::new(service)
        }

        fn gate(&self, query: &str, page: u32) -> oneshot::Sender<Outcome> {
            let (tx, rx) = oneshot::channel();
            self.gates
                .lock()
                .unwrap()
                .insert((query.to_string(), page), rx);
            tx
        }

        fn calls(&self) -> Vec<(String, String, u32)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SearchService for MockService {
        async fn fetch(&self, api_key: &str, query: &str, page: u32) -> Outcome {
            self.calls
                .lock()
                .unwrap()
                .push((api_key.to_string(), query.to_string(), page));

            let gate = self.gates.lock().unwrap().remove(&(query.to_string(), page));
            if let Some(gate) = gate {
                return gate
                    .await
                    .unwrap_or_else(|_| Err(Error::Network("gate closed".to_string())));
            }

            self.outcome
                .lock()
                .unwrap()
                .clone()
                .unwrap_or_else(|| Err(Error::Network("no response scripted".to_string())))
        }
    }

    struct PanickingService;

    #[async_trait]
    impl SearchService for PanickingService {
        async fn fetch(&self, _api_key: &str, _query: &str, _page: u32) -> Outcome {
            panic!("service exploded");
        }
    }

    fn fake_page(page_number: u32, total_pages: u32) -> ResultPage {
        let items = vec![
            MovieResult {
                id: 11,
                title: Some("Star Wars".to_string()),
                ..Default::default()
            },
            MovieResult {
                id: 1891,
                title: Some("The Empire Strikes Back".to_string()),
                ..Default::default()
            },
        ];
        ResultPage::new(page_number, total_pages, u64::from(total_pages) * 20, items).unwrap()
    }

    fn presenter_with(service: Arc<MockService>) -> SearchPresenter {
        SearchPresenter::new(service, API_KEY)
    }

    #[tokio::test]
    async fn test_blank_search_without_view_is_noop() {
        let service = MockService::returning(Ok(fake_page(1, 2)));
        let mut presenter = presenter_with(service.clone());

        presenter.search("", 1);
        presenter.settle().await;

        assert!(service.calls().is_empty());
        assert_eq!(presenter.in_flight(), 0);
        assert!(presenter.last_query().is_none());
    }

    #[tokio::test]
    async fn test_blank_search_shows_no_text_toast() {
        let service = MockService::returning(Ok(fake_page(1, 2)));
        let view = Arc::new(RecordingView::default());
        let mut presenter = presenter_with(service.clone());
        presenter.attach(&view);

        for text in ["", "   ", "\t\n"] {
            presenter.search(text, 1);
        }
        presenter.settle().await;

        assert!(service.calls().is_empty());
        assert_eq!(
            view.calls(),
            vec![ViewCall::Toast(MessageKey::SearchErrorNoText); 3]
        );
    }

    #[tokio::test]
    async fn test_page_zero_is_rejected_without_fetch() {
        let service = MockService::returning(Ok(fake_page(1, 2)));
        let view = Arc::new(RecordingView::default());
        let mut presenter = presenter_with(service.clone());
        presenter.attach(&view);

        presenter.search(SEARCH, 0);
        presenter.settle().await;

        assert!(service.calls().is_empty());
        assert_eq!(view.calls(), vec![ViewCall::Toast(MessageKey::SearchErrorText)]);
    }

    #[tokio::test]
    async fn test_search_issues_one_fetch_with_params() {
        let service = MockService::returning(Ok(fake_page(1, 2)));
        let view = Arc::new(RecordingView::default());
        let mut presenter = presenter_with(service.clone());
        presenter.attach(&view);

        presenter.search(SEARCH, 1);
        presenter.settle().await;

        assert_eq!(
            service.calls(),
            vec![(API_KEY.to_string(), SEARCH.to_string(), 1)]
        );
        assert_eq!(
            presenter.last_query(),
            Some(&SearchQuery::new(SEARCH, 1).unwrap())
        );
    }

    #[tokio::test]
    async fn test_padded_query_is_forwarded_as_given() {
        let padded = "  star wars ";
        let service = MockService::returning(Ok(fake_page(1, 2)));
        let view = Arc::new(RecordingView::default());
        let mut presenter = presenter_with(service.clone());
        presenter.attach(&view);

        presenter.search(padded, 1);
        presenter.settle().await;

        assert_eq!(
            service.calls(),
            vec![(API_KEY.to_string(), padded.to_string(), 1)]
        );
        assert_eq!(
            view.calls().last(),
            Some(&ViewCall::Pagination(padded.to_string(), Visibility::Visible, 2))
        );
        assert_eq!(presenter.last_query().unwrap().text(), padded);
    }

    #[tokio::test]
    async fn test_search_success_updates_results_and_next_page() {
        let page = fake_page(1, 2);
        let service = MockService::returning(Ok(page.clone()));
        let view = Arc::new(RecordingView::default());
        let mut presenter = presenter_with(service);
        presenter.attach(&view);

        presenter.search(SEARCH, 1);
        presenter.settle().await;

        assert_eq!(
            view.calls(),
            vec![
                ViewCall::Results(page),
                ViewCall::Pagination(SEARCH.to_string(), Visibility::Visible, 2),
            ]
        );
        assert!(presenter.pagination().unwrap().is_visible());
    }

    #[tokio::test]
    async fn test_search_last_page_hides_next_page() {
        let service = MockService::returning(Ok(fake_page(2, 2)));
        let view = Arc::new(RecordingView::default());
        let mut presenter = presenter_with(service);
        presenter.attach(&view);

        presenter.search(SEARCH, 2);
        presenter.settle().await;

        assert_eq!(
            view.calls().last(),
            Some(&ViewCall::Pagination(SEARCH.to_string(), Visibility::Hidden, 2))
        );
    }

    #[tokio::test]
    async fn test_search_failure_shows_error_toast() {
        let service = MockService::returning(Err(Error::Network("connection reset".to_string())));
        let view = Arc::new(RecordingView::default());
        let mut presenter = presenter_with(service);
        presenter.attach(&view);

        presenter.search(SEARCH, 1);
        presenter.settle().await;

        assert_eq!(view.calls(), vec![ViewCall::Toast(MessageKey::SearchErrorText)]);
        assert!(view.results().is_empty());
        assert_eq!(presenter.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_presenter_reusable_after_failure() {
        let service = MockService::returning(Err(Error::Http {
            status: 503,
            body: String::new(),
        }));
        let view = Arc::new(RecordingView::default());
        let mut presenter = presenter_with(service.clone());
        presenter.attach(&view);

        presenter.search(SEARCH, 1);
        presenter.settle().await;

        *service.outcome.lock().unwrap() = Some(Ok(fake_page(1, 1)));
        presenter.search(SEARCH, 1);
        presenter.settle().await;

        assert_eq!(view.results().len(), 1);
        assert_eq!(service.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_panicking_service_is_reported_as_error() {
        let view = Arc::new(RecordingView::default());
        let mut presenter = SearchPresenter::new(Arc::new(PanickingService), API_KEY);
        presenter.attach(&view);

        presenter.search(SEARCH, 1);
        presenter.settle().await;

        assert_eq!(view.calls(), vec![ViewCall::Toast(MessageKey::SearchErrorText)]);
    }

    #[tokio::test]
    async fn test_search_does_not_block() {
        let service = Arc::new(MockService::default());
        let release = service.gate(SEARCH, 1);
        let view = Arc::new(RecordingView::default());
        let mut presenter = presenter_with(service.clone());
        presenter.attach(&view);

        presenter.search(SEARCH, 1);

        assert_eq!(presenter.in_flight(), 1);
        assert!(view.calls().is_empty());

        release.send(Ok(fake_page(1, 2))).unwrap();
        assert!(presenter.process_next().await);
        assert!(!presenter.process_next().await);
        assert_eq!(view.results().len(), 1);
    }

    #[tokio::test]
    async fn test_detach_before_success_drops_result() {
        let service = Arc::new(MockService::default());
        let release = service.gate(SEARCH, 1);
        let view = Arc::new(RecordingView::default());
        let mut presenter = presenter_with(service.clone());
        presenter.attach(&view);

        presenter.search(SEARCH, 1);
        presenter.detach();
        release.send(Ok(fake_page(1, 2))).unwrap();
        presenter.settle().await;

        assert_eq!(service.calls().len(), 1);
        assert!(view.calls().is_empty());
        assert!(!presenter.is_attached());
        assert!(presenter.pagination().is_none());
    }

    #[tokio::test]
    async fn test_detach_before_failure_drops_toast() {
        let service = Arc::new(MockService::default());
        let release = service.gate(SEARCH, 1);
        let view = Arc::new(RecordingView::default());
        let mut presenter = presenter_with(service);
        presenter.attach(&view);

        presenter.search(SEARCH, 1);
        presenter.detach();
        release
            .send(Err(Error::Network("timed out".to_string())))
            .unwrap();
        presenter.settle().await;

        assert!(view.calls().is_empty());
    }

    #[tokio::test]
    async fn test_dropped_view_behaves_as_detached() {
        let service = MockService::returning(Ok(fake_page(1, 2)));
        let mut presenter = presenter_with(service.clone());

        {
            let view = Arc::new(RecordingView::default());
            presenter.attach(&view);
            assert!(presenter.is_attached());
        }

        assert!(!presenter.is_attached());
        presenter.search(SEARCH, 1);
        presenter.search("", 1);
        presenter.settle().await;

        assert_eq!(service.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_reattach_replaces_view() {
        let service = MockService::returning(Ok(fake_page(1, 2)));
        let first = Arc::new(RecordingView::default());
        let second = Arc::new(RecordingView::default());
        let mut presenter = presenter_with(service);

        presenter.attach(&first);
        presenter.attach(&second);
        presenter.search(SEARCH, 1);
        presenter.settle().await;

        assert!(first.calls().is_empty());
        assert_eq!(second.results().len(), 1);
    }

    #[tokio::test]
    async fn test_overlapping_searches_last_arrival_wins() {
        let service = Arc::new(MockService::default());
        let release_first = service.gate("alien", 1);
        let release_second = service.gate("aliens", 1);
        let view = Arc::new(RecordingView::default());
        let mut presenter = presenter_with(service.clone());
        presenter.attach(&view);

        presenter.search("alien", 1);
        presenter.search("aliens", 1);
        assert_eq!(presenter.in_flight(), 2);
        assert_eq!(presenter.last_query().unwrap().text(), "aliens");

        let older = ResultPage::new(1, 1, 1, vec![MovieResult { id: 348, ..Default::default() }]).unwrap();
        let newer = ResultPage::new(1, 1, 1, vec![MovieResult { id: 679, ..Default::default() }]).unwrap();

        // The later request answers first
        release_second.send(Ok(newer.clone())).unwrap();
        assert!(presenter.process_next().await);
        release_first.send(Ok(older.clone())).unwrap();
        assert!(presenter.process_next().await);

        assert_eq!(view.results(), vec![newer, older.clone()]);
        assert_eq!(
            view.calls().last(),
            Some(&ViewCall::Pagination("alien".to_string(), Visibility::Hidden, 1))
        );
    }

    #[tokio::test]
    async fn test_search_next_page_follows_pagination_control() {
        let service = MockService::returning(Ok(fake_page(1, 2)));
        let view = Arc::new(RecordingView::default());
        let mut presenter = presenter_with(service.clone());
        presenter.attach(&view);

        assert!(!presenter.search_next_page());

        presenter.search(SEARCH, 1);
        presenter.settle().await;

        *service.outcome.lock().unwrap() = Some(Ok(fake_page(2, 2)));
        assert!(presenter.search_next_page());
        presenter.settle().await;

        assert_eq!(
            service.calls(),
            vec![
                (API_KEY.to_string(), SEARCH.to_string(), 1),
                (API_KEY.to_string(), SEARCH.to_string(), 2),
            ]
        );
        assert!(!presenter.pagination().unwrap().is_visible());
        assert!(!presenter.search_next_page());
        assert_eq!(service.calls().len(), 2);
    }
}
