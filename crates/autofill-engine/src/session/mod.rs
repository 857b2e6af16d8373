//! Per-page scan session.
//!
//! One `ScanSession` owns the page for its lifetime: it answers requests,
//! keeps the most recent scan for follow-up fills, and re-runs detection when
//! the page grows new forms. Everything happens on one task; the only waits
//! are the filler's settle delay and the single pending detection timer.

mod notify;

pub use notify::{ChannelNotifier, Notifier, NullNotifier};

use crate::config::{AutofillConfig, SessionConfig};
use crate::dom::{Document, DomError, MutationRecord};
use crate::filler::{FillTarget, Filler};
use crate::scanner::{DetectedField, Scanner};
use autofill_common::protocol::{
    FillComplete, FillFormRequest, FormDetected, Notification, Request, Response, ScanResponse,
};
use autofill_common::{ClassifiedField, SiteId};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Added subtrees containing any of these warrant a rescan.
const FORM_CONTENT_SELECTOR: &str = "form, input, textarea, select";

/// Host-side page edits, applied between requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "edit", rename_all = "camelCase")]
pub enum PageEdit {
    /// Append `html` to the first element matching `parent`.
    AppendHtml { parent: String, html: String },
    /// Detach the first element matching `selector`.
    Remove { selector: String },
}

#[derive(Debug)]
pub enum Inbound {
    Message {
        request: Request,
        reply: oneshot::Sender<Response>,
    },
    Edit(PageEdit),
}

pub struct ScanSession {
    doc: Document,
    url: String,
    site: SiteId,
    scanner: Scanner,
    filler: Filler,
    config: SessionConfig,
    notifier: Box<dyn Notifier>,
    last_scan: Vec<DetectedField>,
    initialized: bool,
    /// The one pending detection run. A new trigger replaces it.
    pending: Option<Instant>,
}

impl std::fmt::Debug for ScanSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanSession")
            .field("url", &self.url)
            .field("site", &self.site)
            .field("initialized", &self.initialized)
            .field("pending", &self.pending)
            .field("last_scan", &self.last_scan.len())
            .finish_non_exhaustive()
    }
}

impl ScanSession {
    pub fn new(
        doc: Document,
        url: impl Into<String>,
        config: &AutofillConfig,
        notifier: impl Notifier + 'static,
    ) -> Self {
        let url = url.into();
        let site = SiteId::identify(&url);
        Self {
            doc,
            url,
            site,
            scanner: Scanner::from_config(config),
            filler: Filler::new(config.filler.clone()),
            config: config.session.clone(),
            notifier: Box::new(notifier),
            last_scan: Vec::new(),
            initialized: false,
            pending: None,
        }
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    pub fn into_document(self) -> Document {
        self.doc
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn site(&self) -> SiteId {
        self.site
    }

    pub fn last_scan(&self) -> &[DetectedField] {
        &self.last_scan
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn pending_deadline(&self) -> Option<Instant> {
        self.pending
    }

    /// First call arms the initial detection timer; later calls do nothing.
    pub fn ensure_initialized(&mut self) {
        if self.initialized {
            return;
        }
        self.initialized = true;
        info!("Scan session started for {} ({})", self.url, self.site);
        if self.config.auto_detect {
            self.schedule(self.config.initial_scan_delay_ms);
        }
    }

    /// Cancel the pending timer and forget the last scan.
    pub fn shutdown(&mut self) {
        if !self.initialized {
            return;
        }
        self.initialized = false;
        self.pending = None;
        self.last_scan.clear();
        info!("Scan session for {} shut down", self.url);
    }

    fn schedule(&mut self, delay_ms: u64) {
        self.pending = Some(Instant::now() + Duration::from_millis(delay_ms));
    }

    /// Scan the page and remember the result for later fills.
    pub fn scan(&mut self) -> Vec<ClassifiedField> {
        self.last_scan = self.scanner.scan(&self.doc, self.site);
        self.last_scan.iter().map(|d| d.field.clone()).collect()
    }

    /// Scan, and tell the background collaborator when anything was found.
    pub fn auto_detect(&mut self) -> usize {
        let fields = self.scan();
        let count = fields.len();
        if count > 0 {
            info!("Detected {} form field(s) automatically", count);
            self.notifier
                .notify(Notification::FormDetected(FormDetected {
                    fields,
                    site: self.site,
                    url: self.url.clone(),
                }));
        }
        count
    }

    /// Decode and answer one JSON request. Undecodable input gets an error response.
    pub async fn handle_json(&mut self, text: &str) -> Response {
        match Request::from_json(text) {
            Ok(request) => self.handle(request).await,
            Err(e) => {
                warn!("Rejected message: {}", e);
                Response::from(e)
            }
        }
    }

    pub async fn handle(&mut self, request: Request) -> Response {
        match request {
            Request::Ping => Response::pong(),
            Request::ScanPage => Response::Scan(ScanResponse {
                fields: self.scan(),
            }),
            Request::FillForm(FillFormRequest { data, fields }) => {
                let targets = self.targets(fields);
                let result = self.filler.fill(&mut self.doc, &targets, &data).await;
                // The session is the only reader of the event log; keep it bounded.
                let dispatched = self.doc.take_events().len();
                debug!("Fill dispatched {} event(s)", dispatched);
                self.notifier
                    .notify(Notification::FillComplete(FillComplete {
                        filled_fields: result.filled_fields.clone(),
                        errors: result.errors.clone(),
                    }));
                Response::Fill(result)
            }
        }
    }

    /// Fields from the last scan keep their element; anything else goes by selector.
    fn targets(&self, fields: Option<Vec<ClassifiedField>>) -> Vec<FillTarget> {
        let Some(fields) = fields else {
            return self.last_scan.iter().cloned().map(FillTarget::from).collect();
        };
        fields
            .into_iter()
            .map(|field| {
                let handle = self
                    .last_scan
                    .iter()
                    .find(|d| d.field.selector == field.selector)
                    .map(|d| d.handle);
                FillTarget { field, handle }
            })
            .collect()
    }

    /// Feed structural changes to the watcher. Returns whether a rescan was (re)scheduled.
    pub fn observe(&mut self, records: &[MutationRecord]) -> bool {
        if !self.initialized || !self.config.auto_detect {
            return false;
        }
        let relevant = records.iter().any(|record| match record {
            MutationRecord::Added { nodes, .. } => nodes.iter().any(|&node| {
                self.doc.tag_name(node) == Some("form")
                    || self
                        .doc
                        .query_selector_all_within(node, FORM_CONTENT_SELECTOR)
                        .is_ok_and(|found| !found.is_empty())
            }),
            MutationRecord::Removed { .. } => false,
        });
        if relevant {
            debug!("Form content added, rescan in {} ms", self.config.rescan_debounce_ms);
            self.schedule(self.config.rescan_debounce_ms);
        }
        relevant
    }

    /// Apply a host edit, then pass its mutation records to the watcher.
    pub fn apply_edit(&mut self, edit: PageEdit) -> Result<(), DomError> {
        match edit {
            PageEdit::AppendHtml { parent, html } => {
                let parent = self.doc.query_selector(&parent)?.ok_or(DomError::Detached)?;
                self.doc.append_html(parent, &html)?;
            }
            PageEdit::Remove { selector } => {
                let node = self.doc.query_selector(&selector)?.ok_or(DomError::Detached)?;
                self.doc.remove(node)?;
            }
        }
        let records = self.doc.take_mutations();
        self.observe(&records);
        Ok(())
    }

    /// Run detection if its deadline has passed. Returns whether it ran.
    pub fn fire_due_timer(&mut self) -> bool {
        match self.pending {
            Some(deadline) if deadline <= Instant::now() => {
                self.pending = None;
                self.auto_detect();
                true
            }
            _ => false,
        }
    }

    /// Serve the inbox until it closes, then shut down.
    pub async fn run(&mut self, mut inbox: mpsc::Receiver<Inbound>) {
        self.ensure_initialized();
        loop {
            let deadline = self.pending;
            tokio::select! {
                inbound = inbox.recv() => match inbound {
                    Some(Inbound::Message { request, reply }) => {
                        let response = self.handle(request).await;
                        if reply.send(response).is_err() {
                            debug!("Requester went away before the response");
                        }
                    }
                    Some(Inbound::Edit(edit)) => {
                        if let Err(e) = self.apply_edit(edit) {
                            warn!("Page edit failed: {}", e);
                        }
                    }
                    None => break,
                },
                _ = sleep_until_opt(deadline) => {
                    self.fire_due_timer();
                }
            }
        }
        self.shutdown();
    }
}

async fn sleep_until_opt(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending::<()>().await,
    }
}
