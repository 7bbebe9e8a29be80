//! Background "what is visible at frame N" queries.
//!
//! Each request is answered off the caller's thread against a snapshot of
//! the document. Requests carry increasing tickets and only the answer to
//! the most recent one is ever handed back; answers to superseded requests
//! are dropped when they arrive.

use std::sync::Arc;

use reelkit_timeline::{Document, EventId, Frame};
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VisibilityError {
    #[error("Visibility worker has shut down")]
    WorkerClosed,
}

/// Answer to one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibilityResponse {
    pub ticket: u64,
    pub frame: Frame,
    /// Visible event ids in document order.
    pub ids: Vec<EventId>,
}

/// Ids of events with `start <= frame < end`.
pub fn visible_ids(document: &Document, frame: Frame) -> Vec<EventId> {
    document
        .events_at_frame(frame)
        .into_iter()
        .map(|e| e.id.clone())
        .collect()
}

/// Last-request-wins visibility queries on the tokio runtime.
///
/// Must be used from within a tokio runtime.
#[derive(Debug)]
pub struct VisibilityWorker {
    document: Arc<Document>,
    latest_ticket: u64,
    tx: Option<mpsc::UnboundedSender<VisibilityResponse>>,
    rx: mpsc::UnboundedReceiver<VisibilityResponse>,
}

impl VisibilityWorker {
    pub fn new(document: Document) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            document: Arc::new(document),
            latest_ticket: 0,
            tx: Some(tx),
            rx,
        }
    }

    /// Replace the snapshot used by subsequent requests.
    pub fn set_document(&mut self, document: Document) {
        self.document = Arc::new(document);
    }

    pub fn latest_ticket(&self) -> u64 {
        self.latest_ticket
    }

    /// Ask which events are visible at `frame`. Returns the request ticket.
    pub fn request(&mut self, frame: Frame) -> Result<u64, VisibilityError> {
        let tx = self.tx.clone().ok_or(VisibilityError::WorkerClosed)?;
        self.latest_ticket += 1;
        let ticket = self.latest_ticket;
        let document = Arc::clone(&self.document);

        tokio::spawn(async move {
            match tokio::task::spawn_blocking(move || visible_ids(&document, frame)).await {
                Ok(ids) => {
                    // The receiver is gone only when the worker was dropped.
                    let _ = tx.send(VisibilityResponse { ticket, frame, ids });
                }
                Err(e) => tracing::warn!(ticket, error = %e, "Visibility query failed"),
            }
        });
        tracing::trace!(ticket, frame, "Visibility requested");
        Ok(ticket)
    }

    /// Wait for the answer to the most recent request.
    pub async fn next_result(&mut self) -> Result<VisibilityResponse, VisibilityError> {
        loop {
            let response = self.rx.recv().await.ok_or(VisibilityError::WorkerClosed)?;
            if self.is_current(&response) {
                return Ok(response);
            }
        }
    }

    /// Answer to the most recent request, if it has already arrived.
    pub fn try_latest(&mut self) -> Option<VisibilityResponse> {
        let mut latest = None;
        while let Ok(response) = self.rx.try_recv() {
            if self.is_current(&response) {
                latest = Some(response);
            }
        }
        latest
    }

    /// Stop accepting requests. Answers already in flight are still delivered.
    pub fn shutdown(&mut self) {
        self.tx = None;
    }

    fn is_current(&self, response: &VisibilityResponse) -> bool {
        if response.ticket < self.latest_ticket {
            tracing::trace!(
                ticket = response.ticket,
                latest = self.latest_ticket,
                "Discarded stale visibility answer"
            );
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelkit_timeline::NewEvent;

    fn document() -> Document {
        let mut doc = Document::default();
        doc.events
            .push(NewEvent::video("a.mp4", 0, 100).into_event("a".into()));
        doc.events
            .push(NewEvent::image("b.png", 50, 150).on_layer(2).into_event("b".into()));
        doc
    }

    #[test]
    fn test_visible_ids_are_half_open() {
        let doc = document();
        assert_eq!(visible_ids(&doc, 0), vec![EventId::from("a")]);
        assert_eq!(
            visible_ids(&doc, 99),
            vec![EventId::from("a"), EventId::from("b")]
        );
        assert_eq!(visible_ids(&doc, 100), vec![EventId::from("b")]);
        assert!(visible_ids(&doc, 150).is_empty());
    }

    #[tokio::test]
    async fn test_only_latest_request_is_answered() {
        let mut worker = VisibilityWorker::new(document());
        for frame in [0, 10, 20, 120] {
            worker.request(frame).unwrap();
        }

        let response = worker.next_result().await.unwrap();
        assert_eq!(response.ticket, 4);
        assert_eq!(response.frame, 120);
        assert_eq!(response.ids, vec![EventId::from("b")]);
    }

    #[tokio::test]
    async fn test_snapshot_replacement() {
        let mut worker = VisibilityWorker::new(document());
        worker.set_document(Document::default());
        worker.request(60).unwrap();
        assert!(worker.next_result().await.unwrap().ids.is_empty());
    }

    #[tokio::test]
    async fn test_shutdown_closes_worker() {
        let mut worker = VisibilityWorker::new(document());
        worker.request(60).unwrap();
        worker.shutdown();
        assert_eq!(worker.request(70), Err(VisibilityError::WorkerClosed));

        assert_eq!(worker.next_result().await.unwrap().ticket, 1);
        assert_eq!(worker.next_result().await, Err(VisibilityError::WorkerClosed));
        assert!(worker.try_latest().is_none());
    }
}
