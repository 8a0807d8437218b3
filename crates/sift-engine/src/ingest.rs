//! Embedding ingestion: batch backfill and on-demand embedding of one ticket.

use serde::{Deserialize, Serialize};
use sift_core::constants::EMPTY_TEXT_PLACEHOLDER;
use sift_core::errors::ClusteringError;
use sift_core::traits::{IEmbeddingProvider, ISiftStorage, ITicketSource};
use sift_core::{EmbeddingRecord, SiftError, SiftResult, Ticket};
use tracing::{debug, info, warn};

/// Counts from one [`ingest`] run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReport {
    pub embedded: usize,
    /// Already embedded for the provider's model version.
    pub skipped: usize,
    /// Unknown to the ticket source.
    pub missing: usize,
    pub failed_batches: usize,
}

/// Text sent to the embedding service for a ticket.
pub fn embedding_text(ticket: &Ticket) -> &str {
    if ticket.text.trim().is_empty() {
        EMPTY_TEXT_PLACEHOLDER
    } else {
        &ticket.text
    }
}

/// Embed every listed ticket that has no record for the provider's model version.
///
/// A failing batch is logged and counted; the remaining batches still run.
pub fn ingest(
    storage: &dyn ISiftStorage,
    embedder: &dyn IEmbeddingProvider,
    tickets: &dyn ITicketSource,
    ticket_ids: &[String],
    batch_size: usize,
) -> SiftResult<IngestReport> {
    let model = embedder.model_version();
    let mut wanted = ticket_ids.to_vec();
    wanted.sort();
    wanted.dedup();
    let pending = storage.missing_embeddings(model, &wanted)?;
    let mut report = IngestReport {
        skipped: wanted.len() - pending.len(),
        ..Default::default()
    };

    let found = tickets.get_tickets(&pending)?;
    report.missing = pending.len() - found.len();

    for batch in found.chunks(batch_size.max(1)) {
        let texts: Vec<String> = batch.iter().map(|t| embedding_text(t).to_string()).collect();
        let records = embedder
            .embed_batch(&texts)
            .and_then(|vectors| to_records(batch, vectors, embedder));
        match records {
            Ok(records) => {
                report.embedded += storage.put_embeddings(&records)?;
            }
            Err(e) => {
                warn!(batch = batch.len(), error = %e, "embedding batch failed");
                report.failed_batches += 1;
            }
        }
    }

    info!(
        model = %model,
        embedded = report.embedded,
        skipped = report.skipped,
        missing = report.missing,
        failed_batches = report.failed_batches,
        "embedding ingestion finished"
    );
    Ok(report)
}

/// The stored record for a ticket, embedding and storing it first if needed.
pub fn ensure_embedding(
    storage: &dyn ISiftStorage,
    embedder: &dyn IEmbeddingProvider,
    tickets: &dyn ITicketSource,
    ticket_id: &str,
) -> SiftResult<EmbeddingRecord> {
    let model = embedder.model_version();
    if let Some(record) = storage.get_embedding(ticket_id, model)? {
        return Ok(record);
    }
    let ticket = tickets
        .get_ticket(ticket_id)?
        .ok_or_else(|| SiftError::not_found("ticket", ticket_id))?;
    let vector = embedder.embed(embedding_text(&ticket))?;
    check_dimensions(embedder, &vector)?;

    let record = EmbeddingRecord::new(ticket_id, vector, model);
    storage.put_embedding(&record)?;
    debug!(ticket_id, model = %model, "ticket embedded on demand");
    Ok(record)
}

fn to_records(
    batch: &[Ticket],
    vectors: Vec<Vec<f32>>,
    embedder: &dyn IEmbeddingProvider,
) -> SiftResult<Vec<EmbeddingRecord>> {
    if vectors.len() != batch.len() {
        return Err(SiftError::EmbeddingFailed {
            reason: format!("expected {} vectors, got {}", batch.len(), vectors.len()),
        });
    }
    batch
        .iter()
        .zip(vectors)
        .map(|(ticket, vector)| {
            check_dimensions(embedder, &vector)?;
            Ok(EmbeddingRecord::new(
                ticket.ticket_id.clone(),
                vector,
                embedder.model_version(),
            ))
        })
        .collect()
}

fn check_dimensions(embedder: &dyn IEmbeddingProvider, vector: &[f32]) -> SiftResult<()> {
    if vector.len() != embedder.dimensions() {
        return Err(ClusteringError::DimensionMismatch {
            expected: embedder.dimensions(),
            actual: vector.len(),
        }
        .into());
    }
    Ok(())
}
