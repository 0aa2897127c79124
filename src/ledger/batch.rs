//! Batch submission
//!
//! Signed transactions go out in fixed-size chunks, one request per chunk,
//! strictly in order. The first failed chunk stops the run: later chunks
//! carry higher nonces and would only be rejected. A chunk the gateway
//! accepts only in part leaves the same nonce gap and counts as failed.

use crate::ledger::BatchSubmitter;
use crate::transaction::Transaction;
use crate::{Error, Result};
use tracing::{debug, error, info};

/// Send `transactions` in chunks of `batch_size`, returning one status line
/// per chunk
pub async fn submit_in_batches(
    submitter: &dyn BatchSubmitter,
    transactions: &[Transaction],
    batch_size: usize,
) -> Result<Vec<String>> {
    if batch_size == 0 {
        return Err(Error::InvalidArgument(
            "batch size must be greater than zero".to_string(),
        ));
    }

    let total = transactions.len().div_ceil(batch_size);
    let mut messages = Vec::with_capacity(total);

    for (index, batch) in transactions.chunks(batch_size).enumerate() {
        let number = index + 1;
        let receipt = match submitter.send_batch(batch).await {
            Ok(receipt) => receipt,
            Err(e) => {
                error!(
                    submitter = submitter.name(),
                    batch = number,
                    of = total,
                    error = %e,
                    "Batch submission failed"
                );
                return Err(e);
            }
        };

        if receipt.sent < batch.len() {
            error!(
                submitter = submitter.name(),
                batch = number,
                of = total,
                sent = receipt.sent,
                size = batch.len(),
                "Gateway accepted only part of the batch"
            );
            return Err(Error::Gateway(format!(
                "batch {}/{}: only {} of {} transactions accepted",
                number,
                total,
                receipt.sent,
                batch.len()
            )));
        }
        for hash in &receipt.hashes {
            debug!(batch = number, hash = %hash, "Transaction accepted");
        }

        let message = format!(
            "batch {}/{}: {} of {} transactions accepted",
            number,
            total,
            receipt.sent,
            batch.len()
        );
        info!("{}", message);
        messages.push(message);
    }

    Ok(messages)
}
