//! Commit receipts for the optimistic persistence contract.

use tokio::sync::oneshot;

/// Result of a Commit (or the final commit of a Terminate).
///
/// Content gets the synchronous half: `accepted` mirrors the boolean the
/// protocol requires before persistence has actually happened. Hosts
/// that want stricter semantics can await [`completed`](Self::completed)
/// to observe the background outcome that content itself only ever sees
/// through the error register.
#[derive(Debug)]
pub struct CommitReceipt {
    /// The optimistic answer returned to content.
    pub accepted: bool,
    completion: Option<oneshot::Receiver<Result<(), String>>>,
}

impl CommitReceipt {
    /// A commit rejected synchronously (wrong session state).
    pub fn rejected() -> Self {
        Self {
            accepted: false,
            completion: None,
        }
    }

    pub(crate) fn accepted(completion: oneshot::Receiver<Result<(), String>>) -> Self {
        Self {
            accepted: true,
            completion: Some(completion),
        }
    }

    /// Await the background persistence outcome.
    ///
    /// Rejected commits and commits whose background task vanished
    /// resolve to an error description.
    pub async fn completed(self) -> Result<(), String> {
        match self.completion {
            Some(receiver) => receiver
                .await
                .unwrap_or_else(|_| Err("commit task dropped before completion".to_string())),
            None => Err("commit was rejected".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rejected_receipt() {
        let receipt = CommitReceipt::rejected();
        assert!(!receipt.accepted);
        assert!(receipt.completed().await.is_err());
    }

    #[tokio::test]
    async fn test_accepted_receipt_resolves() {
        let (tx, rx) = oneshot::channel();
        let receipt = CommitReceipt::accepted(rx);
        assert!(receipt.accepted);

        tx.send(Ok(())).unwrap();
        assert!(receipt.completed().await.is_ok());
    }

    #[tokio::test]
    async fn test_dropped_task_surfaces_as_error() {
        let (tx, rx) = oneshot::channel::<Result<(), String>>();
        drop(tx);
        let receipt = CommitReceipt::accepted(rx);
        assert!(receipt.completed().await.is_err());
    }
}
