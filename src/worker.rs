use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use crate::mail::{MailError, Mailer, OutgoingMail};
use crate::metrics::{MAIL_FAILED, MAIL_SENT};

// Queued mail - holds the message + channel for the delivery result
pub struct QueuedMail {
    pub mail: OutgoingMail,
    pub response_tx: oneshot::Sender<Result<(), MailError>>,
}

// Background worker -> owns the mailer and delivers one message at a time
pub async fn mail_worker(mut rx: mpsc::Receiver<QueuedMail>, mailer: Arc<dyn Mailer>) {
    tracing::info!("mail worker started");

    while let Some(queued) = rx.recv().await {
        let result = deliver(mailer.as_ref(), &queued.mail).await;

        match &result {
            Ok(()) => {
                MAIL_SENT.inc();
                tracing::info!(subject = %queued.mail.subject, "notification mail sent");
            }
            Err(e) => {
                MAIL_FAILED.inc();
                tracing::error!(error = %e, subject = %queued.mail.subject, "notification mail failed");
            }
        }

        // handler may have gone away; nothing to do then
        let _ = queued.response_tx.send(result);
    }

    tracing::info!("mail worker stopped");
}

async fn deliver(mailer: &dyn Mailer, mail: &OutgoingMail) -> Result<(), MailError> {
    mailer.verify().await?;
    mailer.send(mail).await
}

// queue a mail and wait for the worker's answer
pub async fn send_mail(tx: &mpsc::Sender<QueuedMail>, mail: OutgoingMail) -> Result<(), MailError> {
    let (response_tx, response_rx) = oneshot::channel();

    tx.send(QueuedMail { mail, response_tx })
        .await
        .map_err(|_| MailError::WorkerUnavailable)?;

    response_rx.await.map_err(|_| MailError::WorkerUnavailable)?
}
