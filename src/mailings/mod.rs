mod brevo;

pub use brevo::BrevoMailer;

use crate::domain::board::NoticeRequest;
use crate::errors::ServerError;
use std::sync::Arc;
use std::thread;

/// Delivery seam for stage-transition notices. The production impl talks
/// to Brevo; tests record what they were asked to send.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: &NoticeRequest) -> Result<(), ServerError>;
}

/// Dispatches a notice on a detached thread.
///
/// The stage transition that raised the notice is already committed;
/// a failed send is logged and that is all. The handle is returned so
/// tests can join, callers normally drop it.
pub fn dispatch_notice(
    notifier: Arc<dyn Notifier>,
    notice: NoticeRequest,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        if let Err(e) = notifier.notify(&notice) {
            eprintln!(
                "Notification {} for site '{}' failed: {e}",
                notice.kind.as_str(),
                notice.record.site_id
            );
        }
    })
}
