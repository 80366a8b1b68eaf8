use crossbeam::channel::{Receiver, TryRecvError};

/// Run `job` on a background thread and wake the UI when it finishes.
pub fn spawn<T, F>(ctx: &egui::Context, job: F) -> Pending<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let (tx, rx) = crossbeam::channel::bounded(1);
    let ctx = ctx.clone();
    std::thread::spawn(move || {
        // receiver may be gone if the owning view was dropped
        let _ = tx.send(job());
        ctx.request_repaint();
    });
    Pending::from_receiver(rx)
}

/// Result slot of a job started with [`spawn`]. Dropping it discards the result.
pub struct Pending<T> {
    rx: Receiver<T>,
}

pub enum Poll<T> {
    Ready(T),
    Waiting,
    /// Worker died without sending a result.
    Lost,
}

impl<T> Pending<T> {
    fn from_receiver(rx: Receiver<T>) -> Self {
        Self { rx }
    }

    pub fn poll(&self) -> Poll<T> {
        match self.rx.try_recv() {
            Ok(value) => Poll::Ready(value),
            Err(TryRecvError::Empty) => Poll::Waiting,
            Err(TryRecvError::Disconnected) => Poll::Lost,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poll_reports_each_channel_state() {
        let (tx, rx) = crossbeam::channel::bounded(1);
        let pending = Pending::from_receiver(rx);
        assert!(matches!(pending.poll(), Poll::Waiting));
        tx.send(7).unwrap();
        assert!(matches!(pending.poll(), Poll::Ready(7)));
        drop(tx);
        assert!(matches!(pending.poll(), Poll::Lost));
    }

    #[test]
    fn spawned_job_delivers_result() {
        let ctx = egui::Context::default();
        let pending = spawn(&ctx, || 40 + 2);
        let value = loop {
            match pending.poll() {
                Poll::Ready(v) => break v,
                Poll::Waiting => std::thread::yield_now(),
                Poll::Lost => panic!("worker lost"),
            }
        };
        assert_eq!(value, 42);
    }
}
