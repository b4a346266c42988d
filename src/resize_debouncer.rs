//! Coalesces bursts of viewport resize notifications.
//!
//! Resizing a window produces a stream of size changes. Re-sampling the wave
//! for each of them is wasted work, only the final size matters. The
//! debouncer forwards a size once no further notification arrived within the
//! quiet period, and drops all sizes superseded before that.

use super::wave_sampler::Viewport;

use crossbeam::channel::{self, RecvTimeoutError, Sender};
use log::{debug, trace};

use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Quiet period used by the synthesizer widget.
pub const RESIZE_QUIET_PERIOD: Duration = Duration::from_millis(100);

pub struct ResizeDebouncer {
    sender: Option<Sender<Viewport>>,
    worker: Option<JoinHandle<()>>,
}

impl ResizeDebouncer {
    /// Start a debouncer calling on_settled with the last size of a burst.
    ///
    /// The callback runs on a worker thread. Dropping the debouncer delivers
    /// a pending size, then stops the worker.
    ///
    /// ```
    /// use fourier_synth::{ResizeDebouncer, Viewport, RESIZE_QUIET_PERIOD};
    ///
    /// let debouncer = ResizeDebouncer::spawn(RESIZE_QUIET_PERIOD, |viewport: Viewport| {
    ///     println!("Resized to {} x {}", viewport.width, viewport.height);
    /// });
    /// debouncer.notify(Viewport::new(800, 300.0));
    /// ```
    pub fn spawn<F>(quiet: Duration, mut on_settled: F) -> ResizeDebouncer
            where F: FnMut(Viewport) + Send + 'static {
        let (sender, receiver) = channel::unbounded::<Viewport>();
        let worker = thread::spawn(move || {
            // Wait for the start of a burst
            while let Ok(first) = receiver.recv() {
                let mut pending = first;
                loop {
                    match receiver.recv_timeout(quiet) {
                        Ok(next) => {
                            trace!("Resize superseded by {:?}", next);
                            pending = next;
                        }
                        Err(RecvTimeoutError::Timeout) => {
                            debug!("Resize settled at {} x {}", pending.width, pending.height);
                            on_settled(pending);
                            break;
                        }
                        Err(RecvTimeoutError::Disconnected) => {
                            on_settled(pending);
                            return;
                        }
                    }
                }
            }
        });
        ResizeDebouncer{sender: Some(sender), worker: Some(worker)}
    }

    /// Report a new viewport size.
    pub fn notify(&self, viewport: Viewport) {
        if let Some(sender) = &self.sender {
            // Only fails if the worker is gone, nothing left to notify then
            let _ = sender.send(viewport);
        }
    }
}

impl Drop for ResizeDebouncer {
    fn drop(&mut self) {
        self.sender.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

// ----------------------------------------------
//                  Unit tests
// ----------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam::channel::Receiver;

    fn collecting(quiet: Duration) -> (ResizeDebouncer, Receiver<Viewport>) {
        let (tx, rx) = channel::unbounded();
        let debouncer = ResizeDebouncer::spawn(quiet, move |v| {
            let _ = tx.send(v);
        });
        (debouncer, rx)
    }

    #[test]
    fn burst_is_delivered_once_with_last_size() {
        let (debouncer, rx) = collecting(Duration::from_millis(100));
        for w in 100..110 {
            debouncer.notify(Viewport::new(w, 200.0));
        }
        let settled = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(settled.width, 109);
        assert!(rx.recv_timeout(Duration::from_millis(300)).is_err());
    }

    #[test]
    fn separate_bursts_are_delivered_separately() {
        let (debouncer, rx) = collecting(Duration::from_millis(20));
        debouncer.notify(Viewport::new(300, 100.0));
        assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap().width, 300);
        debouncer.notify(Viewport::new(400, 100.0));
        debouncer.notify(Viewport::new(500, 100.0));
        assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap().width, 500);
    }

    #[test]
    fn drop_flushes_pending_size() {
        let (debouncer, rx) = collecting(Duration::from_secs(60));
        debouncer.notify(Viewport::new(640, 480.0));
        drop(debouncer);
        assert_eq!(rx.try_recv().unwrap().width, 640);
    }
}
