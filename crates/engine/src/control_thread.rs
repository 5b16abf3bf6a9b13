//! The single thread that owns session state.
//!
//! Tree construction, action execution and load completions all run as tasks on this thread,
//! in submission order. [`ControlThread::run_sync`] runs a task inline when the caller is already
//! on the control thread, so tasks may safely call back into it.

use std::{
    io,
    panic::{self, AssertUnwindSafe},
    sync::mpsc,
    thread::{self, ThreadId},
};

use tokio::sync::oneshot;
use tracing::{debug, error};

pub const CONTROL_THREAD_NAME: &str = "ignite-control";

type Task = Box<dyn FnOnce() + Send + 'static>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ControlThreadError {
    #[error("control thread has shut down")]
    Closed,
    #[error("control task panicked before replying")]
    TaskPanicked,
}

/// Handle to the control thread. Clones share the thread, which exits once every handle is dropped.
#[derive(Debug, Clone)]
pub struct ControlThread {
    sender: mpsc::Sender<Task>,
    thread_id: ThreadId,
}

impl ControlThread {
    pub fn spawn() -> io::Result<Self> {
        let (sender, receiver) = mpsc::channel::<Task>();
        let handle = thread::Builder::new().name(CONTROL_THREAD_NAME.to_string()).spawn(move || {
            while let Ok(task) = receiver.recv() {
                if panic::catch_unwind(AssertUnwindSafe(task)).is_err() {
                    error!("control task panicked");
                }
            }
            debug!("control thread stopped");
        })?;
        Ok(Self {
            sender,
            thread_id: handle.thread().id(),
        })
    }

    /// Whether the caller is running on the control thread.
    pub fn is_current(&self) -> bool {
        thread::current().id() == self.thread_id
    }

    /// Runs `task` on the control thread and blocks until it returns. Runs inline when already on it.
    ///
    /// Blocking: do not call from an async context; use [`ControlThread::run`] there.
    pub fn run_sync<R, F>(&self, task: F) -> Result<R, ControlThreadError>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        if self.is_current() {
            return Ok(task());
        }
        let (reply, response) = mpsc::sync_channel(1);
        self.submit(move || {
            let _ = reply.send(task());
        })?;
        response.recv().map_err(|_| ControlThreadError::TaskPanicked)
    }

    /// Async counterpart of [`ControlThread::run_sync`].
    pub async fn run<R, F>(&self, task: F) -> Result<R, ControlThreadError>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        if self.is_current() {
            return Ok(task());
        }
        let (reply, response) = oneshot::channel();
        self.submit(move || {
            let _ = reply.send(task());
        })?;
        response.await.map_err(|_| ControlThreadError::TaskPanicked)
    }

    fn submit(&self, task: impl FnOnce() + Send + 'static) -> Result<(), ControlThreadError> {
        self.sender.send(Box::new(task)).map_err(|_| ControlThreadError::Closed)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use super::*;

    #[test]
    fn run_sync_executes_on_the_named_thread() {
        let control = ControlThread::spawn().unwrap();
        assert!(!control.is_current());
        let name = control.run_sync(|| thread::current().name().map(str::to_string)).unwrap();
        assert_eq!(name.as_deref(), Some(CONTROL_THREAD_NAME));
    }

    #[test]
    fn nested_run_sync_runs_inline() {
        let control = ControlThread::spawn().unwrap();
        let inner = control.clone();
        let nested = control
            .run_sync(move || {
                assert!(inner.is_current());
                inner.run_sync(|| 41).map(|value| value + 1)
            })
            .unwrap();
        assert_eq!(nested, Ok(42));
    }

    #[test]
    fn tasks_run_in_submission_order() {
        let control = ControlThread::spawn().unwrap();
        let counter = Arc::new(AtomicUsize::new(0));
        let seen: Vec<usize> = (0..5)
            .map(|_| {
                let counter = Arc::clone(&counter);
                control.run_sync(move || counter.fetch_add(1, Ordering::SeqCst)).unwrap()
            })
            .collect();
        assert_eq!(seen, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn panicking_tasks_do_not_stop_the_thread() {
        let control = ControlThread::spawn().unwrap();
        let result: Result<(), _> = control.run_sync(|| panic!("boom"));
        assert_eq!(result, Err(ControlThreadError::TaskPanicked));
        assert_eq!(control.run_sync(|| 7), Ok(7));
    }

    #[tokio::test]
    async fn run_awaits_the_result() {
        let control = ControlThread::spawn().unwrap();
        assert_eq!(control.run(|| "done").await, Ok("done"));
    }
}
