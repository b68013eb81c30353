use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use change_detector::exec::{
    Action, ActionFuture, BackgroundTask, ForeachAction, OnceAction, ParallelAction,
};

/// Shared log of reaction invocations.
///
/// Once-actions record their id, foreach-actions record `"<id>:<path>"`.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    calls: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn once(&self, id: &str) -> Box<dyn OnceAction> {
        Box::new(RecordingOnce {
            id: id.to_string(),
            calls: Arc::clone(&self.calls),
            fail: false,
        })
    }

    /// Once-action that records the call and then fails.
    pub fn failing_once(&self, id: &str) -> Box<dyn OnceAction> {
        Box::new(RecordingOnce {
            id: id.to_string(),
            calls: Arc::clone(&self.calls),
            fail: true,
        })
    }

    pub fn foreach(&self, id: &str) -> Box<dyn ForeachAction> {
        Box::new(RecordingForeach {
            id: id.to_string(),
            calls: Arc::clone(&self.calls),
        })
    }

    pub fn once_action(&self, id: &str) -> Action {
        Action::Once(self.once(id))
    }

    pub fn foreach_action(&self, id: &str) -> Action {
        Action::Foreach(self.foreach(id))
    }
}

struct RecordingOnce {
    id: String,
    calls: Arc<Mutex<Vec<String>>>,
    fail: bool,
}

impl OnceAction for RecordingOnce {
    fn id(&self) -> &str {
        &self.id
    }

    fn call(&mut self) -> ActionFuture<'_> {
        self.calls.lock().unwrap().push(self.id.clone());
        let fail = self.fail;
        let id = self.id.clone();
        Box::pin(async move {
            if fail {
                Err(anyhow!("{id} failed on purpose"))
            } else {
                Ok(())
            }
        })
    }
}

struct RecordingForeach {
    id: String,
    calls: Arc<Mutex<Vec<String>>>,
}

impl ForeachAction for RecordingForeach {
    fn id(&self) -> &str {
        &self.id
    }

    fn call<'a>(&'a mut self, path: &'a Path) -> ActionFuture<'a> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("{}:{}", self.id, path.display()));
        Box::pin(async { Ok(()) })
    }
}

/// Parallel action whose background tasks never finish on their own.
///
/// Each spawned instance gets a liveness flag the test can inspect; the
/// runner's `terminate()` clears it.
#[derive(Debug, Clone, Default)]
pub struct FakeParallel {
    instances: Arc<Mutex<Vec<Arc<AtomicBool>>>>,
}

impl FakeParallel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn action(&self, id: &str) -> Action {
        Action::Parallel(self.boxed(id))
    }

    pub fn boxed(&self, id: &str) -> Box<dyn ParallelAction> {
        Box::new(FakeParallelAction {
            id: id.to_string(),
            instances: Arc::clone(&self.instances),
        })
    }

    pub fn spawned(&self) -> usize {
        self.instances.lock().unwrap().len()
    }

    pub fn is_alive(&self, index: usize) -> bool {
        self.instances.lock().unwrap()[index].load(Ordering::SeqCst)
    }

    pub fn live(&self) -> usize {
        self.instances
            .lock()
            .unwrap()
            .iter()
            .filter(|flag| flag.load(Ordering::SeqCst))
            .count()
    }

    /// Simulate instance `index` exiting by itself.
    pub fn finish(&self, index: usize) {
        self.instances.lock().unwrap()[index].store(false, Ordering::SeqCst);
    }
}

struct FakeParallelAction {
    id: String,
    instances: Arc<Mutex<Vec<Arc<AtomicBool>>>>,
}

impl ParallelAction for FakeParallelAction {
    fn id(&self) -> &str {
        &self.id
    }

    fn spawn(&mut self) -> Result<Box<dyn BackgroundTask>> {
        let running = Arc::new(AtomicBool::new(true));
        self.instances.lock().unwrap().push(Arc::clone(&running));
        Ok(Box::new(FakeTask { running }))
    }
}

#[derive(Debug)]
struct FakeTask {
    running: Arc<AtomicBool>,
}

impl BackgroundTask for FakeTask {
    fn is_running(&mut self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn terminate(&mut self) {
        self.running.store(false, Ordering::SeqCst);
    }

    fn join(&mut self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async {})
    }
}
