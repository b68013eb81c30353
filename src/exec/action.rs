// src/exec/action.rs

//! The three reaction shapes and the tagged [`Action`] that selects one.

use std::fmt;
use std::future::Future;
use std::path::Path;
use std::pin::Pin;

use anyhow::Result;
use tracing::warn;

use crate::errors::DetectorError;
use crate::exec::background::{AsyncTask, BackgroundTask};
use crate::types::ActionConflictPolicy;

/// Future returned by once/foreach reactions.
pub type ActionFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

/// Reaction invoked once per cycle with changes; the loop waits for it.
pub trait OnceAction: Send {
    /// Identifier used in logs and events.
    fn id(&self) -> &str;
    fn call(&mut self) -> ActionFuture<'_>;
}

/// Reaction invoked once per changed file, sequentially, in change order.
pub trait ForeachAction: Send {
    fn id(&self) -> &str;
    fn call<'a>(&'a mut self, path: &'a Path) -> ActionFuture<'a>;
}

/// Reaction started in the background; the loop does not wait for it.
pub trait ParallelAction: Send {
    fn id(&self) -> &str;

    /// Start a new instance and return a handle to it.
    ///
    /// Called from within the Tokio runtime.
    fn spawn(&mut self) -> Result<Box<dyn BackgroundTask>>;
}

/// Dispatch mode of an [`Action`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionMode {
    Once,
    Parallel,
    Foreach,
}

impl fmt::Display for ActionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ActionMode::Once => "once",
            ActionMode::Parallel => "parallel",
            ActionMode::Foreach => "foreach",
        };
        f.write_str(s)
    }
}

/// The reaction configured for a watch.
///
/// Exactly one variant is active, so dispatch is decided by the tag.
#[derive(Default)]
pub enum Action {
    #[default]
    None,
    Once(Box<dyn OnceAction>),
    Parallel(Box<dyn ParallelAction>),
    Foreach(Box<dyn ForeachAction>),
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.mode(), self.id()) {
            (Some(mode), Some(id)) => write!(f, "Action::{mode}({id:?})"),
            _ => f.write_str("Action::None"),
        }
    }
}

impl Action {
    /// Once-action backed by a closure.
    pub fn once<F>(id: impl Into<String>, f: F) -> Self
    where
        F: FnMut() -> Result<()> + Send + 'static,
    {
        Action::Once(Box::new(OnceFn { id: id.into(), f }))
    }

    /// Foreach-action backed by a closure receiving the changed path.
    pub fn foreach<F>(id: impl Into<String>, f: F) -> Self
    where
        F: FnMut(&Path) -> Result<()> + Send + 'static,
    {
        Action::Foreach(Box::new(ForeachFn { id: id.into(), f }))
    }

    /// Parallel-action backed by a closure producing a future.
    ///
    /// Each dispatch spawns the future as its own Tokio task; terminating it
    /// aborts the task at its next await point.
    pub fn parallel<F, Fut>(id: impl Into<String>, f: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Action::Parallel(Box::new(ParallelFn { id: id.into(), f }))
    }

    pub fn mode(&self) -> Option<ActionMode> {
        match self {
            Action::None => None,
            Action::Once(_) => Some(ActionMode::Once),
            Action::Parallel(_) => Some(ActionMode::Parallel),
            Action::Foreach(_) => Some(ActionMode::Foreach),
        }
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            Action::None => None,
            Action::Once(a) => Some(a.id()),
            Action::Parallel(a) => Some(a.id()),
            Action::Foreach(a) => Some(a.id()),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Action::None)
    }

    /// Pick one action out of independently optional slots.
    ///
    /// With [`ActionConflictPolicy::Priority`] the first configured one in the
    /// order once > parallel > foreach wins and the others are dropped with a
    /// warning. With [`ActionConflictPolicy::Reject`] more than one configured
    /// action is a configuration error.
    pub fn resolve(
        once: Option<Box<dyn OnceAction>>,
        parallel: Option<Box<dyn ParallelAction>>,
        foreach: Option<Box<dyn ForeachAction>>,
        policy: ActionConflictPolicy,
    ) -> crate::errors::Result<Self> {
        let configured: Vec<String> = [
            once.as_ref().map(|a| format!("once '{}'", a.id())),
            parallel.as_ref().map(|a| format!("parallel '{}'", a.id())),
            foreach.as_ref().map(|a| format!("foreach '{}'", a.id())),
        ]
        .into_iter()
        .flatten()
        .collect();

        if configured.len() > 1 {
            match policy {
                ActionConflictPolicy::Reject => {
                    return Err(DetectorError::ConfigError(format!(
                        "only one of once/parallel/foreach may be configured (got {})",
                        configured.join(", ")
                    )));
                }
                ActionConflictPolicy::Priority => {
                    warn!(
                        kept = %configured[0],
                        ignored = ?&configured[1..],
                        "more than one action configured; only the highest priority one will run"
                    );
                }
            }
        }

        let action = if let Some(a) = once {
            Action::Once(a)
        } else if let Some(a) = parallel {
            Action::Parallel(a)
        } else if let Some(a) = foreach {
            Action::Foreach(a)
        } else {
            Action::None
        };

        Ok(action)
    }
}

struct OnceFn<F> {
    id: String,
    f: F,
}

impl<F> OnceAction for OnceFn<F>
where
    F: FnMut() -> Result<()> + Send,
{
    fn id(&self) -> &str {
        &self.id
    }

    fn call(&mut self) -> ActionFuture<'_> {
        let res = (self.f)();
        Box::pin(async move { res })
    }
}

struct ForeachFn<F> {
    id: String,
    f: F,
}

impl<F> ForeachAction for ForeachFn<F>
where
    F: FnMut(&Path) -> Result<()> + Send,
{
    fn id(&self) -> &str {
        &self.id
    }

    fn call<'a>(&'a mut self, path: &'a Path) -> ActionFuture<'a> {
        let res = (self.f)(path);
        Box::pin(async move { res })
    }
}

struct ParallelFn<F> {
    id: String,
    f: F,
}

impl<F, Fut> ParallelAction for ParallelFn<F>
where
    F: FnMut() -> Fut + Send,
    Fut: Future<Output = ()> + Send + 'static,
{
    fn id(&self) -> &str {
        &self.id
    }

    fn spawn(&mut self) -> Result<Box<dyn BackgroundTask>> {
        let handle = tokio::spawn((self.f)());
        Ok(Box::new(AsyncTask::new(self.id.clone(), handle)))
    }
}
