use std::sync::Mutex;

use async_trait::async_trait;
use tracing::info;

use crate::signup::dto::{Alert, Route};

#[async_trait]
pub trait Navigator: Send + Sync {
    async fn push(&self, route: Route);
}

#[async_trait]
pub trait Alerter: Send + Sync {
    async fn alert(&self, alert: &Alert);
}

/// Terminal stand-in for the app shell: prints alerts and remembers the
/// last route pushed.
#[derive(Debug, Default)]
pub struct ConsoleUi {
    current: Mutex<Option<Route>>,
}

impl ConsoleUi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_route(&self) -> Option<Route> {
        *self.current.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl Navigator for ConsoleUi {
    async fn push(&self, route: Route) {
        info!(route = route.path(), "navigate");
        *self.current.lock().unwrap_or_else(|e| e.into_inner()) = Some(route);
        println!("-> {}", route.path());
    }
}

#[async_trait]
impl Alerter for ConsoleUi {
    async fn alert(&self, alert: &Alert) {
        println!("[{}] {} [OK]", alert.title, alert.message);
    }
}
