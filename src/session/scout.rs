//! Scout: the engine facade a front end drives

use crate::config::Config;
use crate::output::{EventSink, Notifier, ScoutEvent};
use crate::scrape::{self, Cookie, Paginator, PaginationSummary};
use crate::session::supervisor::{DrainReport, TaskSupervisor};
use crate::state::{DetailLookup, ExcludeSet, Item, ItemList};
use crate::Result;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Owns the session state and runs every operation as a supervised task
///
/// Results reach the front end as [`ScoutEvent`]s. The cookie and the
/// configuration are only replaced after all outstanding tasks were
/// joined, so a running task never sees them change.
pub struct Scout {
    config: Arc<Config>,
    cookie: Cookie,
    exclude: Arc<dyn ExcludeSet>,
    items: Arc<Mutex<ItemList>>,
    notifier: Notifier,
    supervisor: TaskSupervisor,
}

fn lock(items: &Mutex<ItemList>) -> MutexGuard<'_, ItemList> {
    items.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Scout {
    pub fn new(config: Config, sink: Arc<dyn EventSink>, exclude: Arc<dyn ExcludeSet>) -> Self {
        let notifier = Notifier::new(sink);
        Self {
            config: Arc::new(config),
            cookie: Cookie::empty(),
            exclude,
            items: Arc::new(Mutex::new(ItemList::new())),
            supervisor: TaskSupervisor::new(notifier.clone()),
            notifier,
        }
    }

    /// Starts with a cookie obtained earlier
    pub fn with_cookie(mut self, cookie: Cookie) -> Self {
        self.cookie = cookie;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn cookie(&self) -> &Cookie {
        &self.cookie
    }

    /// Snapshot of the items found by the current listing run
    pub fn items(&self) -> Vec<Item> {
        lock(&self.items).iter().cloned().collect()
    }

    pub fn item(&self, id: u64) -> Option<Item> {
        lock(&self.items).get(id).cloned()
    }

    /// Number of tasks not joined yet
    pub fn pending_tasks(&self) -> usize {
        self.supervisor.pending()
    }

    /// Logs in in the background; the cookie arrives as `CookieReady`
    pub fn authenticate(&mut self, login: &str, password: &str) {
        let config = self.config.clone();
        let notifier = self.notifier.clone();
        let (login, password) = (login.to_string(), password.to_string());

        self.supervisor.submit("authorize", async move {
            let cookie = scrape::authenticate(&config, &login, &password, &notifier).await?;
            notifier.emit(ScoutEvent::CookieReady(cookie));
            Ok(())
        });
    }

    /// Logs in and applies the cookie before returning
    pub async fn login(&mut self, login: &str, password: &str) -> Result<Cookie> {
        self.supervisor.drain().await;
        let cookie = scrape::authenticate(&self.config, login, password, &self.notifier).await?;
        self.cookie = cookie.clone();
        Ok(cookie)
    }

    /// Replaces the session cookie once every running task finished
    pub async fn update_cookie(&mut self, cookie: Cookie) {
        self.notifier.status("Cookie: Updating");
        self.supervisor.drain().await;
        tracing::debug!("Cookie carries {} attributes", cookie.attributes());
        self.cookie = cookie;
        self.notifier.status("Cookie: Updated");
    }

    /// Replaces the configuration once every running task finished
    pub async fn reload_config(&mut self, config: Config) {
        self.supervisor.drain().await;
        self.config = Arc::new(config);
        self.notifier.status("General: Configuration reloaded");
    }

    /// Forgets the current items and starts a new listing run
    pub fn start_pagination(&mut self) {
        lock(&self.items).clear();

        let config = self.config.clone();
        let cookie = self.cookie.clone();
        let exclude = self.exclude.clone();
        let notifier = self.notifier.clone();
        let items = self.items.clone();

        self.supervisor.submit("unread", async move {
            let mut paginator = Paginator::new(&config, &cookie, exclude.as_ref(), &notifier);
            let PaginationSummary {
                discovered,
                excluded,
                pages,
            } = paginator
                .run(|anchor| {
                    lock(&items).insert(anchor.id, anchor.title.clone());
                })
                .await?;
            tracing::info!(
                "Listing run: {} items over {} pages, {} excluded",
                discovered,
                pages,
                excluded
            );
            Ok(())
        });
    }

    /// Returns the cached detail of `id`, or starts fetching it
    ///
    /// A fetch ends with `DetailReady`. A failed or empty fetch leaves the
    /// item without a detail, so selecting it again retries.
    pub fn fetch_detail(&mut self, id: u64) -> DetailLookup {
        let lookup = lock(&self.items).begin_fetch(id);
        if lookup != DetailLookup::Fetch {
            return lookup;
        }

        let config = self.config.clone();
        let cookie = self.cookie.clone();
        let notifier = self.notifier.clone();
        let items = self.items.clone();

        self.supervisor.submit(format!("detail {}", id), async move {
            let result = scrape::fetch_detail(config, cookie, id, notifier).await;
            lock(&items).finish_fetch(id, result.as_ref().ok().cloned());
            result.map(|_| ())
        });
        lookup
    }

    /// Waits for every outstanding task
    pub async fn drain(&mut self) -> DrainReport {
        self.supervisor.drain().await
    }
}
