//! Offline transport for unit tests.

use crate::api::Api;
use crate::config::Config;
use crate::credential_store::CredentialStore;
use crate::error::ShellError;
use crate::gateway::{Gateway, HttpRequest, HttpResponse, Transport};
use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Arc, Mutex};

/// Replays queued responses in order and records every request it was given.
/// Running out of replies behaves like an unreachable server.
#[derive(Clone, Default)]
pub(crate) struct ScriptedTransport {
    replies: Arc<Mutex<VecDeque<Result<HttpResponse, ShellError>>>>,
    sent: Arc<Mutex<Vec<HttpRequest>>>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn reply(&self, status: u16, body: &str) -> &Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(Ok(HttpResponse::new(status, body)));
        self
    }

    pub(crate) fn fail_unreachable(&self) -> &Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(Err(ShellError::unreachable("connection refused")));
        self
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.sent.lock().unwrap().clone()
    }

    /// Paths (below the API prefix) of every request sent so far.
    pub(crate) fn paths(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| r.url.path().trim_start_matches("/api/v1").to_string())
            .collect()
    }

    pub(crate) fn gateway(&self, store: CredentialStore) -> Gateway<Self> {
        Gateway::new(self.clone(), test_config(), store)
    }

    pub(crate) fn api(&self, store: CredentialStore) -> Api<Self> {
        Api::new(self.gateway(store))
    }
}

impl Transport for ScriptedTransport {
    fn execute(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, ShellError>> + Send {
        self.sent.lock().unwrap().push(request);
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ShellError::unreachable("no scripted reply left")));
        async move { reply }
    }
}

pub(crate) fn test_config() -> Config {
    Config::new("http://wallet.test").unwrap()
}
