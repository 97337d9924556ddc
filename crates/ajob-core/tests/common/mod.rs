#![allow(dead_code)]

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use ajob_core::prelude::*;
use ajob_model::{
    Condition, ExecutionHandle, ExecutionSpec, JobIdentity, JobStatus, ObjectMeta,
};
use async_trait::async_trait;
use tokio::time::Instant;

/// Scripted answer of [`FakeStore::get`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    NotFound,
    NotReady,
    Ready,
    Fail(u16),
}

#[derive(Debug, Clone)]
pub enum Call {
    Get(JobIdentity, Instant),
    Create(JobIdentity, ExecutionSpec),
    Update(JobIdentity, ExecutionSpec),
    Run(JobIdentity),
}

impl Call {
    pub fn name(&self) -> &'static str {
        match self {
            Call::Get(..) => "get",
            Call::Create(..) => "create",
            Call::Update(..) => "update",
            Call::Run(..) => "run",
        }
    }
}

/// Job store answering `get` from a script and recording every call.
pub struct FakeStore {
    replies: Mutex<VecDeque<Reply>>,
    /// Answer once the script is exhausted.
    fallback: Reply,
    create_error: Option<fn() -> JobStoreError>,
    update_error: Option<fn() -> JobStoreError>,
    run_error: Option<fn() -> JobStoreError>,
    calls: Mutex<Vec<Call>>,
}

impl FakeStore {
    pub fn new(replies: impl IntoIterator<Item = Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            fallback: Reply::Ready,
            create_error: None,
            update_error: None,
            run_error: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Store whose job is absent and becomes ready right after submission.
    pub fn absent() -> Self {
        Self::new([Reply::NotFound])
    }

    /// Store whose job exists and is ready right after submission.
    pub fn present() -> Self {
        Self::new([Reply::Ready])
    }

    pub fn with_fallback(mut self, reply: Reply) -> Self {
        self.fallback = reply;
        self
    }

    pub fn failing_create(mut self, err: fn() -> JobStoreError) -> Self {
        self.create_error = Some(err);
        self
    }

    pub fn failing_update(mut self, err: fn() -> JobStoreError) -> Self {
        self.update_error = Some(err);
        self
    }

    pub fn failing_run(mut self, err: fn() -> JobStoreError) -> Self {
        self.run_error = Some(err);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_names(&self) -> Vec<&'static str> {
        self.calls().iter().map(Call::name).collect()
    }

    pub fn count(&self, name: &str) -> usize {
        self.calls().iter().filter(|c| c.name() == name).count()
    }

    /// Instants of every `get`, probe included.
    pub fn get_times(&self) -> Vec<Instant> {
        self.calls()
            .iter()
            .filter_map(|c| match c {
                Call::Get(_, at) => Some(*at),
                _ => None,
            })
            .collect()
    }

    /// Spec submitted by create or update, if any.
    pub fn submitted(&self) -> Option<ExecutionSpec> {
        self.calls().into_iter().find_map(|c| match c {
            Call::Create(_, spec) | Call::Update(_, spec) => Some(spec),
            _ => None,
        })
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

fn job(id: &JobIdentity, ready: bool) -> ExecutionSpec {
    ExecutionSpec {
        metadata: ObjectMeta {
            name: id.name.clone(),
            ..Default::default()
        },
        status: Some(JobStatus {
            conditions: vec![Condition::new(
                "Ready",
                if ready { "True" } else { "Unknown" },
            )],
            ..Default::default()
        }),
        ..Default::default()
    }
}

#[async_trait]
impl JobStore for FakeStore {
    async fn get(&self, id: &JobIdentity) -> Result<ExecutionSpec, JobStoreError> {
        self.record(Call::Get(id.clone(), Instant::now()));
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(self.fallback);
        match reply {
            Reply::NotFound => Err(JobStoreError::NotFound(id.name.clone())),
            Reply::NotReady => Ok(job(id, false)),
            Reply::Ready => Ok(job(id, true)),
            Reply::Fail(status) => Err(JobStoreError::Api {
                status,
                message: "boom".into(),
            }),
        }
    }

    async fn create(
        &self,
        id: &JobIdentity,
        spec: &ExecutionSpec,
    ) -> Result<ExecutionSpec, JobStoreError> {
        self.record(Call::Create(id.clone(), spec.clone()));
        match self.create_error {
            Some(err) => Err(err()),
            None => Ok(spec.clone()),
        }
    }

    async fn update(
        &self,
        id: &JobIdentity,
        spec: &ExecutionSpec,
    ) -> Result<ExecutionSpec, JobStoreError> {
        self.record(Call::Update(id.clone(), spec.clone()));
        match self.update_error {
            Some(err) => Err(err()),
            None => Ok(spec.clone()),
        }
    }

    async fn run(&self, id: &JobIdentity) -> Result<ExecutionHandle, JobStoreError> {
        self.record(Call::Run(id.clone()));
        match self.run_error {
            Some(err) => Err(err()),
            None => Ok(ExecutionHandle {
                job: id.clone(),
                execution: format!("{}-x1", id.name),
            }),
        }
    }
}

/// Manifest source serving a fixed body and recording every call.
pub struct FakeFetcher {
    body: Result<String, fn() -> FetchError>,
    calls: Mutex<Vec<(String, String, String, String)>>,
}

impl FakeFetcher {
    pub fn serving(body: &str) -> Self {
        Self {
            body: Ok(body.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(err: fn() -> FetchError) -> Self {
        Self {
            body: Err(err),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, String, String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ManifestFetcher for FakeFetcher {
    async fn fetch(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        revision: &str,
    ) -> Result<String, FetchError> {
        self.calls.lock().unwrap().push((
            owner.to_string(),
            repo.to_string(),
            path.to_string(),
            revision.to_string(),
        ));
        match &self.body {
            Ok(body) => Ok(body.clone()),
            Err(err) => Err(err()),
        }
    }
}

/// Metrics backend keeping every recorded outcome.
#[derive(Default)]
pub struct RecordingMetrics {
    pub received: Mutex<u32>,
    pub outcomes: Mutex<Vec<OutcomeKind>>,
    pub stage_errors: Mutex<Vec<(String, String)>>,
    pub readiness: Mutex<Vec<u32>>,
}

impl DispatchMetrics for RecordingMetrics {
    fn record_event_received(&self) {
        *self.received.lock().unwrap() += 1;
    }

    fn record_dispatch_completed(&self, outcome: OutcomeKind, _duration_ms: u64) {
        self.outcomes.lock().unwrap().push(outcome);
    }

    fn record_stage_error(&self, stage: &str, error_kind: &str) {
        self.stage_errors
            .lock()
            .unwrap()
            .push((stage.to_string(), error_kind.to_string()));
    }

    fn record_readiness_wait(&self, attempts: u32, _waited_ms: u64) {
        self.readiness.lock().unwrap().push(attempts);
    }
}

pub fn shared<T>(v: T) -> Arc<T> {
    Arc::new(v)
}
