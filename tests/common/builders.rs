//! Wiring of the dispatch components over in-memory backends.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use tasker_dispatch::events::UpdateStream;
use tasker_dispatch::messaging::InMemoryChannel;
use tasker_dispatch::orchestration::{StartTimeWriter, TaskStarter};
use tasker_dispatch::services::{CommandService, TaskQueryService};
use tasker_dispatch::web::AppState;

use super::mocks::{MockScheduler, MockTaskRepository};

pub const TEST_GRACE: Duration = Duration::from_secs(5);

/// Every component wired against shared in-memory doubles
pub struct TestHarness {
    pub channel: InMemoryChannel,
    pub repository: MockTaskRepository,
    pub scheduler: MockScheduler,
    pub starter: TaskStarter,
    pub writer_handle: JoinHandle<()>,
}

pub struct TestHarnessBuilder {
    grace: Duration,
    scheduler: MockScheduler,
}

impl TestHarnessBuilder {
    pub fn new() -> Self {
        Self {
            grace: TEST_GRACE,
            scheduler: MockScheduler::new(),
        }
    }

    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    pub fn with_scheduler(mut self, scheduler: MockScheduler) -> Self {
        self.scheduler = scheduler;
        self
    }

    /// Must be called inside a runtime; spawns the start time writer
    pub fn build(self) -> TestHarness {
        let channel = InMemoryChannel::new();
        let repository = MockTaskRepository::new();
        let (writer, writer_handle) =
            StartTimeWriter::spawn(Arc::new(repository.clone()), self.grace);
        let starter = TaskStarter::new(
            Arc::new(channel.clone()),
            Arc::new(repository.clone()),
            writer,
        );

        TestHarness {
            channel,
            repository,
            scheduler: self.scheduler,
            starter,
            writer_handle,
        }
    }
}

impl TestHarness {
    pub fn update_stream(&self) -> UpdateStream {
        UpdateStream::new(Arc::new(self.channel.clone()))
    }

    pub fn task_queries(&self) -> TaskQueryService {
        TaskQueryService::new(
            Arc::new(self.channel.clone()),
            Arc::new(self.repository.clone()),
            Arc::new(self.scheduler.clone()),
        )
    }

    pub fn app_state(&self) -> AppState {
        AppState::new(
            self.starter.clone(),
            self.update_stream(),
            self.task_queries(),
            CommandService::new(Arc::new(self.channel.clone())),
            "test",
        )
    }
}
