// ABOUTME: Progress stages made of named steps with an explicit lifecycle.
// ABOUTME: Steps forward every transition to an EventSink for presentation.

use parking_lot::Mutex;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Lifecycle of a single step.
///
/// `NotStarted -> Started -> Finished | Failed`. Any other transition is a
/// bug in the caller and panics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum StepState {
    NotStarted,
    Started,
    Finished,
    Failed(String),
}

impl StepState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, StepState::Finished | StepState::Failed(_))
    }

    fn started(&self) -> StepState {
        match self {
            StepState::NotStarted => StepState::Started,
            other => panic!("illegal step transition: cannot start a step that is {other}"),
        }
    }

    fn finished(&self) -> StepState {
        match self {
            StepState::Started => StepState::Finished,
            other => panic!("illegal step transition: cannot finish a step that is {other}"),
        }
    }

    fn failed(&self, message: String) -> StepState {
        match self {
            StepState::Started => StepState::Failed(message),
            other => panic!("illegal step transition: cannot fail a step that is {other}"),
        }
    }
}

impl fmt::Display for StepState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepState::NotStarted => f.write_str("not started"),
            StepState::Started => f.write_str("started"),
            StepState::Finished => f.write_str("finished"),
            StepState::Failed(message) => write!(f, "failed ({message})"),
        }
    }
}

/// A step transition, as seen by an [`EventSink`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepEvent {
    pub stage: String,
    pub index: usize,
    pub step: String,
    #[serde(flatten)]
    pub state: StepState,
}

/// Receives step transitions as they happen.
pub trait EventSink: Send + Sync {
    fn step_changed(&self, event: &StepEvent);
}

/// Sink that drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn step_changed(&self, _event: &StepEvent) {}
}

/// Snapshot of one step in a stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRecord {
    pub name: String,
    pub state: StepState,
}

/// A named sequence of steps, in the order they were opened.
pub struct Stage {
    name: String,
    sink: Arc<dyn EventSink>,
    steps: Mutex<Vec<StepRecord>>,
}

impl fmt::Debug for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stage")
            .field("name", &self.name)
            .field("steps", &*self.steps.lock())
            .finish()
    }
}

impl Stage {
    pub fn new(name: impl Into<String>, sink: Arc<dyn EventSink>) -> Self {
        Self {
            name: name.into(),
            sink,
            steps: Mutex::new(Vec::new()),
        }
    }

    /// A stage that only records its steps.
    pub fn recording(name: impl Into<String>) -> Self {
        Self::new(name, Arc::new(NullSink))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Open a new step. It starts out `NotStarted`.
    pub fn new_step(&self, name: impl Into<String>) -> Step<'_> {
        let mut steps = self.steps.lock();
        steps.push(StepRecord {
            name: name.into(),
            state: StepState::NotStarted,
        });
        Step {
            stage: self,
            index: steps.len() - 1,
        }
    }

    /// All steps opened so far, in order.
    pub fn steps(&self) -> Vec<StepRecord> {
        self.steps.lock().clone()
    }

    pub fn step_names(&self) -> Vec<String> {
        self.steps.lock().iter().map(|s| s.name.clone()).collect()
    }
}

/// One step of a [`Stage`].
#[derive(Debug)]
pub struct Step<'a> {
    stage: &'a Stage,
    index: usize,
}

impl Step<'_> {
    pub fn name(&self) -> String {
        self.stage.steps.lock()[self.index].name.clone()
    }

    pub fn state(&self) -> StepState {
        self.stage.steps.lock()[self.index].state.clone()
    }

    pub fn start(&self) {
        self.transition(StepState::started);
    }

    pub fn finish(&self) {
        self.transition(StepState::finished);
    }

    pub fn fail(&self, message: impl Into<String>) {
        let message = message.into();
        self.transition(move |state| state.failed(message));
    }

    fn transition(&self, next: impl FnOnce(&StepState) -> StepState) {
        let event = {
            let mut steps = self.stage.steps.lock();
            let record = &mut steps[self.index];
            record.state = next(&record.state);
            StepEvent {
                stage: self.stage.name.clone(),
                index: self.index,
                step: record.name.clone(),
                state: record.state.clone(),
            }
        };
        // Lock is released before the sink runs so sinks may inspect the stage
        self.stage.sink.step_changed(&event);
    }
}
