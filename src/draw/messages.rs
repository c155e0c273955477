use crate::draw::annotations::{RecognitionResult, Rect};

/// Identifies one recognition run. Ids increase in dispatch order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(pub u64);

/// Worker to surface.
#[derive(Debug, Clone, PartialEq)]
pub enum RecognitionEvent {
    Completed {
        id: RequestId,
        bounds: Option<Rect>,
        results: Vec<RecognitionResult>,
    },
    Failed {
        id: RequestId,
        message: String,
    },
}

impl RecognitionEvent {
    pub fn id(&self) -> RequestId {
        match self {
            RecognitionEvent::Completed { id, .. } | RecognitionEvent::Failed { id, .. } => *id,
        }
    }
}

/// What the host should tell the user once an event has been applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunNotice {
    Applied { id: RequestId, entries: usize },
    Failed { id: RequestId, message: String },
}

pub const BLANK_CANVAS_MESSAGE: &str = "Canvas is blank. Please draw something before running.";
pub const RUN_FAILED_MESSAGE: &str = "Failed to process the image. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunError {
    BlankCanvas,
    Dispatch(String),
}

impl std::fmt::Display for RunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunError::BlankCanvas => f.write_str(BLANK_CANVAS_MESSAGE),
            RunError::Dispatch(reason) => write!(f, "{RUN_FAILED_MESSAGE} ({reason})"),
        }
    }
}

impl std::error::Error for RunError {}
