pub mod annotations;
pub mod buffer;
pub mod dispatcher;
pub mod fill;
pub mod history;
pub mod messages;
pub mod model;
pub mod recognizer;
pub mod render;
pub mod settings;
pub mod settings_store;
pub mod stroke;
pub mod surface;
pub mod viewport;

pub use buffer::{DrawError, PixelBuffer, Snapshot};
pub use dispatcher::RecognitionDispatcher;
pub use messages::{RecognitionEvent, RequestId, RunError, RunNotice};
pub use model::{Color, Point, Theme, Tool, ToolState};
pub use surface::{DrawingSurface, PointerAction};
