pub mod clock;
pub mod event;
pub mod key_bindings;
pub mod scheduler;

pub use clock::{Clock, ManualClock, SystemClock};
pub use event::FormSignal;
pub use key_bindings::{KeyBindings, KeyCode, KeyEvent, KeyModifiers, NavCommand};
pub use scheduler::{Scheduler, SchedulerCommand, TimerEvent};
