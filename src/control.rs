//! PWM command dispatch and user-facing notices.

pub mod dispatcher;
pub mod notify;

pub use dispatcher::{parse_pwm, CommandError, DispatchOutcome, PwmDispatcher};
pub use notify::NotificationScheduler;
