mod bus;
mod dispatcher;
mod events;

#[cfg(test)]
mod tests;

pub use bus::{TabRouter, TabSink};
pub use dispatcher::{DispatchContext, Dispatcher, TIMED_OUT};
