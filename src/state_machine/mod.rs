// State machine module for dispatch runs
//
// A run is a single pass through fetching and dispatching; the state machine
// keeps the dispatcher honest about which step it is in and gives logs a
// stable vocabulary.

pub mod run_state;

pub use run_state::RunState;
