pub mod terminal;

pub use terminal::{BusyIndicator, Presenter, TerminalPresenter};
