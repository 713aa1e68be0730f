//! Entry gate in front of the checklist
//!
//! The gate checks nothing and holds nothing. Activating it only asks the
//! application to show the checklist.

/// Screens reachable in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Gate,
    Checklist,
}

/// The single-action entry screen
#[derive(Debug, Clone, Copy, Default)]
pub struct Gate;

impl Gate {
    /// Label of the entry control
    pub const ACTION_LABEL: &'static str = "ENTER";

    /// Activate the entry control
    pub fn enter(&self) -> Route {
        Route::Checklist
    }
}
