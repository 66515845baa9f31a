//! Authorization flow state machine
//!
//! Pure state machine: receives events, returns (new_state, action).
//! The HTTP handlers perform the I/O each action calls for and feed the
//! outcome back in as the next event.

use meta_auth::StateCheck;

/// Default description when the provider sends `error` without one.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Flow states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowState {
    /// Listener up, no redirect issued yet
    Start,
    /// Browser sent to the login dialog, waiting for the callback
    Redirected,
    /// Callback accepted, exchanging the code
    CallbackPending,
    /// Short-lived token in hand, upgrading it
    Exchanged,
    /// Long-lived token obtained (terminal)
    Done,
    /// Callback refused: CSRF failure, provider error or malformed request
    Rejected { reason: String },
    /// An exchange with the provider failed
    Failed { error: String },
}

/// Events that drive state transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowEvent {
    /// `GET /`
    AuthorizeRequested,
    /// `GET /callback`, after the state parameter has been checked
    CallbackReceived {
        check: StateCheck,
        code: Option<String>,
        error: Option<String>,
        error_description: Option<String>,
    },
    /// Authorization code traded for a short-lived token
    CodeExchanged,
    /// Short-lived token upgraded to a long-lived one
    TokenUpgraded,
    /// Code exchange or upgrade failed
    ExchangeFailed(String),
}

/// Actions the handler should execute after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowAction {
    /// Issue a CSRF state and answer 302 to the login dialog
    Redirect,
    /// Trade the code for a short-lived token
    ExchangeCode { code: String },
    /// Upgrade the short-lived token
    UpgradeToken,
    /// Introspect, persist, render the success page and signal completion
    Complete,
    /// Answer with a plain error status
    Reject { status: u16, message: &'static str },
    /// Render the provider's error page (400)
    ProviderError { error: String, description: String },
    /// Answer 500 with the exchange error
    Fail { message: String },
    /// No-op
    None,
}

/// Handle a state transition. Pure function: no I/O.
pub fn handle_event(state: FlowState, event: FlowEvent) -> (FlowState, FlowAction) {
    match (state, event) {
        // --- Completed flows stay completed ---
        (FlowState::Done, FlowEvent::AuthorizeRequested) => (
            FlowState::Done,
            FlowAction::Reject {
                status: 410,
                message: "Authorization already completed",
            },
        ),
        (FlowState::Done, FlowEvent::CallbackReceived { .. }) => (
            FlowState::Done,
            FlowAction::Reject {
                status: 403,
                message: "Invalid state parameter. Possible CSRF attack.",
            },
        ),

        // --- Any other state may (re)start the flow ---
        (_, FlowEvent::AuthorizeRequested) => (FlowState::Redirected, FlowAction::Redirect),

        // --- Callback ---
        (
            _,
            FlowEvent::CallbackReceived {
                check,
                code,
                error,
                error_description,
            },
        ) => match check {
            StateCheck::Missing => reject(400, "Missing state parameter"),
            StateCheck::Mismatch => reject(403, "Invalid state parameter. Possible CSRF attack."),
            StateCheck::Expired => reject(403, "State parameter expired. Start the flow again."),
            StateCheck::Matched => match (code, error) {
                (Some(code), _) => (
                    FlowState::CallbackPending,
                    FlowAction::ExchangeCode { code },
                ),
                (None, Some(error)) => (
                    FlowState::Rejected {
                        reason: error.clone(),
                    },
                    FlowAction::ProviderError {
                        error,
                        description: error_description
                            .unwrap_or_else(|| UNKNOWN_ERROR.to_owned()),
                    },
                ),
                (None, None) => reject(400, "Missing code or error parameter"),
            },
        },

        // --- Exchange ---
        (FlowState::CallbackPending, FlowEvent::CodeExchanged) => {
            (FlowState::Exchanged, FlowAction::UpgradeToken)
        }

        (FlowState::Exchanged, FlowEvent::TokenUpgraded) => (FlowState::Done, FlowAction::Complete),

        (FlowState::CallbackPending | FlowState::Exchanged, FlowEvent::ExchangeFailed(error)) => (
            FlowState::Failed {
                error: error.clone(),
            },
            FlowAction::Fail { message: error },
        ),

        // --- Invalid/unhandled transition: stay in current state ---
        (state, _event) => (state, FlowAction::None),
    }
}

fn reject(status: u16, message: &'static str) -> (FlowState, FlowAction) {
    (
        FlowState::Rejected {
            reason: message.to_owned(),
        },
        FlowAction::Reject { status, message },
    )
}
