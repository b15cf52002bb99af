//! Checkout flow state machine.

use crate::checkout::Order;
use crate::CommerceError;

/// Where a checkout currently stands.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutPhase {
    /// Customer reviews the selected lines and fills in details.
    Review,
    /// The create-order call is in flight.
    Submitting,
    /// The order was created; the confirmation is shown.
    Confirmed(Order),
    /// The confirmation was closed.
    Dismissed,
}

impl CheckoutPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutPhase::Review => "review",
            CheckoutPhase::Submitting => "submitting",
            CheckoutPhase::Confirmed(_) => "confirmed",
            CheckoutPhase::Dismissed => "dismissed",
        }
    }
}

/// One checkout attempt.
///
/// `Review -> Submitting -> Confirmed -> Dismissed`; a failed submission goes
/// back to `Review` with the error message kept for display.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutFlow {
    phase: CheckoutPhase,
    last_error: Option<String>,
}

impl Default for CheckoutFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckoutFlow {
    pub fn new() -> Self {
        Self {
            phase: CheckoutPhase::Review,
            last_error: None,
        }
    }

    pub fn phase(&self) -> &CheckoutPhase {
        &self.phase
    }

    /// Message from the last failed submission.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.phase == CheckoutPhase::Submitting
    }

    /// The created order while the confirmation is shown.
    pub fn order(&self) -> Option<&Order> {
        match &self.phase {
            CheckoutPhase::Confirmed(order) => Some(order),
            _ => None,
        }
    }

    fn transition_error(&self, to: &str) -> CommerceError {
        CommerceError::InvalidCheckoutTransition {
            from: self.phase.as_str().to_string(),
            to: to.to_string(),
        }
    }

    /// Enter `Submitting`. Rejects a second submission while one is in flight.
    pub fn begin_submit(&mut self) -> Result<(), CommerceError> {
        if self.phase != CheckoutPhase::Review {
            return Err(self.transition_error("submitting"));
        }
        self.last_error = None;
        self.phase = CheckoutPhase::Submitting;
        Ok(())
    }

    pub fn complete(&mut self, order: Order) -> Result<(), CommerceError> {
        if self.phase != CheckoutPhase::Submitting {
            return Err(self.transition_error("confirmed"));
        }
        self.phase = CheckoutPhase::Confirmed(order);
        Ok(())
    }

    /// Record a failed submission and return to `Review`.
    pub fn fail(&mut self, message: impl Into<String>) -> Result<(), CommerceError> {
        if self.phase != CheckoutPhase::Submitting {
            return Err(self.transition_error("review"));
        }
        self.last_error = Some(message.into());
        self.phase = CheckoutPhase::Review;
        Ok(())
    }

    /// Close the confirmation, handing back the order.
    pub fn dismiss(&mut self) -> Result<Order, CommerceError> {
        match std::mem::replace(&mut self.phase, CheckoutPhase::Dismissed) {
            CheckoutPhase::Confirmed(order) => Ok(order),
            previous => {
                self.phase = previous;
                Err(self.transition_error("dismissed"))
            }
        }
    }
}
