//! Mock backend for testing
//!
//! Returns a canned narrative, or a configured fallback, without any network
//! access. Useful for unit tests and offline demos.

use async_trait::async_trait;

use super::{AdviceBackend, AdviceFailure, AdviceOutcome};

const CANNED_ADVICE: &str = "\
## Financial Assessment

Your fixed costs take up a large share of income. Trimming discretionary spending \
in the categories with the highest potential savings will raise your savings rate.

## Action Plan

- Plan weekly grocery lists and buy staples in bulk.
- Cap eating out and entertainment with a monthly budget.
- Review subscriptions and utility plans every quarter.

## Long-term Planning

Build an emergency fund covering six months of expenses, then start a monthly SIP \
in a diversified index fund.";

/// Mock advice backend
#[derive(Debug, Clone)]
pub struct MockBackend {
    outcome: AdviceOutcome,
}

impl MockBackend {
    /// Mock that always returns the canned narrative
    pub fn new() -> Self {
        Self {
            outcome: AdviceOutcome::Advice(CANNED_ADVICE.to_string()),
        }
    }

    /// Mock that always returns `text`
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            outcome: AdviceOutcome::Advice(text.into()),
        }
    }

    /// Mock that always fails with `failure`
    pub fn failing(failure: AdviceFailure) -> Self {
        Self {
            outcome: AdviceOutcome::Fallback(failure),
        }
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AdviceBackend for MockBackend {
    async fn generate(&self, _prompt: &str) -> AdviceOutcome {
        self.outcome.clone()
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
