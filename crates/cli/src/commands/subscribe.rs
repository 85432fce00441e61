//! Newsletter subscription check.
//!
//! Runs the same rules as the storefront form. Nothing is sent anywhere.
//!
//! # Usage
//!
//! ```bash
//! strivo subscribe --first-name Ana --last-name Ruiz \
//!     --email ana@example.com --accept-terms --interest running
//! ```

use std::io::Write;

use strivo_core::subscription::{self, SubscriptionInput};

use super::CliError;

/// Validate a subscription and print the outcome.
///
/// Every failed rule is printed before the error is returned.
pub fn run(input: &SubscriptionInput, out: &mut impl Write) -> Result<(), CliError> {
    match subscription::validate(input) {
        Ok(accepted) => {
            tracing::info!(
                email_domain = accepted.email.domain(),
                interests = ?accepted.interests,
                "Subscription accepted"
            );
            writeln!(out, "¡Gracias, {}!", accepted.first_name)?;
            writeln!(out, "Subscribed {} at {}", accepted.email, accepted.subscribed_at)?;
            Ok(())
        }
        Err(errors) => {
            for error in errors.iter() {
                writeln!(out, "{}: {error}", error.field())?;
            }
            Err(errors.into())
        }
    }
}
