//! Sign in and out.

use estore_core::Email;
use estore_storefront::auth::CurrentUser;

use super::{CliError, say};
use crate::CliState;

/// Store `user` as the signed-in user.
///
/// # Errors
///
/// Returns an error if the email is malformed or the session can't be written.
pub fn login(
    state: &CliState,
    first_name: String,
    last_name: String,
    email: &str,
    phone: String,
) -> Result<(), CliError> {
    let email = Email::parse(email)?;
    let user = CurrentUser {
        first_name,
        last_name,
        email: email.as_str().to_string(),
        phone,
    };
    state.session().sign_in(&user)?;
    say(format!("Signed in as {}", user.display_name()))
}

/// Forget the signed-in user.
///
/// # Errors
///
/// Returns an error if the session can't be removed.
pub fn logout(state: &CliState) -> Result<(), CliError> {
    state.session().sign_out()?;
    say("Signed out")
}
