//! User upsert for OAuth logins.

use crate::auth::ProviderProfile;
use crate::models::{NewUser, User};
use crate::repository::{StoreError, StoreResult, UserStore};

/// Provider-qualified identity, e.g. `google-12345678`.
pub fn provider_id(provider: &str, subject: &str) -> String {
    format!("{}-{}", provider, subject)
}

fn new_user(provider: &str, profile: ProviderProfile) -> NewUser {
    let name = profile
        .display_name
        .clone()
        .or_else(|| profile.email.clone())
        .unwrap_or_else(|| profile.subject.clone());

    NewUser {
        provider_id: provider_id(provider, &profile.subject),
        provider: provider.to_string(),
        email: profile.email,
        name,
        firstname: profile.given_name,
        lastname: profile.family_name,
        profile_picture: profile.picture,
    }
}

/// Load the user for a provider identity, creating it on first login.
///
/// A concurrent first login for the same identity surfaces as a provider id
/// conflict; in that case the winner's row is returned.
pub async fn find_or_create(
    users: &dyn UserStore,
    provider: &str,
    profile: ProviderProfile,
) -> StoreResult<User> {
    let pid = provider_id(provider, &profile.subject);

    if let Some(user) = users.find_by_provider_id(&pid).await? {
        return Ok(user);
    }

    match users.create(new_user(provider, profile)).await {
        Ok(user) => {
            tracing::info!(provider_id = %user.provider_id, "Created user on first login");
            Ok(user)
        }
        Err(StoreError::Conflict(constraint)) => users
            .find_by_provider_id(&pid)
            .await?
            .ok_or(StoreError::Conflict(constraint)),
        Err(e) => Err(e),
    }
}
