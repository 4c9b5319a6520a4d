//! Endpoint resolution.

use std::env;

use crate::preferences::UserPreferences;

/// Environment variable naming the analysis service base URL.
pub const API_BASE_ENV: &str = "SENPY_API_BASE";

/// Where a locally started senpy listens by default.
pub const DEFAULT_API_BASE: &str = "http://localhost:5000";

/// Pick the service base URL.
///
/// Resolution order: explicit flag, `SENPY_API_BASE`, saved preference,
/// [`DEFAULT_API_BASE`]. Blank values are skipped and a trailing `/` is
/// removed so paths can be appended directly.
pub fn resolve_api_base(flag: Option<&str>, preferences: &UserPreferences) -> String {
    let from_env = env::var(API_BASE_ENV).ok();
    let from_preferences = preferences.api_base();

    [flag.map(str::to_string), from_env, from_preferences]
        .into_iter()
        .flatten()
        .map(|candidate| candidate.trim().to_string())
        .find(|candidate| !candidate.is_empty())
        .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
        .trim_end_matches('/')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_wins_over_env_and_preferences() {
        let preferences = UserPreferences::ephemeral();
        preferences.set_api_base(Some("http://saved:5000".into())).expect("set api base");
        temp_env::with_var(API_BASE_ENV, Some("http://env:5000/"), || {
            assert_eq!(resolve_api_base(Some("http://flag:5000/"), &preferences), "http://flag:5000");
            assert_eq!(resolve_api_base(None, &preferences), "http://env:5000");
        });
    }

    #[test]
    fn falls_back_to_preferences_then_default() {
        let preferences = UserPreferences::ephemeral();
        temp_env::with_var_unset(API_BASE_ENV, || {
            assert_eq!(resolve_api_base(Some("   "), &preferences), DEFAULT_API_BASE);
            preferences.set_api_base(Some("http://saved:5000".into())).expect("set api base");
            assert_eq!(resolve_api_base(None, &preferences), "http://saved:5000");
        });
    }
}
