use axum_extra::extract::cookie::{Cookie, SameSite, SignedCookieJar};

use crate::{config::SessionConfig, utils};

/// Session id carried by the signed cookie, if the browser sent a valid one.
pub fn session_id(jar: &SignedCookieJar, config: &SessionConfig) -> Option<String> {
    jar.get(&config.cookie_name)
        .map(|cookie| cookie.value().to_string())
        .filter(|id| !id.is_empty())
}

/// Returns the current session id, minting one and setting the cookie if needed.
pub fn ensure_session(jar: SignedCookieJar, config: &SessionConfig) -> (SignedCookieJar, String) {
    if let Some(id) = session_id(&jar, config) {
        return (jar, id);
    }

    let id = utils::generate_session_id();
    let cookie = Cookie::build((config.cookie_name.clone(), id.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.cookie_secure);
    (jar.add(cookie), id)
}

pub fn clear_session(jar: SignedCookieJar, config: &SessionConfig) -> SignedCookieJar {
    jar.remove(Cookie::build((config.cookie_name.clone(), "")).path("/"))
}
