//! Navigation bar view model.

use reqwest::Url;

use crate::guard::Route;
use crate::models::Identity;
use crate::session::SessionState;

pub const APP_TITLE: &str = "GDrive Search";
const AVATAR_SERVICE: &str = "https://ui-avatars.com/api/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavBarView {
    pub title: &'static str,
    /// Empty unless signed in.
    pub links: Vec<Route>,
    pub show_sign_out: bool,
    pub avatar_url: Option<String>,
    pub display_name: Option<String>,
}

pub fn nav_bar(state: &SessionState) -> NavBarView {
    match state.identity() {
        Some(identity) if !state.probe_in_progress() => NavBarView {
            title: APP_TITLE,
            links: vec![Route::Dashboard, Route::Search],
            show_sign_out: true,
            avatar_url: Some(avatar_url(identity)),
            display_name: Some(identity.name.clone()),
        },
        _ => NavBarView {
            title: APP_TITLE,
            links: Vec::new(),
            show_sign_out: false,
            avatar_url: None,
            display_name: None,
        },
    }
}

/// The identity's picture, or a generated initials avatar.
pub fn avatar_url(identity: &Identity) -> String {
    if let Some(picture) = identity.profile_picture.as_deref() {
        if !picture.trim().is_empty() {
            return picture.to_string();
        }
    }
    match Url::parse_with_params(AVATAR_SERVICE, &[("name", identity.name.as_str())]) {
        Ok(url) => url.to_string(),
        Err(_) => AVATAR_SERVICE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::identity;

    #[test]
    fn hidden_when_signed_out_or_probing() {
        assert!(nav_bar(&SessionState::settled(None)).links.is_empty());
        assert!(!nav_bar(&SessionState::booting()).show_sign_out);
    }

    #[test]
    fn links_and_avatar_when_signed_in() {
        let mut who = identity("u1");
        who.name = "Ada Lovelace".to_string();
        let view = nav_bar(&SessionState::settled(Some(who)));
        assert_eq!(view.links, vec![Route::Dashboard, Route::Search]);
        assert!(view.show_sign_out);
        assert_eq!(
            view.avatar_url.as_deref(),
            Some("https://ui-avatars.com/api/?name=Ada+Lovelace")
        );
    }

    #[test]
    fn prefers_profile_picture() {
        let mut who = identity("u1");
        who.profile_picture = Some("https://p.test/a.png".to_string());
        assert_eq!(avatar_url(&who), "https://p.test/a.png");
    }
}
