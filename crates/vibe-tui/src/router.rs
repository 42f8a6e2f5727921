//! Routes, navigation history and the chrome visibility rules that depend on
//! the current path.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Welcome,
    Home,
    Song(String),
    Music,
    Favorites,
    Bio,
    Admin,
}

impl Route {
    /// Unknown paths yield `None`.
    pub fn parse(path: &str) -> Option<Self> {
        let trimmed = path.trim();
        let path = if trimmed.len() > 1 {
            trimmed.trim_end_matches('/')
        } else {
            trimmed
        };
        match path {
            "" | "/" => Some(Self::Welcome),
            "/home" => Some(Self::Home),
            "/music" => Some(Self::Music),
            "/favorites" => Some(Self::Favorites),
            "/bio" => Some(Self::Bio),
            "/admin" => Some(Self::Admin),
            _ if path.starts_with("/admin/") => Some(Self::Admin),
            _ => {
                let id = path.strip_prefix("/song/")?;
                (!id.is_empty() && !id.contains('/')).then(|| Self::Song(id.to_string()))
            }
        }
    }

    pub fn path(&self) -> String {
        match self {
            Self::Welcome => "/".to_string(),
            Self::Home => "/home".to_string(),
            Self::Song(id) => format!("/song/{}", id),
            Self::Music => "/music".to_string(),
            Self::Favorites => "/favorites".to_string(),
            Self::Bio => "/bio".to_string(),
            Self::Admin => "/admin".to_string(),
        }
    }
}

/// The floating mini player shows whenever something is current, except on
/// the song page (which has its own controls) and in the admin panel.
pub fn floating_player_visible(path: &str, has_current_song: bool) -> bool {
    has_current_song && !path.contains("/song/") && !path.contains("/admin")
}

pub fn bottom_nav_visible(path: &str) -> bool {
    !path.contains("/song/")
}

pub struct NavItem {
    pub path: &'static str,
    pub label: &'static str,
    pub icon: &'static str,
}

pub const NAV_ITEMS: [NavItem; 4] = [
    NavItem {
        path: "/home",
        label: "home",
        icon: "⌂",
    },
    NavItem {
        path: "/bio",
        label: "bio",
        icon: "▦",
    },
    NavItem {
        path: "/music",
        label: "music",
        icon: "♫",
    },
    NavItem {
        path: "/favorites",
        label: "favorites",
        icon: "♥",
    },
];

pub fn nav_item_active(item_path: &str, current_path: &str) -> bool {
    current_path == item_path || current_path.starts_with(item_path)
}

/// In-app navigation stack. There is always at least one entry.
#[derive(Debug, Clone)]
pub struct History {
    stack: Vec<Route>,
}

impl History {
    pub fn new(start: Route) -> Self {
        Self { stack: vec![start] }
    }

    pub fn current(&self) -> &Route {
        // stack is never empty
        &self.stack[self.stack.len() - 1]
    }

    pub fn path(&self) -> String {
        self.current().path()
    }

    /// Pushing the current route again is a no-op.
    pub fn push(&mut self, route: Route) {
        if *self.current() != route {
            self.stack.push(route);
        }
    }

    /// Step back one entry. Returns false at the first entry.
    pub fn back(&mut self) -> bool {
        if self.stack.len() > 1 {
            self.stack.pop();
            true
        } else {
            false
        }
    }

    pub fn replace(&mut self, route: Route) {
        if let Some(last) = self.stack.last_mut() {
            *last = route;
        }
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(Route::Welcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_paths() {
        assert_eq!(Route::parse("/"), Some(Route::Welcome));
        assert_eq!(Route::parse("/home"), Some(Route::Home));
        assert_eq!(Route::parse("/music/"), Some(Route::Music));
        assert_eq!(Route::parse("/song/42"), Some(Route::Song("42".into())));
        assert_eq!(Route::parse("/admin"), Some(Route::Admin));
        assert_eq!(Route::parse("/admin/new"), Some(Route::Admin));
    }

    #[test]
    fn test_parse_unknown_paths() {
        assert_eq!(Route::parse("/song/"), None);
        assert_eq!(Route::parse("/song/1/extra"), None);
        assert_eq!(Route::parse("/nowhere"), None);
    }

    #[test]
    fn test_path_round_trips() {
        for route in [
            Route::Welcome,
            Route::Home,
            Route::Song("abc".into()),
            Route::Music,
            Route::Favorites,
            Route::Bio,
            Route::Admin,
        ] {
            assert_eq!(Route::parse(&route.path()), Some(route));
        }
    }

    #[test]
    fn test_floating_player_visibility() {
        assert!(!floating_player_visible("/home", false));
        assert!(floating_player_visible("/home", true));
        assert!(floating_player_visible("/", true));
        assert!(!floating_player_visible("/song/3", true));
        assert!(!floating_player_visible("/admin", true));
        assert!(!floating_player_visible("/admin/edit", true));
    }

    #[test]
    fn test_bottom_nav_visibility() {
        assert!(bottom_nav_visible("/home"));
        assert!(bottom_nav_visible("/admin"));
        assert!(!bottom_nav_visible("/song/3"));
    }

    #[test]
    fn test_nav_item_active() {
        assert!(nav_item_active("/music", "/music"));
        assert!(nav_item_active("/music", "/music/extra"));
        assert!(!nav_item_active("/music", "/home"));
        assert!(!nav_item_active("/home", "/"));
    }

    #[test]
    fn test_history_back_and_replace() {
        let mut h = History::default();
        assert!(!h.back());
        h.push(Route::Home);
        h.push(Route::Home);
        assert_eq!(h.depth(), 2);
        h.push(Route::Song("1".into()));
        assert_eq!(h.path(), "/song/1");
        assert!(h.back());
        assert_eq!(h.current(), &Route::Home);
        h.replace(Route::Music);
        assert_eq!(h.current(), &Route::Music);
        assert!(h.back());
        assert_eq!(h.current(), &Route::Welcome);
        assert!(!h.back());
    }
}
