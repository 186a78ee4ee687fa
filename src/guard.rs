/// Routes that need a session cookie.
pub const PROTECTED_PREFIXES: [&str; 3] = ["/my-reservations", "/admin", "/events/create"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Redirect {
        to: &'static str,
        clear_cookie: bool,
    },
}

/// Decides whether `path` may be visited given the presence of the session
/// cookie. Only the cookie is consulted, never the session itself.
pub fn check(path: &str, has_token: bool) -> Decision {
    let protected = PROTECTED_PREFIXES
        .iter()
        .any(|prefix| path.starts_with(prefix));

    if protected && !has_token {
        return Decision::Redirect {
            to: "/login",
            clear_cookie: true,
        };
    }

    if matches!(path, "/login" | "/register") && has_token {
        return Decision::Redirect {
            to: "/",
            clear_cookie: false,
        };
    }

    Decision::Allow
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protected_routes_need_cookie() {
        for path in [
            "/my-reservations",
            "/admin/dashboard",
            "/admin/events/e1/reservations",
            "/events/create",
        ] {
            assert_eq!(
                check(path, false),
                Decision::Redirect {
                    to: "/login",
                    clear_cookie: true
                },
                "{path}"
            );
            assert_eq!(check(path, true), Decision::Allow, "{path}");
        }
    }

    #[test]
    fn test_auth_pages_with_cookie_go_home() {
        for path in ["/login", "/register"] {
            assert_eq!(
                check(path, true),
                Decision::Redirect {
                    to: "/",
                    clear_cookie: false
                }
            );
            assert_eq!(check(path, false), Decision::Allow);
        }
    }

    #[test]
    fn test_public_routes() {
        for path in ["/", "/events/e1", "/login/help"] {
            assert_eq!(check(path, false), Decision::Allow);
        }
    }
}
