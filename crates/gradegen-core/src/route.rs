//! Route resolution for classified criteria.
//!
//! The Kambaz table below is consumed verbatim by generated tests and by the
//! route constants the repair engine injects, so entries must stay stable.

/// Application root.
pub const ROOT_ROUTE: &str = "/";
/// Kambaz dashboard.
pub const DASHBOARD_ROUTE: &str = "dashboard";
/// Canonical sign-in screen.
pub const SIGN_IN_ROUTE: &str = "account/signin";

/// Placeholder segment resolved against `COURSE_ID` by the generated test.
pub const COURSE_ID_PLACEHOLDER: &str = ":courseId";
/// Placeholder segment resolved against `ASSIGNMENT_ID` by the generated test.
pub const ASSIGNMENT_ID_PLACEHOLDER: &str = ":assignmentId";

/// Fixed per-assignment lab path.
pub fn lab_route(assignment_number: u32) -> String {
    format!("labs/lab{}", assignment_number)
}

/// Resolve a Kambaz `(section, subsection)` pair to a route template.
///
/// Precedence: navigation-only, dashboard, account, course-scoped, root.
pub fn resolve_kambaz_route(section: &str, subsection: Option<&str>) -> String {
    let section = section.trim();
    let subsection = subsection.map(str::trim).filter(|s| !s.is_empty());

    if section.eq_ignore_ascii_case("navigation") {
        return ROOT_ROUTE.to_string();
    }
    if section.eq_ignore_ascii_case("dashboard") {
        return DASHBOARD_ROUTE.to_string();
    }
    if section.eq_ignore_ascii_case("account") {
        return match subsection {
            Some(sub) if sub.eq_ignore_ascii_case("navigation") => SIGN_IN_ROUTE.to_string(),
            Some(sub) => format!("account/{}", sub),
            None => SIGN_IN_ROUTE.to_string(),
        };
    }
    if let Some(route) = course_scoped_route(section) {
        return route;
    }

    ROOT_ROUTE.to_string()
}

fn course_scoped_route(section: &str) -> Option<String> {
    let tail = match section.to_ascii_lowercase().as_str() {
        "courses" => "home".to_string(),
        "modules" => "modules".to_string(),
        "assignments" => "assignments".to_string(),
        "assignment editor" => format!("assignments/{}", ASSIGNMENT_ID_PLACEHOLDER),
        _ => return None,
    };
    Some(format!("courses/{}/{}", COURSE_ID_PLACEHOLDER, tail))
}

/// JavaScript expression a generated test passes to `page.goto`.
///
/// Placeholder segments become template-literal interpolations of the
/// injected route constants.
pub fn goto_expression(route: &str) -> String {
    let path = if route.starts_with('/') {
        route.to_string()
    } else {
        format!("/{}", route)
    };

    if path.contains(COURSE_ID_PLACEHOLDER) || path.contains(ASSIGNMENT_ID_PLACEHOLDER) {
        let interpolated = path
            .replace(COURSE_ID_PLACEHOLDER, "${COURSE_ID}")
            .replace(ASSIGNMENT_ID_PLACEHOLDER, "${ASSIGNMENT_ID}");
        format!("`{}`", interpolated)
    } else {
        format!("'{}'", path.replace('\'', "\\'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_navigation_maps_to_sign_in() {
        assert_eq!(
            resolve_kambaz_route("Account", Some("Navigation")),
            SIGN_IN_ROUTE
        );
    }

    #[test]
    fn test_account_subsection_is_kept_verbatim() {
        assert_eq!(
            resolve_kambaz_route("Account", Some("Profile")),
            "account/Profile"
        );
    }

    #[test]
    fn test_dashboard_ignores_subsection() {
        assert_eq!(resolve_kambaz_route("Dashboard", None), DASHBOARD_ROUTE);
        assert_eq!(
            resolve_kambaz_route("Dashboard", Some("Course cards")),
            DASHBOARD_ROUTE
        );
    }

    #[test]
    fn test_navigation_section_maps_to_root() {
        assert_eq!(resolve_kambaz_route("Navigation", Some("Sidebar")), ROOT_ROUTE);
    }

    #[test]
    fn test_course_scoped_sections_are_templated() {
        assert_eq!(
            resolve_kambaz_route("Courses", None),
            "courses/:courseId/home"
        );
        assert_eq!(
            resolve_kambaz_route("Modules", Some("List")),
            "courses/:courseId/modules"
        );
        assert_eq!(
            resolve_kambaz_route("Assignments", None),
            "courses/:courseId/assignments"
        );
        assert_eq!(
            resolve_kambaz_route("Assignment Editor", None),
            "courses/:courseId/assignments/:assignmentId"
        );
    }

    #[test]
    fn test_unknown_section_maps_to_root() {
        assert_eq!(resolve_kambaz_route("Grades", Some("Table")), ROOT_ROUTE);
    }

    #[test]
    fn test_goto_expression_quotes_plain_routes() {
        assert_eq!(goto_expression("labs/lab2"), "'/labs/lab2'");
        assert_eq!(goto_expression(ROOT_ROUTE), "'/'");
    }

    #[test]
    fn test_goto_expression_interpolates_placeholders() {
        assert_eq!(
            goto_expression("courses/:courseId/assignments/:assignmentId"),
            "`/courses/${COURSE_ID}/assignments/${ASSIGNMENT_ID}`"
        );
    }
}
