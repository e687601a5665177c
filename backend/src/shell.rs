//! Page routing of the portal shell.
//!
//! Every request no API scope claims lands here (the server's default
//! service). The path is resolved against the page table and the caller's
//! session: pages of another role redirect to the caller's dashboard,
//! signed-out callers are sent to `/login`, and signed-in callers visiting
//! `/login` go to their dashboard.

use crate::auth::{CurrentSession, Session};
use actix_web::http::header::LOCATION;
use actix_web::{HttpRequest, HttpResponse};
use common::model::session::Role;
use common::model::toast::PageResponse;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    /// Only without a session.
    Guest,
    Only(Role),
}

struct Route {
    path: &'static str,
    title: &'static str,
    access: Access,
}

const fn page(path: &'static str, title: &'static str, access: Access) -> Route {
    Route {
        path,
        title,
        access,
    }
}

const STUDENT: Access = Access::Only(Role::Student);
const ADMIN: Access = Access::Only(Role::Admin);

const ROUTES: &[Route] = &[
    page("/login", "Login", Access::Guest),
    page("/user/dashboard", "Dashboard", STUDENT),
    page("/user/certificates", "My Certificates", STUDENT),
    page("/user/downloads", "Downloads", STUDENT),
    page("/user/student-info", "Student Info", STUDENT),
    page("/user/company-info", "Company Info", STUDENT),
    page("/admin/dashboard", "Dashboard", ADMIN),
    page("/admin/certificates", "Certificates", ADMIN),
    page("/admin/requests", "Requests", ADMIN),
    page("/admin/courses", "Courses", ADMIN),
    page("/admin/company-info", "Company Info", ADMIN),
    page("/admin/templates", "Templates", ADMIN),
    page("/admin/colleges", "Colleges", ADMIN),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    pub path: &'static str,
    pub title: &'static str,
    pub role: Option<Role>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Render(Page),
    Redirect(&'static str),
    NotFound,
}

pub fn resolve(path: &str, session: Option<&Session>) -> Navigation {
    let path = match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    };
    if path == "/" {
        return Navigation::Redirect("/login");
    }
    let Some(route) = ROUTES.iter().find(|r| r.path == path) else {
        return Navigation::NotFound;
    };
    let role = session.map(|s| s.role);

    match (route.access, role) {
        (Access::Guest, Some(role)) => Navigation::Redirect(role.home()),
        (Access::Guest, None) => Navigation::Render(Page {
            path: route.path,
            title: route.title,
            role: None,
        }),
        (Access::Only(_), None) => Navigation::Redirect("/login"),
        (Access::Only(required), Some(role)) if required != role => {
            Navigation::Redirect(role.home())
        }
        (Access::Only(required), Some(_)) => Navigation::Render(Page {
            path: route.path,
            title: route.title,
            role: Some(required),
        }),
    }
}

/// Default service of the server.
pub async fn serve(req: HttpRequest, current: Option<CurrentSession>) -> HttpResponse {
    let session = current.map(|c| c.session);
    match resolve(req.path(), session.as_ref()) {
        Navigation::Render(page) => HttpResponse::Ok().json(PageResponse::data(page)),
        Navigation::Redirect(to) => HttpResponse::Found()
            .insert_header((LOCATION, to))
            .finish(),
        Navigation::NotFound => HttpResponse::NotFound().body("Not Found"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;
    use actix_web::http::StatusCode;
    use actix_web::{test, web, App};

    fn render(path: &'static str) -> Navigation {
        let route = ROUTES.iter().find(|r| r.path == path).unwrap();
        Navigation::Render(Page {
            path,
            title: route.title,
            role: match route.access {
                Access::Guest => None,
                Access::Only(role) => Some(role),
            },
        })
    }

    #[::core::prelude::v1::test]
    fn root_always_goes_to_login() {
        assert_eq!(resolve("/", None), Navigation::Redirect("/login"));
        assert_eq!(resolve("", Some(&Session::admin())), Navigation::Redirect("/login"));
    }

    #[::core::prelude::v1::test]
    fn signed_out_users_only_see_login() {
        assert_eq!(resolve("/login", None), render("/login"));
        assert_eq!(resolve("/admin/templates", None), Navigation::Redirect("/login"));
        assert_eq!(resolve("/user/downloads/", None), Navigation::Redirect("/login"));
    }

    #[::core::prelude::v1::test]
    fn roles_only_reach_their_own_pages() {
        let admin = Session::admin();
        let student = Session::student(3);
        assert_eq!(resolve("/admin/colleges", Some(&admin)), render("/admin/colleges"));
        assert_eq!(
            resolve("/admin/colleges", Some(&student)),
            Navigation::Redirect("/user/dashboard")
        );
        assert_eq!(
            resolve("/user/certificates", Some(&admin)),
            Navigation::Redirect("/admin/dashboard")
        );
        assert_eq!(resolve("/user/company-info", Some(&student)), render("/user/company-info"));
        assert_eq!(resolve("/login", Some(&student)), Navigation::Redirect("/user/dashboard"));
    }

    #[::core::prelude::v1::test]
    fn unknown_paths_are_not_found() {
        assert_eq!(resolve("/admin/settings", Some(&Session::admin())), Navigation::NotFound);
        assert_eq!(resolve("/nope", None), Navigation::NotFound);
    }

    #[actix_web::test]
    async fn default_service_redirects_and_renders() {
        let state = AppState::for_tests();
        let token = state.sessions.create(Session::admin()).await;
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .default_service(web::route().to(serve)),
        )
        .await;

        let req = test::TestRequest::get().uri("/admin/courses").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(resp.headers().get(LOCATION).unwrap(), "/login");

        let req = test::TestRequest::get()
            .uri("/admin/courses")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let req = test::TestRequest::get().uri("/missing").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }
}
