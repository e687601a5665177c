use crate::auth::AdminSession;
use crate::services::crud::{self, respond, Action, Entity};
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use common::model::student::Student;
use log::info;

/// `DELETE /{id}`: deletes the student and signs them out everywhere.
pub async fn process(
    _admin: AdminSession,
    state: web::Data<AppState>,
    id: web::Path<i64>,
) -> HttpResponse {
    let id = id.into_inner();
    let result = crud::delete::<Student>(state.store.as_ref(), id).await;
    if result.is_ok() {
        let ended = state.sessions.remove_student(id).await;
        info!("deleted student {}, ended {} session(s)", id, ended);
    }
    respond(result, &Student::MESSAGES, Action::Delete)
}

#[cfg(test)]
mod tests {
    use crate::auth::Session;
    use crate::services;
    use crate::services::crud;
    use crate::state::AppState;
    use actix_web::{test, web, App};
    use common::model::student::Student;
    use common::requests::StudentDraft;

    #[actix_web::test]
    async fn deleted_students_lose_their_sessions() {
        let state = AppState::for_tests();
        let asha = crud::add::<Student>(
            state.store.as_ref(),
            &StudentDraft {
                name: "Asha".to_string(),
                phone_number: "9000000001".to_string(),
                ..StudentDraft::default()
            },
        )
        .await
        .unwrap();
        let admin = state.sessions.create(Session::admin()).await;
        let student = state.sessions.create(Session::student(asha.student_id)).await;
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state.clone()))
                .configure(services::configure),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/me")
            .insert_header(("Authorization", format!("Bearer {student}")))
            .to_request();
        assert!(test::call_service(&app, req).await.status().is_success());

        let req = test::TestRequest::delete()
            .uri(&format!("/api/admin/students/{}", asha.student_id))
            .insert_header(("Authorization", format!("Bearer {admin}")))
            .to_request();
        assert!(test::call_service(&app, req).await.status().is_success());

        let req = test::TestRequest::get()
            .uri("/api/me")
            .insert_header(("Authorization", format!("Bearer {student}")))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 401);
        assert!(state.sessions.get(&admin).await.is_some());
    }
}
