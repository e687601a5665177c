use crate::auth::AdminSession;
use crate::errors::PortalError;
use crate::services::crud::{self, respond, Action, Entity};
use crate::state::AppState;
use crate::store::{decode_rows, Query, RemoteStore};
use actix_web::{web, HttpResponse};
use common::model::college::College;
use common::model::student::{Student, StudentView};
use common::requests::ListQuery;
use std::collections::HashMap;

/// Students with their college names and certificate summaries.
pub async fn list_views(
    store: &dyn RemoteStore,
    search: Option<&str>,
) -> Result<Vec<StudentView>, PortalError> {
    let students = crud::list::<Student>(store, search).await?;
    let colleges: Vec<College> = decode_rows(
        store
            .select(College::TABLE, &Query::all().columns(&["college_id", "college_name"]))
            .await?,
    )?;
    let names: HashMap<i64, String> = colleges
        .into_iter()
        .map(|c| (c.college_id, c.college_name))
        .collect();

    Ok(students
        .into_iter()
        .map(|student| {
            let college = student.college_id.and_then(|id| names.get(&id).cloned());
            StudentView::from_student(student, college)
        })
        .collect())
}

pub async fn process(
    _admin: AdminSession,
    state: web::Data<AppState>,
    query: web::Query<ListQuery>,
) -> HttpResponse {
    let result = list_views(state.store.as_ref(), query.search.as_deref()).await;
    respond(result, &Student::MESSAGES, Action::Fetch)
}
