use serde::{Deserialize, Serialize};

/// A row of the `students` table as listed by the admin pages.
///
/// The certificate blob is deliberately not part of this row: it is only
/// fetched by the preview pipeline (see [`CertificateRow`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub student_id: i64,
    pub name: String,
    pub phone_number: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub year: Option<i64>,
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(default)]
    pub college_id: Option<i64>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub eligible: bool,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub certificate_approved: bool,
    #[serde(default)]
    pub certificate_id: Option<String>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub downloaded_count: i64,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub deleted: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// The columns the preview pipeline needs for one student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CertificateRow {
    pub name: String,
    #[serde(default)]
    pub certificate: Option<String>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub certificate_approved: bool,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub eligible: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CertificateStatus {
    Completed,
    InProgress,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateSummary {
    pub id: String,
    pub name: String,
    pub course: String,
    pub issue_date: Option<String>,
    pub status: CertificateStatus,
}

/// A student as shown in the admin certificates table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentView {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub certificates: Vec<CertificateSummary>,
    pub year: Option<i64>,
    pub branch: Option<String>,
    pub college_name: Option<String>,
    pub college_id: Option<i64>,
    pub certificate_id: Option<String>,
    pub eligible: bool,
    pub certificate_approved: bool,
    pub downloaded_count: i64,
}

impl StudentView {
    /// Builds the view of `student`, resolving its college name through `college_name`.
    pub fn from_student(student: Student, college_name: Option<String>) -> Self {
        let mut certificates = Vec::new();
        if student.eligible {
            certificates.push(CertificateSummary {
                id: student
                    .certificate_id
                    .clone()
                    .unwrap_or_else(|| format!("CERT_{}", student.student_id)),
                name: "Internship Certificate".to_string(),
                course: "Internship Program".to_string(),
                issue_date: student.created_at.clone(),
                status: CertificateStatus::Completed,
            });
        }

        Self {
            id: student.student_id.to_string(),
            name: student.name,
            phone: student.phone_number,
            certificates,
            year: student.year,
            branch: student.branch,
            college_name,
            college_id: student.college_id,
            certificate_id: student.certificate_id,
            eligible: student.eligible,
            certificate_approved: student.certificate_approved,
            downloaded_count: student.downloaded_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student(eligible: bool, certificate_id: Option<&str>) -> Student {
        Student {
            student_id: 7,
            name: "Asha".to_string(),
            phone_number: "9000000007".to_string(),
            email: None,
            year: Some(3),
            branch: Some("ECE".to_string()),
            college_id: Some(2),
            eligible,
            certificate_approved: false,
            certificate_id: certificate_id.map(str::to_string),
            downloaded_count: 1,
            deleted: false,
            created_at: Some("2024-06-01T10:00:00".to_string()),
        }
    }

    #[test]
    fn eligible_students_get_a_completed_certificate() {
        let view = StudentView::from_student(student(true, None), Some("GEC".to_string()));
        assert_eq!(view.id, "7");
        assert_eq!(view.certificates.len(), 1);
        assert_eq!(view.certificates[0].id, "CERT_7");
        assert_eq!(view.certificates[0].status, CertificateStatus::Completed);
        assert_eq!(view.college_name.as_deref(), Some("GEC"));

        let view = StudentView::from_student(student(true, Some("NT-0042")), None);
        assert_eq!(view.certificates[0].id, "NT-0042");
    }

    #[test]
    fn ineligible_students_have_no_certificates() {
        let view = StudentView::from_student(student(false, Some("NT-0042")), None);
        assert!(view.certificates.is_empty());
        assert!(!view.eligible);
    }

    #[test]
    fn null_flags_deserialize_as_false() {
        let row: Student = serde_json::from_str(
            r#"{"student_id":1,"name":"A","phone_number":"1","eligible":null,"downloaded_count":null}"#,
        )
        .unwrap();
        assert!(!row.eligible);
        assert!(!row.certificate_approved);
        assert_eq!(row.downloaded_count, 0);
    }
}
