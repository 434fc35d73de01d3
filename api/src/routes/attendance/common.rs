use chrono::NaiveDate;
use serde::Deserialize;
use services::attendance_service::{CreateBatch, NewMark};

fn default_session() -> i32 {
    1
}

/// One mark as submitted by a client.
#[derive(Debug, Clone, Deserialize)]
pub struct MarkItem {
    pub student: i64,
    pub subject: i64,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default = "default_session")]
    pub session: i32,
    pub status: String,
    #[serde(default)]
    pub semester: Option<String>,
    #[serde(default)]
    pub section: Option<String>,
}

impl From<MarkItem> for NewMark {
    fn from(item: MarkItem) -> Self {
        NewMark {
            student_id: item.student,
            subject_id: item.subject,
            date: item.date,
            session: item.session,
            status: item.status,
        }
    }
}

/// Accepted shapes for `POST /attendance`: an explicit batch envelope, a bare
/// list of marks, or a single mark.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum CreateAttendanceBody {
    Batch {
        semester: String,
        section: String,
        items: Vec<MarkItem>,
    },
    Many(Vec<MarkItem>),
    One(MarkItem),
}

impl CreateAttendanceBody {
    /// Normalizes every shape into one batch. For bare marks the semester and
    /// section come from the first mark and every other mark must agree with it.
    pub fn into_batch(self) -> Result<CreateBatch, String> {
        match self {
            CreateAttendanceBody::Batch {
                semester,
                section,
                items,
            } => Ok(CreateBatch {
                semester,
                section,
                items: items.into_iter().map(NewMark::from).collect(),
            }),
            CreateAttendanceBody::One(item) => Self::from_marks(vec![item]),
            CreateAttendanceBody::Many(items) => Self::from_marks(items),
        }
    }

    fn from_marks(items: Vec<MarkItem>) -> Result<CreateBatch, String> {
        let Some(first) = items.first() else {
            return Err("At least one attendance entry is required".into());
        };
        let semester = first.semester.clone().unwrap_or_default();
        let section = first.section.clone().unwrap_or_default();

        let mixed = items.iter().any(|i| {
            i.semester.as_deref().is_some_and(|s| s.trim() != semester.trim())
                || i.section.as_deref().is_some_and(|s| s.trim() != section.trim())
        });
        if mixed {
            return Err("All entries in a batch must share the same semester and section".into());
        }

        Ok(CreateBatch {
            semester,
            section,
            items: items.into_iter().map(NewMark::from).collect(),
        })
    }
}
