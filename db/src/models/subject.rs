use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::Set, ConnectionTrait, QueryFilter, QueryOrder};
use serde::Serialize;

/// A taught subject. `sections` is the JSON list of section labels the
/// subject covers, e.g. `["A", "B"]`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "subjects")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub name: String,
    #[sea_orm(unique)]
    pub code: String,
    pub sections: Json,
    /// Nulled when the owning teacher is removed.
    pub teacher_id: Option<i64>,
    pub department: Option<String>,
    pub semester: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::teacher::Entity",
        from = "Column::TeacherId",
        to = "super::teacher::Column::Id",
        on_delete = "SetNull"
    )]
    Teacher,
    #[sea_orm(has_many = "super::attendance_record::Entity")]
    AttendanceRecords,
}

impl Related<super::teacher::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Teacher.def()
    }
}

impl Related<super::attendance_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AttendanceRecords.def()
    }
}

impl Related<super::student::Entity> for Entity {
    fn to() -> RelationDef {
        super::student_subject::Relation::Student.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::student_subject::Relation::Subject.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn create<C>(
        db: &C,
        name: &str,
        code: &str,
        sections: &[String],
        teacher_id: Option<i64>,
        department: Option<&str>,
        semester: Option<&str>,
    ) -> Result<Model, DbErr>
    where
        C: ConnectionTrait,
    {
        let subject = ActiveModel {
            name: Set(name.trim().to_owned()),
            code: Set(code.trim().to_owned()),
            sections: Set(sections_json(sections)),
            teacher_id: Set(teacher_id),
            department: Set(department.map(str::to_owned)),
            semester: Set(semester.map(str::to_owned)),
            ..Default::default()
        };

        subject.insert(db).await
    }

    /// Section labels this subject serves. Non-string JSON entries are ignored.
    pub fn section_list(&self) -> Vec<String> {
        self.sections
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_owned))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn covers_section(&self, section: &str) -> bool {
        let section = section.trim();
        self.section_list().iter().any(|s| s == section)
    }

    pub fn is_owned_by(&self, teacher_id: i64) -> bool {
        self.teacher_id == Some(teacher_id)
    }

    /// All subjects owned by `teacher_id`, ordered by name.
    pub async fn owned_by<C>(db: &C, teacher_id: i64) -> Result<Vec<Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        Entity::find()
            .filter(Column::TeacherId.eq(teacher_id))
            .order_by_asc(Column::Name)
            .all(db)
            .await
    }
}

pub fn sections_json(sections: &[String]) -> Json {
    Json::Array(
        sections
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| Json::String(s.to_owned()))
            .collect(),
    )
}
