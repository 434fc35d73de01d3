use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::Set, ConnectionTrait, QueryFilter, QueryOrder};
use serde::Serialize;

/// Student profile attached to a user.
///
/// `semester` and `section` describe where the student currently sits; attendance
/// rows keep their own copy taken when the mark was made.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "students")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub user_id: i64,
    pub full_name: String,
    #[sea_orm(unique)]
    pub register_number: String,
    pub roll_number: Option<String>,
    pub department: String,
    pub semester: String,
    pub year: Option<String>,
    pub section: String,
    pub course: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(has_many = "super::attendance_record::Entity")]
    AttendanceRecords,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::attendance_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AttendanceRecords.def()
    }
}

impl Related<super::subject::Entity> for Entity {
    fn to() -> RelationDef {
        super::student_subject::Relation::Subject.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::student_subject::Relation::Student.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Fields needed to create a student profile.
#[derive(Debug, Clone)]
pub struct NewStudent {
    pub user_id: i64,
    pub full_name: String,
    pub register_number: String,
    pub roll_number: Option<String>,
    pub department: String,
    pub semester: String,
    pub year: Option<String>,
    pub section: String,
    pub course: Option<String>,
}

impl Model {
    pub async fn create<C>(db: &C, new: NewStudent) -> Result<Model, DbErr>
    where
        C: ConnectionTrait,
    {
        let student = ActiveModel {
            user_id: Set(new.user_id),
            full_name: Set(new.full_name.trim().to_owned()),
            register_number: Set(new.register_number.trim().to_owned()),
            roll_number: Set(new.roll_number),
            department: Set(new.department.trim().to_owned()),
            semester: Set(new.semester.trim().to_owned()),
            year: Set(new.year),
            section: Set(new.section.trim().to_owned()),
            course: Set(new.course),
            ..Default::default()
        };

        student.insert(db).await
    }

    pub async fn find_by_user<C>(db: &C, user_id: i64) -> Result<Option<Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        Entity::find()
            .filter(Column::UserId.eq(user_id))
            .one(db)
            .await
    }

    pub async fn find_by_register_number<C>(
        db: &C,
        register_number: &str,
    ) -> Result<Option<Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        Entity::find()
            .filter(Column::RegisterNumber.eq(register_number.trim()))
            .one(db)
            .await
    }

    /// Links the student to a subject. Re-enrolling is a no-op.
    pub async fn enroll<C>(&self, db: &C, subject_id: i64) -> Result<(), DbErr>
    where
        C: ConnectionTrait,
    {
        let existing = super::student_subject::Entity::find_by_id((self.id, subject_id))
            .one(db)
            .await?;
        if existing.is_some() {
            return Ok(());
        }

        super::student_subject::ActiveModel {
            student_id: Set(self.id),
            subject_id: Set(subject_id),
        }
        .insert(db)
        .await?;
        Ok(())
    }

    pub async fn subjects<C>(&self, db: &C) -> Result<Vec<super::subject::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        self.find_related(super::subject::Entity)
            .order_by_asc(super::subject::Column::Name)
            .all(db)
            .await
    }
}
