use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m202601120004_create_students"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("students"))
                    .if_not_exists()
                    .col(ColumnDef::new(Alias::new("id")).integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(Alias::new("user_id")).big_integer().not_null().unique_key())
                    .col(ColumnDef::new(Alias::new("full_name")).string_len(100).not_null())
                    .col(ColumnDef::new(Alias::new("register_number")).string_len(100).not_null().unique_key())
                    .col(ColumnDef::new(Alias::new("roll_number")).string_len(20).null().unique_key())
                    .col(ColumnDef::new(Alias::new("department")).string_len(50).not_null())
                    .col(ColumnDef::new(Alias::new("semester")).string_len(10).not_null())
                    .col(ColumnDef::new(Alias::new("year")).string_len(10).null())
                    .col(ColumnDef::new(Alias::new("section")).string_len(5).not_null())
                    .col(ColumnDef::new(Alias::new("course")).string_len(100).null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_students_user")
                            .from(Alias::new("students"), Alias::new("user_id"))
                            .to(Alias::new("users"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Alias::new("students")).to_owned())
            .await
    }
}
