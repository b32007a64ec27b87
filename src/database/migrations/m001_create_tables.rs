use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create derby_names table
        manager
            .create_table(
                Table::create()
                    .table(DerbyNames::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DerbyNames::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(DerbyNames::Name)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(DerbyNames::Metadata).json())
                    .col(ColumnDef::new(DerbyNames::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(DerbyNames::UpdatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        // Create derby_jerseys table
        manager
            .create_table(
                Table::create()
                    .table(DerbyJerseys::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DerbyJerseys::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(DerbyJerseys::NameId).integer().not_null())
                    .col(ColumnDef::new(DerbyJerseys::Image).string())
                    .col(ColumnDef::new(DerbyJerseys::Metadata).json())
                    .col(
                        ColumnDef::new(DerbyJerseys::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DerbyJerseys::UpdatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_derby_jerseys_name_id")
                            .from(DerbyJerseys::Table, DerbyJerseys::NameId)
                            .to(DerbyNames::Table, DerbyNames::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_derby_jerseys_name_id")
                    .table(DerbyJerseys::Table)
                    .col(DerbyJerseys::NameId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DerbyJerseys::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(DerbyNames::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(Iden)]
enum DerbyNames {
    Table,
    Id,
    Name,
    Metadata,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum DerbyJerseys {
    Table,
    Id,
    NameId,
    Image,
    Metadata,
    CreatedAt,
    UpdatedAt,
}
