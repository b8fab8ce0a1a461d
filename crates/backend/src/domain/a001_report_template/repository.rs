use chrono::Utc;
use contracts::domain::a001_report_template::aggregate::{ReportTemplate, ReportTemplateId};
use contracts::domain::a001_report_template::binding::TemplateBinding;
use contracts::domain::a001_report_template::template_file::TemplateFile;
use contracts::domain::common::{AggregateId, BaseAggregate, EntityMetadata};
use sea_orm::entity::prelude::*;
use sea_orm::prelude::Expr;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

mod report_template {
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "a001_report_template")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        pub name: String,
        pub description: Option<String>,
        pub group_name: Option<String>,
        pub bindings_json: String,
        pub template_file_json: Option<String>,
        pub is_deleted: bool,
        pub created_at: Option<chrono::DateTime<chrono::Utc>>,
        pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
        pub version: i32,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

/// Строка читается целиком или не читается вовсе
impl TryFrom<report_template::Model> for ReportTemplate {
    type Error = DbErr;

    fn try_from(m: report_template::Model) -> Result<Self, Self::Error> {
        let metadata = EntityMetadata {
            created_at: m.created_at.unwrap_or_else(Utc::now),
            updated_at: m.updated_at.unwrap_or_else(Utc::now),
            is_deleted: m.is_deleted,
            version: m.version,
        };

        let uuid = Uuid::parse_str(&m.id).map_err(|e| corrupt(&m.id, "id", e))?;

        let bindings: Vec<TemplateBinding> =
            serde_json::from_str(&m.bindings_json).map_err(|e| corrupt(&m.id, "bindings_json", e))?;

        let template_file: Option<TemplateFile> = m
            .template_file_json
            .as_deref()
            .map(serde_json::from_str::<TemplateFile>)
            .transpose()
            .map_err(|e| corrupt(&m.id, "template_file_json", e))?;

        Ok(ReportTemplate {
            base: BaseAggregate::with_metadata(
                ReportTemplateId::new(uuid),
                m.name,
                m.description,
                metadata,
            ),
            group: m.group_name,
            bindings,
            template_file,
        })
    }
}

fn corrupt(id: &str, column: &str, e: impl std::fmt::Display) -> DbErr {
    tracing::error!("Template {}: unreadable {}: {}", id, column, e);
    DbErr::Custom(format!("Template {} has unreadable {}: {}", id, column, e))
}

fn to_active_model(template: &ReportTemplate) -> Result<report_template::ActiveModel, DbErr> {
    let id = template.base.id.as_string();
    let bindings_json = serde_json::to_string(&template.bindings)
        .map_err(|e| DbErr::Custom(format!("Template {}: bindings not serializable: {}", id, e)))?;
    let template_file_json = template
        .template_file
        .as_ref()
        .map(serde_json::to_string)
        .transpose()
        .map_err(|e| DbErr::Custom(format!("Template {}: file not serializable: {}", id, e)))?;

    Ok(report_template::ActiveModel {
        id: Set(id),
        name: Set(template.base.name.clone()),
        description: Set(template.base.description.clone()),
        group_name: Set(template.group.clone()),
        bindings_json: Set(bindings_json),
        template_file_json: Set(template_file_json),
        is_deleted: Set(template.base.metadata.is_deleted),
        created_at: Set(Some(template.base.metadata.created_at)),
        updated_at: Set(Some(template.base.metadata.updated_at)),
        version: Set(template.base.metadata.version),
    })
}

// ============================================================================
// Repository functions
// ============================================================================

/// Все неудалённые шаблоны, по имени
pub async fn list_all(db: &DatabaseConnection) -> Result<Vec<ReportTemplate>, DbErr> {
    let models = report_template::Entity::find()
        .filter(report_template::Column::IsDeleted.eq(false))
        .order_by_asc(report_template::Column::Name)
        .all(db)
        .await?;

    models.into_iter().map(ReportTemplate::try_from).collect()
}

/// Найти шаблон по ID
pub async fn find_by_id(
    db: &DatabaseConnection,
    id: &ReportTemplateId,
) -> Result<Option<ReportTemplate>, DbErr> {
    let model = report_template::Entity::find_by_id(id.as_string())
        .filter(report_template::Column::IsDeleted.eq(false))
        .one(db)
        .await?;
    model.map(ReportTemplate::try_from).transpose()
}

/// Вставить новый шаблон
pub async fn insert(db: &DatabaseConnection, template: &ReportTemplate) -> Result<(), DbErr> {
    let now = Utc::now();
    let mut active_model = to_active_model(template)?;
    active_model.is_deleted = Set(false);
    active_model.created_at = Set(Some(now));
    active_model.updated_at = Set(Some(now));
    active_model.version = Set(1);

    active_model.insert(db).await?;
    Ok(())
}

/// Обновить шаблон, если в БД всё ещё та версия, что была прочитана.
/// `Ok(false)` означает, что запись уже изменена другим запросом.
pub async fn update(db: &DatabaseConnection, template: &ReportTemplate) -> Result<bool, DbErr> {
    let expected = template.base.metadata.version;
    let mut active_model = to_active_model(template)?;
    active_model.updated_at = Set(Some(Utc::now()));
    active_model.version = Set(expected + 1);

    match report_template::Entity::update(active_model)
        .filter(report_template::Column::Version.eq(expected))
        .exec(db)
        .await
    {
        Ok(_) => Ok(true),
        Err(DbErr::RecordNotUpdated) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Мягкое удаление шаблона
pub async fn soft_delete(db: &DatabaseConnection, id: &ReportTemplateId) -> Result<(), DbErr> {
    let now = Utc::now();
    report_template::Entity::update_many()
        .col_expr(report_template::Column::IsDeleted, Expr::value(true))
        .col_expr(report_template::Column::UpdatedAt, Expr::value(now))
        .filter(report_template::Column::Id.eq(id.as_string()))
        .exec(db)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> report_template::Model {
        report_template::Model {
            id: Uuid::new_v4().to_string(),
            name: "XYZ report".into(),
            description: None,
            group_name: Some("Donor reports".into()),
            bindings_json: r#"[{"data_source_id":"dt-1","key":"trainings"}]"#.into(),
            template_file_json: Some(r#"{"name":"XYZ template.docx","kind":"word"}"#.into()),
            is_deleted: false,
            created_at: Some(Utc::now()),
            updated_at: Some(Utc::now()),
            version: 3,
        }
    }

    #[test]
    fn test_decode_row() {
        let template = ReportTemplate::try_from(model()).unwrap();
        assert_eq!(template.bindings[0].key, "trainings");
        assert_eq!(template.template_file.unwrap().name, "XYZ template.docx");
        assert_eq!(template.base.metadata.version, 3);
    }

    #[test]
    fn test_unreadable_row_is_an_error() {
        let mut bad_bindings = model();
        bad_bindings.bindings_json = "{not json".into();
        assert!(matches!(
            ReportTemplate::try_from(bad_bindings),
            Err(DbErr::Custom(ref m)) if m.contains("bindings_json")
        ));

        let mut bad_file = model();
        bad_file.template_file_json = Some(r#"{"name":"x.pdf","kind":"pdf"}"#.into());
        assert!(matches!(
            ReportTemplate::try_from(bad_file),
            Err(DbErr::Custom(ref m)) if m.contains("template_file_json")
        ));

        let mut bad_id = model();
        bad_id.id = "not-a-uuid".into();
        assert!(ReportTemplate::try_from(bad_id).is_err());
    }

    #[test]
    fn test_missing_file_is_none() {
        let mut row = model();
        row.template_file_json = None;
        assert_eq!(ReportTemplate::try_from(row).unwrap().template_file, None);
    }
}
