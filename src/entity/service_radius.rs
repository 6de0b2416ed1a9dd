#[derive(Clone, Debug)]
pub(crate) struct Entity {
    pub id: i64,
    pub code: String,
    pub kilometers: i64,
    pub label_en: String,
    pub label_kn: Option<String>,
    pub sort_order: i64,
    pub active: bool,
}

impl<'r> sqlx::FromRow<'r, sqlx::sqlite::SqliteRow> for Entity {
    fn from_row(row: &'r sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        use sqlx::Row;

        Ok(Self {
            id: row.try_get(0)?,
            code: row.try_get(1)?,
            kilometers: row.try_get(2)?,
            label_en: row.try_get(3)?,
            label_kn: row.try_get(4)?,
            sort_order: row.try_get(5)?,
            active: row.try_get(6)?,
        })
    }
}

pub(crate) struct Upsert<'a> {
    pub code: &'a str,
    pub kilometers: i64,
    pub label_en: &'a str,
    pub label_kn: Option<&'a str>,
    pub sort_order: i64,
    pub active: bool,
}

impl Upsert<'_> {
    pub async fn execute<'c, E: sqlx::Executor<'c, Database = sqlx::Sqlite>>(
        &self,
        executor: E,
    ) -> Result<Entity, sqlx::Error> {
        sqlx::query_as(
            r#"insert into service_radius (code, kilometers, label_en, label_kn, sort_order, active)
values ($1, $2, $3, $4, $5, $6)
on conflict (code)
do update set kilometers = excluded.kilometers, label_en = excluded.label_en, label_kn = excluded.label_kn, sort_order = excluded.sort_order, active = excluded.active
returning id, code, kilometers, label_en, label_kn, sort_order, active"#,
        )
        .bind(self.code)
        .bind(self.kilometers)
        .bind(self.label_en)
        .bind(self.label_kn)
        .bind(self.sort_order)
        .bind(self.active)
        .fetch_one(executor)
        .await
    }
}

pub(crate) struct ListActive;

impl ListActive {
    pub async fn execute<'c, E: sqlx::Executor<'c, Database = sqlx::Sqlite>>(
        &self,
        executor: E,
    ) -> Result<Vec<Entity>, sqlx::Error> {
        sqlx::query_as(
            r#"select id, code, kilometers, label_en, label_kn, sort_order, active
from service_radius
where active = 1
order by sort_order, kilometers, code"#,
        )
        .fetch_all(executor)
        .await
    }
}
