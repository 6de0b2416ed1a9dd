pub(crate) const LANGUAGE_CODE: u8 = 0;
pub(crate) const CATEGORY_CODE: u8 = 1;
pub(crate) const TERM_CODE: u8 = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) enum Kind {
    Language,
    Category,
    Term,
}

impl Kind {
    pub const fn as_code(&self) -> u8 {
        match self {
            Self::Language => LANGUAGE_CODE,
            Self::Category => CATEGORY_CODE,
            Self::Term => TERM_CODE,
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct KindDecodeError(pub u8);

impl std::error::Error for KindDecodeError {}

impl std::fmt::Display for KindDecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid master data kind {}", self.0)
    }
}

impl TryFrom<u8> for Kind {
    type Error = KindDecodeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            LANGUAGE_CODE => Ok(Self::Language),
            CATEGORY_CODE => Ok(Self::Category),
            TERM_CODE => Ok(Self::Term),
            other => Err(KindDecodeError(other)),
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Entity {
    pub id: i64,
    pub kind: Kind,
    pub code: String,
    pub label_en: String,
    pub label_kn: Option<String>,
    pub sort_order: i64,
    pub active: bool,
}

impl<'r> sqlx::FromRow<'r, sqlx::sqlite::SqliteRow> for Entity {
    fn from_row(row: &'r sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        use sqlx::Row;

        let kind: u8 = row.try_get(1)?;
        let kind = Kind::try_from(kind).map_err(|err| sqlx::Error::ColumnDecode {
            index: "kind".into(),
            source: Box::new(err),
        })?;

        Ok(Self {
            id: row.try_get(0)?,
            kind,
            code: row.try_get(2)?,
            label_en: row.try_get(3)?,
            label_kn: row.try_get(4)?,
            sort_order: row.try_get(5)?,
            active: row.try_get(6)?,
        })
    }
}

pub(crate) struct Upsert<'a> {
    kind: Kind,
    code: &'a str,
    label_en: &'a str,
    label_kn: Option<&'a str>,
    sort_order: i64,
    active: bool,
}

impl<'a> Upsert<'a> {
    pub fn new(
        kind: Kind,
        code: &'a str,
        label_en: &'a str,
        label_kn: Option<&'a str>,
        sort_order: i64,
        active: bool,
    ) -> Self {
        Self {
            kind,
            code,
            label_en,
            label_kn,
            sort_order,
            active,
        }
    }

    pub async fn execute<'c, E: sqlx::Executor<'c, Database = sqlx::Sqlite>>(
        &self,
        executor: E,
    ) -> Result<Entity, sqlx::Error> {
        sqlx::query_as(
            r#"insert into master_data (kind, code, label_en, label_kn, sort_order, active)
values ($1, $2, $3, $4, $5, $6)
on conflict (kind, code)
do update set label_en = excluded.label_en, label_kn = excluded.label_kn, sort_order = excluded.sort_order, active = excluded.active
returning id, kind, code, label_en, label_kn, sort_order, active"#,
        )
        .bind(self.kind.as_code())
        .bind(self.code)
        .bind(self.label_en)
        .bind(self.label_kn)
        .bind(self.sort_order)
        .bind(self.active)
        .fetch_one(executor)
        .await
    }
}

pub(crate) struct ListActive {
    kind: Kind,
}

impl ListActive {
    pub fn new(kind: Kind) -> Self {
        Self { kind }
    }

    pub async fn execute<'c, E: sqlx::Executor<'c, Database = sqlx::Sqlite>>(
        &self,
        executor: E,
    ) -> Result<Vec<Entity>, sqlx::Error> {
        sqlx::query_as(
            r#"select id, kind, code, label_en, label_kn, sort_order, active
from master_data
where kind = $1 and active = 1
order by sort_order, code"#,
        )
        .bind(self.kind.as_code())
        .fetch_all(executor)
        .await
    }
}
